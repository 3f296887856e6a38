use super::error::ScanError;
use super::meeting_id::MeetingId;
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_DOMAIN: &str = "zoom.us";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9.-]").expect("domain charset pattern is valid"));

/// 会议链接生成器
///
/// 只接受规范化后的会议号（无连字符数字串）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingUrlGenerator {
    domain: String,
}

impl Default for MeetingUrlGenerator {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
        }
    }
}

impl MeetingUrlGenerator {
    /// 使用公司域名生成网页链接，域名先清洗再校验
    pub fn with_domain(domain: &str) -> Result<Self, ScanError> {
        let sanitized = sanitize_domain(domain);
        if !is_valid_domain(&sanitized) {
            return Err(ScanError::InvalidDomain(domain.to_string()));
        }
        Ok(Self { domain: sanitized })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// App deep link
    pub fn deep_link(&self, id: &MeetingId) -> String {
        format!("zoomus://zoom.us/join?confno={}", id.digits())
    }

    /// Browser fallback for hosts without the app installed
    pub fn web_url(&self, id: &MeetingId) -> String {
        format!("https://{}/j/{}", self.domain, id.digits())
    }
}

/// 去空白、只保留字母数字点和连字符、转小写
pub fn sanitize_domain(domain: &str) -> String {
    let sanitized = WHITESPACE.replace_all(domain, "");
    let sanitized = DISALLOWED.replace_all(&sanitized, "");
    sanitized.to_lowercase()
}

pub fn is_valid_domain(domain: &str) -> bool {
    let sanitized = sanitize_domain(domain);
    !sanitized.is_empty() && sanitized.contains('.')
}
