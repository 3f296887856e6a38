//! 会议号提取 - 从 OCR 噪声文本中恢复完整的 11 位会议号
//!
//! 分层匹配，先命中者胜：
//! 1. "Meeting ID" 标签（可选）+ 3-4-4 分组，或不带分隔符的 11 位数字
//! 2. 兜底：任意一段长度恰为 11 的连续数字
//!
//! 无论哪一层给出候选，去掉非数字后必须恰好 11 位。

use super::error::ScanError;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

pub const MEETING_ID_DIGITS: usize = 11;

static LABELED_OR_BARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:meeting\s*id\s*[:#]?\s*)?\b([0-9]{3}[ -]?[0-9]{4}[ -]?[0-9]{4})\b|\b([0-9]{11})\b",
    )
    .expect("meeting id pattern is valid")
});

// 只认 ASCII 数字，`\d` 会匹配其他文字的数字
static DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+").expect("digit run pattern is valid"));

/// 规范化后的会议号：恰好 11 位 ASCII 数字
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeetingId(String);

impl MeetingId {
    /// 去掉所有非数字字符后校验位数
    pub fn parse(text: &str) -> Result<Self, ScanError> {
        let digits = strip_non_digits(text);
        if digits.len() == MEETING_ID_DIGITS {
            Ok(Self(digits))
        } else {
            Err(ScanError::InvalidMeetingId(format!(
                "expected {} digits, found {} in {:?}",
                MEETING_ID_DIGITS,
                digits.len(),
                text
            )))
        }
    }

    /// Undashed digits, the form URL generation consumes
    pub fn digits(&self) -> &str {
        &self.0
    }

    /// `XXX-XXXX-XXXX`
    pub fn formatted(&self) -> String {
        format!("{}-{}-{}", &self.0[..3], &self.0[3..7], &self.0[7..])
    }
}

impl fmt::Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

type Tier = fn(&str) -> Option<String>;

const TIERS: [(&str, Tier); 2] = [
    ("labeled_or_bare", labeled_or_bare),
    ("digit_run", eleven_digit_run),
];

/// 依次尝试各层规则，返回第一个 11 位会议号
pub fn extract_meeting_id(text: &str) -> Option<MeetingId> {
    if text.is_empty() {
        return None;
    }

    TIERS.iter().find_map(|(name, tier)| {
        let digits = tier(text)?;
        debug!("Meeting ID matched by {} tier: {}", name, digits);
        MeetingId::parse(&digits).ok()
    })
}

/// 第一层：标签 + 3-4-4 分组，或裸 11 位数字
pub fn labeled_or_bare(text: &str) -> Option<String> {
    LABELED_OR_BARE.captures_iter(text).find_map(|caps| {
        let group = caps.get(1).or_else(|| caps.get(2))?;
        let digits = strip_non_digits(group.as_str());
        (digits.len() == MEETING_ID_DIGITS).then_some(digits)
    })
}

/// 第二层：第一段长度恰为 11 的连续数字
pub fn eleven_digit_run(text: &str) -> Option<String> {
    DIGIT_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|run| run.len() == MEETING_ID_DIGITS)
        .map(str::to_string)
}

fn strip_non_digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}
