use super::error::ScanError;
use serde::Deserialize;

/// 扫描器配置，可从 JSON5 文本加载
///
/// ```json5
/// {
///   scan_width_ratio: 0.6,
///   cooldown_ms: 500,
///   web_domain: "acme.zoom.us",
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// 扫描框宽度占帧宽比例
    pub scan_width_ratio: f32,
    /// 扫描框高度占帧高比例
    pub scan_height_ratio: f32,
    /// 文字块与扫描框的最小重叠比例（交集面积 / 文字块面积）
    pub min_overlap: f32,
    /// 两次识别成功之间的最短间隔
    pub cooldown_ms: u64,
    pub too_bright_above: f64,
    pub too_dark_below: f64,
    /// 每处理多少帧打印一次存活日志
    pub frame_log_interval: u64,
    /// 网页链接使用的公司域名，缺省为 zoom.us
    pub web_domain: Option<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            scan_width_ratio: 0.60,
            scan_height_ratio: 0.60,
            min_overlap: 0.30,
            cooldown_ms: 500,
            too_bright_above: 180.0,
            too_dark_below: 60.0,
            frame_log_interval: 30,
            web_domain: None,
        }
    }
}

impl ScannerConfig {
    pub fn from_json5(text: &str) -> Result<Self, ScanError> {
        let config: ScannerConfig = json5::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        for (name, ratio) in [
            ("scan_width_ratio", self.scan_width_ratio),
            ("scan_height_ratio", self.scan_height_ratio),
        ] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(ScanError::InvalidConfig(format!(
                    "{} must be in (0, 1], got {}",
                    name, ratio
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.min_overlap) {
            return Err(ScanError::InvalidConfig(format!(
                "min_overlap must be in [0, 1], got {}",
                self.min_overlap
            )));
        }

        let luma_range = 0.0..=255.0;
        if !luma_range.contains(&self.too_dark_below) || !luma_range.contains(&self.too_bright_above) {
            return Err(ScanError::InvalidConfig(
                "brightness thresholds must be within [0, 255]".to_string(),
            ));
        }
        if self.too_dark_below >= self.too_bright_above {
            return Err(ScanError::InvalidConfig(format!(
                "too_dark_below ({}) must be below too_bright_above ({})",
                self.too_dark_below, self.too_bright_above
            )));
        }

        if self.frame_log_interval == 0 {
            return Err(ScanError::InvalidConfig(
                "frame_log_interval must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
