//! 会议号扫描核心 - 从相机帧流中提取 11 位会议号
//!
//! 核心策略：
//! 1. 帧闸门 - 同时最多一帧在识别，忙时直接丢帧
//! 2. 扫描框过滤 - 只保留与中央扫描框重叠足够的文字块
//! 3. 分层匹配 - 标签/分组规则优先，连续数字兜底，统一要求 11 位
//! 4. 去抖 + 亮度反馈 - 冷却期内不重复上报；框内无文字时估计亮度

pub mod analyzer;
pub mod brightness;
pub mod config;
pub mod debounce;
pub mod error;
pub mod frame;
pub mod gate;
pub mod meeting_id;
pub mod ocr;
pub mod region;
pub mod url;

#[cfg(test)]
pub(crate) mod testing;

pub use analyzer::{
    DetectionEvent, FrameDisposition, MeetingIdAnalyzer, ScanCallbacks, ScanStats,
};
pub use brightness::{BrightnessClass, BrightnessEstimator};
pub use config::ScannerConfig;
pub use debounce::{Clock, DetectionDebouncer, MonotonicClock};
pub use error::{OcrError, ScanError};
pub use frame::{CameraFrame, LumaFrame, OcrImage};
pub use gate::FrameGate;
pub use meeting_id::{extract_meeting_id, MeetingId};
pub use ocr::{OcrEngine, OcrJob, UpstreamOcr};
pub use region::{Rect, ScanRegion, TextBlock};
pub use url::MeetingUrlGenerator;
