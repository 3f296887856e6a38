use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid scanner config: {0}")]
    InvalidConfig(String),
    #[error("Config parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("Invalid meeting id: {0}")]
    InvalidMeetingId(String),
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
    #[error("Unusable frame geometry: {width}x{height}")]
    FrameGeometry { width: u32, height: u32 },
}

/// OCR 引擎失败（只记录日志，不向调用方传播）
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine failed: {0}")]
    Engine(String),
    #[error("No recognized text attached to frame")]
    Unavailable,
}
