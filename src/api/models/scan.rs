use crate::core::scanner::{
    BrightnessClass, LumaFrame, Rect, ScanError, TextBlock,
};
use serde::{Deserialize, Serialize};

/// 宿主侧 OCR 得到的文字块
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrTextBlock {
    pub text: String,
    /// left, top, right, bottom；无边框的块不参与扫描框过滤
    pub bounds: Option<BlockBounds>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlockBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// 相机帧：Y 平面 + 已识别文字
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanFrameData {
    pub width: u32,
    pub height: u32,
    pub rotation_degrees: u32,
    /// 为空表示本帧没有图像
    pub y_plane: Option<Vec<u8>>,
    pub text_blocks: Vec<OcrTextBlock>,
}

impl From<OcrTextBlock> for TextBlock {
    fn from(block: OcrTextBlock) -> Self {
        TextBlock {
            text: block.text,
            bounding_box: block
                .bounds
                .map(|b| Rect::new(b.left, b.top, b.right, b.bottom)),
        }
    }
}

impl From<ScanFrameData> for LumaFrame {
    fn from(frame: ScanFrameData) -> Self {
        LumaFrame {
            width: frame.width,
            height: frame.height,
            rotation_degrees: frame.rotation_degrees,
            y_plane: frame.y_plane,
            text_blocks: Some(frame.text_blocks.into_iter().map(TextBlock::from).collect()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrightnessLevel {
    TooBright,
    TooDark,
    Ok,
}

impl From<BrightnessClass> for BrightnessLevel {
    fn from(class: BrightnessClass) -> Self {
        match class {
            BrightnessClass::TooBright => BrightnessLevel::TooBright,
            BrightnessClass::TooDark => BrightnessLevel::TooDark,
            BrightnessClass::Ok => BrightnessLevel::Ok,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanEvent {
    /// 识别成功：deep link、网页链接、格式化会议号
    Detected {
        uri: String,
        web_url: String,
        meeting_id: String,
    },
    /// 扫描框内没有文字，供曝光补偿使用
    Brightness { level: BrightnessLevel },
}

/// 扫描 API 错误类型，FRB 友好的设计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanApiError {
    pub error_type: String,
    pub message: String,
}

impl From<ScanError> for ScanApiError {
    fn from(e: ScanError) -> Self {
        let error_type = match &e {
            ScanError::InvalidConfig(_) | ScanError::Json5(_) => "InvalidConfig",
            ScanError::InvalidMeetingId(_) => "InvalidMeetingId",
            ScanError::InvalidDomain(_) => "InvalidDomain",
            ScanError::FrameGeometry { .. } => "FrameGeometry",
        };
        Self {
            error_type: error_type.to_string(),
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ScanApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.error_type, self.message)
    }
}

impl std::error::Error for ScanApiError {}
