use super::region::TextBlock;
use image::DynamicImage;

/// 相机侧交付的一帧
///
/// 帧由相机管线持有，`close` 把缓冲区归还给采集管线。
/// 分析器通过 [`FrameLease`] 保证每帧恰好关闭一次。
pub trait CameraFrame: Send + 'static {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn rotation_degrees(&self) -> u32;

    /// Y (luminance) plane, `None` when the capture produced no image
    fn luma_plane(&self) -> Option<&[u8]>;

    /// 上游已完成 OCR 时附带的文字块
    fn recognized_text(&self) -> Option<&[TextBlock]> {
        None
    }

    fn close(&mut self);
}

/// 交给 OCR 引擎的只读图像视图
#[derive(Debug, Clone, Copy)]
pub struct OcrImage<'a> {
    pub width: u32,
    pub height: u32,
    pub rotation_degrees: u32,
    pub luma: &'a [u8],
}

/// 持有一帧直到 drop，drop 时关闭该帧
pub(crate) struct FrameLease {
    frame: Box<dyn CameraFrame>,
}

impl FrameLease {
    pub(crate) fn new(frame: Box<dyn CameraFrame>) -> Self {
        Self { frame }
    }

    pub(crate) fn frame(&self) -> &dyn CameraFrame {
        self.frame.as_ref()
    }

    pub(crate) fn image(&self) -> Option<OcrImage<'_>> {
        let luma = self.frame.luma_plane()?;
        Some(OcrImage {
            width: self.frame.width(),
            height: self.frame.height(),
            rotation_degrees: self.frame.rotation_degrees(),
            luma,
        })
    }
}

impl Drop for FrameLease {
    fn drop(&mut self) {
        self.frame.close();
    }
}

/// 自持 Y 平面的帧
#[derive(Debug, Clone, Default)]
pub struct LumaFrame {
    pub width: u32,
    pub height: u32,
    pub rotation_degrees: u32,
    pub y_plane: Option<Vec<u8>>,
    pub text_blocks: Option<Vec<TextBlock>>,
}

impl LumaFrame {
    pub fn new(width: u32, height: u32, y_plane: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rotation_degrees: 0,
            y_plane: Some(y_plane),
            text_blocks: None,
        }
    }

    /// Frame filled with a single luminance value
    pub fn uniform(width: u32, height: u32, value: u8) -> Self {
        Self::new(width, height, vec![value; width as usize * height as usize])
    }

    /// 从任意图片构建（转为灰度）
    pub fn from_image(image: &DynamicImage) -> Self {
        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();
        Self::new(width, height, gray.into_raw())
    }

    pub fn with_rotation(mut self, rotation_degrees: u32) -> Self {
        self.rotation_degrees = rotation_degrees;
        self
    }

    pub fn with_text_blocks(mut self, blocks: Vec<TextBlock>) -> Self {
        self.text_blocks = Some(blocks);
        self
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl CameraFrame for LumaFrame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn rotation_degrees(&self) -> u32 {
        self.rotation_degrees
    }

    fn luma_plane(&self) -> Option<&[u8]> {
        self.y_plane.as_deref()
    }

    fn recognized_text(&self) -> Option<&[TextBlock]> {
        self.text_blocks.as_deref()
    }

    fn close(&mut self) {
        self.y_plane = None;
    }
}
