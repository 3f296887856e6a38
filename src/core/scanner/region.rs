//! 扫描区域过滤 - 只保留落在用户可见扫描框内的文字
//!
//! 重叠比例 = 文字块与扫描框交集面积 / 文字块面积

use super::error::ScanError;
use log::trace;
use serde::{Deserialize, Serialize};

/// 轴对齐矩形，帧像素坐标（right/bottom 不包含）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// 零面积或坐标颠倒的矩形面积为 0
    pub fn area(&self) -> i64 {
        let w = self.right as i64 - self.left as i64;
        let h = self.bottom as i64 - self.top as i64;
        if w <= 0 || h <= 0 {
            0
        } else {
            w * h
        }
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let rect = Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };
        if rect.area() > 0 {
            Some(rect)
        } else {
            None
        }
    }
}

/// OCR 引擎输出的文字块
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub bounding_box: Option<Rect>,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, bounding_box: Rect) -> Self {
        Self {
            text: text.into(),
            bounding_box: Some(bounding_box),
        }
    }

    pub fn unbounded(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bounding_box: None,
        }
    }
}

/// 帧中央的扫描框，每帧按当前尺寸重新计算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRegion {
    pub rect: Rect,
}

impl ScanRegion {
    pub fn for_frame(
        width: u32,
        height: u32,
        width_ratio: f32,
        height_ratio: f32,
    ) -> Result<Self, ScanError> {
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(ScanError::FrameGeometry { width, height });
        }

        let center_x = (width / 2) as i32;
        let center_y = (height / 2) as i32;

        let scan_width = (width as f32 * width_ratio.clamp(0.0, 1.0)) as i32;
        let scan_height = (height as f32 * height_ratio.clamp(0.0, 1.0)) as i32;

        Ok(Self {
            rect: Rect {
                left: center_x - scan_width / 2,
                top: center_y - scan_height / 2,
                right: center_x + scan_width / 2,
                bottom: center_y + scan_height / 2,
            },
        })
    }

    /// 文字块面积中落在扫描框内的比例，无边框或零面积返回 0
    pub fn overlap_ratio(&self, block: &Rect) -> f32 {
        let block_area = block.area();
        if block_area == 0 {
            return 0.0;
        }

        match block.intersection(&self.rect) {
            Some(inter) => (inter.area() as f64 / block_area as f64) as f32,
            None => 0.0,
        }
    }

    /// 按 OCR 上报顺序拼接达标文字块，换行分隔；没有任何块达标时返回 None
    pub fn admitted_text(&self, blocks: &[TextBlock], min_overlap: f32) -> Option<String> {
        let mut admitted: Vec<&str> = Vec::new();

        for block in blocks {
            let Some(bounding_box) = block.bounding_box else {
                continue;
            };

            let overlap = self.overlap_ratio(&bounding_box);
            if overlap > 0.0 && overlap >= min_overlap {
                admitted.push(&block.text);
            } else {
                trace!(
                    "Rejected text outside scan area ({:.0}% overlap): {}",
                    overlap * 100.0,
                    block.text
                );
            }
        }

        if admitted.is_empty() {
            None
        } else {
            Some(admitted.join("\n"))
        }
    }
}
