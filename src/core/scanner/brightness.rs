//! 亮度估计 - 扫描框内没有文字时，给外部曝光补偿提供反馈
//!
//! 纯粹的逐帧分类器，不记忆历史帧。

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// 大帧按块并行求和
const PAR_CHUNK: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrightnessClass {
    TooBright,
    TooDark,
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessEstimator {
    too_bright_above: f64,
    too_dark_below: f64,
}

impl Default for BrightnessEstimator {
    fn default() -> Self {
        Self::new(180.0, 60.0)
    }
}

impl BrightnessEstimator {
    pub fn new(too_bright_above: f64, too_dark_below: f64) -> Self {
        Self {
            too_bright_above,
            too_dark_below,
        }
    }

    /// 整帧 Y 平面的算术平均值 [0, 255]，空平面返回 None
    pub fn mean_luminance(y_plane: &[u8]) -> Option<f64> {
        if y_plane.is_empty() {
            return None;
        }

        let sum: u64 = if y_plane.len() > PAR_CHUNK {
            y_plane
                .par_chunks(PAR_CHUNK)
                .map(|chunk| chunk.iter().map(|&y| y as u64).sum::<u64>())
                .sum()
        } else {
            y_plane.iter().map(|&y| y as u64).sum()
        };

        Some(sum as f64 / y_plane.len() as f64)
    }

    pub fn classify(&self, mean: f64) -> BrightnessClass {
        if mean > self.too_bright_above {
            BrightnessClass::TooBright
        } else if mean < self.too_dark_below {
            BrightnessClass::TooDark
        } else {
            BrightnessClass::Ok
        }
    }

    pub fn estimate(&self, y_plane: &[u8]) -> Option<BrightnessClass> {
        Self::mean_luminance(y_plane).map(|mean| self.classify(mean))
    }
}
