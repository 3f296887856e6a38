//! OCR 引擎接口
//!
//! 分析器把每个放行的帧打包成 [`OcrJob`] 交给引擎。引擎可以在任意线程、
//! 任意时刻调用 [`OcrJob::complete`]；job 被 drop 时（无论是否调用过
//! `complete`）帧被关闭、闸门被释放，且都只发生一次。

use super::analyzer::DetectionPipeline;
use super::error::OcrError;
use super::frame::{FrameLease, OcrImage};
use super::gate::BusyLease;
use super::region::{ScanRegion, TextBlock};
use log::error;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub trait OcrEngine: Send + Sync {
    fn submit(&self, job: OcrJob);
}

/// 一次在途的识别请求
///
/// 字段按声明顺序 drop：先关闭帧，再清除忙标志。
pub struct OcrJob {
    frame: FrameLease,
    region: ScanRegion,
    pipeline: Arc<DetectionPipeline>,
    _busy: BusyLease,
}

impl OcrJob {
    pub(crate) fn new(
        frame: FrameLease,
        region: ScanRegion,
        pipeline: Arc<DetectionPipeline>,
        busy: BusyLease,
    ) -> Self {
        Self {
            frame,
            region,
            pipeline,
            _busy: busy,
        }
    }

    /// 像素缓冲 + 旋转角度
    pub fn image(&self) -> Option<OcrImage<'_>> {
        self.frame.image()
    }

    pub fn recognized_text(&self) -> Option<&[TextBlock]> {
        self.frame.frame().recognized_text()
    }

    pub fn scan_region(&self) -> ScanRegion {
        self.region
    }

    /// 交付识别结果并结束该 job
    pub fn complete(self, result: Result<Vec<TextBlock>, OcrError>) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let luma = self.frame.frame().luma_plane();
            match &result {
                Ok(blocks) => self.pipeline.process(&self.region, blocks, luma),
                Err(e) => self.pipeline.ocr_failed(e),
            }
        }));

        if outcome.is_err() {
            error!("❌ Panic while processing OCR result, frame released");
        }
    }
}

/// 上游（宿主侧）已完成 OCR：直接使用帧上附带的文字块，同步完成
#[derive(Debug, Default)]
pub struct UpstreamOcr;

impl OcrEngine for UpstreamOcr {
    fn submit(&self, job: OcrJob) {
        let result = job
            .recognized_text()
            .map(|blocks| blocks.to_vec())
            .ok_or(OcrError::Unavailable);
        job.complete(result);
    }
}
