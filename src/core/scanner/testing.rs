//! 测试替身：计数关闭的帧、手动时钟、OCR 引擎

use super::debounce::Clock;
use super::error::OcrError;
use super::frame::{CameraFrame, LumaFrame};
use super::ocr::{OcrEngine, OcrJob};
use super::region::{Rect, TextBlock};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// 记录 close 次数的帧
pub(crate) struct TrackedFrame {
    pub(crate) inner: LumaFrame,
    pub(crate) closes: Arc<AtomicUsize>,
}

impl TrackedFrame {
    pub(crate) fn new(inner: LumaFrame) -> (Self, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                closes: closes.clone(),
            },
            closes,
        )
    }
}

impl CameraFrame for TrackedFrame {
    fn width(&self) -> u32 {
        self.inner.width
    }

    fn height(&self) -> u32 {
        self.inner.height
    }

    fn rotation_degrees(&self) -> u32 {
        self.inner.rotation_degrees
    }

    fn luma_plane(&self) -> Option<&[u8]> {
        self.inner.y_plane.as_deref()
    }

    fn recognized_text(&self) -> Option<&[TextBlock]> {
        self.inner.text_blocks.as_deref()
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub(crate) struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub(crate) fn at(ms: u64) -> Self {
        Self {
            now: AtomicU64::new(ms),
        }
    }

    pub(crate) fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// 先收下 job，稍后由测试决定何时、在哪个线程完成
#[derive(Default)]
pub(crate) struct DeferredOcr {
    pending: Mutex<Vec<OcrJob>>,
}

impl DeferredOcr {
    pub(crate) fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub(crate) fn take(&self) -> Option<OcrJob> {
        self.pending.lock().unwrap().pop()
    }
}

impl OcrEngine for DeferredOcr {
    fn submit(&self, job: OcrJob) {
        self.pending.lock().unwrap().push(job);
    }
}

/// 每次都同步返回同一组文字块（或失败）
pub(crate) struct FixedOcr {
    pub(crate) result: Result<Vec<TextBlock>, String>,
    pub(crate) submitted: AtomicUsize,
}

impl FixedOcr {
    pub(crate) fn blocks(blocks: Vec<TextBlock>) -> Self {
        Self {
            result: Ok(blocks),
            submitted: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            submitted: AtomicUsize::new(0),
        }
    }
}

impl OcrEngine for FixedOcr {
    fn submit(&self, job: OcrJob) {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        let result = self.result.clone().map_err(OcrError::Engine);
        job.complete(result);
    }
}

/// 100x100 帧的扫描框是 (20, 20)-(80, 80)
pub(crate) fn centered_block(text: &str) -> TextBlock {
    TextBlock::new(text, Rect::new(30, 40, 70, 50))
}
