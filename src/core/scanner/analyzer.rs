//! 会议号分析器
//!
//! 相机帧 → 帧闸门 → OCR（外部）→ 扫描框过滤 → 会议号提取 → 去抖 → 回调；
//! 扫描框内没有文字时改走亮度估计，反馈给外部曝光控制。

use super::brightness::{BrightnessClass, BrightnessEstimator};
use super::config::ScannerConfig;
use super::debounce::{Clock, DetectionDebouncer, MonotonicClock};
use super::error::{OcrError, ScanError};
use super::frame::{CameraFrame, FrameLease};
use super::gate::{BusyLease, FrameGate};
use super::meeting_id::extract_meeting_id;
use super::ocr::{OcrEngine, OcrJob};
use super::region::{ScanRegion, TextBlock};
use super::url::MeetingUrlGenerator;
use log::{debug, error, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 一次被接受的识别
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionEvent {
    /// 由无连字符会议号生成的 deep link
    pub uri: String,
    /// `XXX-XXXX-XXXX`
    pub meeting_id: String,
}

pub type DetectionCallback = Box<dyn Fn(DetectionEvent) + Send + Sync>;
pub type BrightnessCallback = Box<dyn Fn(BrightnessClass) + Send + Sync>;

/// 调用方回调；亮度反馈可选
pub struct ScanCallbacks {
    on_detection: DetectionCallback,
    on_brightness: Option<BrightnessCallback>,
}

impl ScanCallbacks {
    pub fn new<F>(on_detection: F) -> Self
    where
        F: Fn(DetectionEvent) + Send + Sync + 'static,
    {
        Self {
            on_detection: Box::new(on_detection),
            on_brightness: None,
        }
    }

    pub fn with_brightness<F>(mut self, on_brightness: F) -> Self
    where
        F: Fn(BrightnessClass) + Send + Sync + 'static,
    {
        self.on_brightness = Some(Box::new(on_brightness));
        self
    }
}

/// `analyze` 对一帧的处置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDisposition {
    /// 已交给 OCR 引擎
    Submitted,
    /// 上一帧仍在识别，本帧已关闭丢弃
    DroppedBusy,
    /// 帧里没有图像
    NoImage,
    /// 帧几何无效或内部异常
    Rejected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub processed_frames: u64,
    pub dropped_frames: u64,
    pub detections: u64,
    pub ocr_failures: u64,
}

#[derive(Default)]
struct ScanCounters {
    processed_frames: AtomicU64,
    dropped_frames: AtomicU64,
    detections: AtomicU64,
    ocr_failures: AtomicU64,
}

impl ScanCounters {
    fn snapshot(&self) -> ScanStats {
        ScanStats {
            processed_frames: self.processed_frames.load(Ordering::Relaxed),
            dropped_frames: self.dropped_frames.load(Ordering::Relaxed),
            detections: self.detections.load(Ordering::Relaxed),
            ocr_failures: self.ocr_failures.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.processed_frames.store(0, Ordering::Relaxed);
        self.dropped_frames.store(0, Ordering::Relaxed);
        self.detections.store(0, Ordering::Relaxed);
        self.ocr_failures.store(0, Ordering::Relaxed);
    }
}

/// OCR 完成后的处理流程，由在途 job 共享
pub(crate) struct DetectionPipeline {
    min_overlap: f32,
    debouncer: DetectionDebouncer,
    brightness: BrightnessEstimator,
    urls: MeetingUrlGenerator,
    clock: Arc<dyn Clock>,
    callbacks: ScanCallbacks,
    counters: ScanCounters,
}

impl DetectionPipeline {
    pub(crate) fn process(&self, region: &ScanRegion, blocks: &[TextBlock], luma: Option<&[u8]>) {
        let Some(text) = region.admitted_text(blocks, self.min_overlap) else {
            self.report_brightness(luma);
            return;
        };

        debug!(
            "OCR text detected inside scan region: {}",
            text.chars().take(100).collect::<String>()
        );

        let now_ms = self.clock.now_ms();
        let Some(id) = self.debouncer.try_accept(now_ms, || extract_meeting_id(&text)) else {
            return;
        };

        info!("✅ Meeting ID detected: {}", id);
        self.counters.detections.fetch_add(1, Ordering::Relaxed);

        (self.callbacks.on_detection)(DetectionEvent {
            uri: self.urls.deep_link(&id),
            meeting_id: id.formatted(),
        });
    }

    pub(crate) fn ocr_failed(&self, e: &OcrError) {
        self.counters.ocr_failures.fetch_add(1, Ordering::Relaxed);
        error!("❌ Text recognition failed: {}", e);
    }

    fn report_brightness(&self, luma: Option<&[u8]>) {
        let Some(on_brightness) = &self.callbacks.on_brightness else {
            return;
        };

        let Some(class) = luma.and_then(|plane| self.brightness.estimate(plane)) else {
            return;
        };

        trace!("No text in scan region, brightness: {:?}", class);
        on_brightness(class);
    }
}

/// 会议号分析器，每个相机会话一个实例
///
/// `analyze` 可被任意线程并发调用，从不失败也不 panic 到调用方。
pub struct MeetingIdAnalyzer {
    gate: FrameGate,
    pipeline: Arc<DetectionPipeline>,
    ocr: Arc<dyn OcrEngine>,
    scan_width_ratio: f32,
    scan_height_ratio: f32,
    frame_log_interval: u64,
}

impl MeetingIdAnalyzer {
    pub fn new(
        config: ScannerConfig,
        ocr: Arc<dyn OcrEngine>,
        callbacks: ScanCallbacks,
    ) -> Result<Self, ScanError> {
        Self::with_clock(config, ocr, callbacks, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(
        config: ScannerConfig,
        ocr: Arc<dyn OcrEngine>,
        callbacks: ScanCallbacks,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ScanError> {
        config.validate()?;

        let urls = match &config.web_domain {
            Some(domain) => MeetingUrlGenerator::with_domain(domain)?,
            None => MeetingUrlGenerator::default(),
        };

        let pipeline = DetectionPipeline {
            min_overlap: config.min_overlap,
            debouncer: DetectionDebouncer::new(config.cooldown_ms),
            brightness: BrightnessEstimator::new(config.too_bright_above, config.too_dark_below),
            urls,
            clock,
            callbacks,
            counters: ScanCounters::default(),
        };

        Ok(Self {
            gate: FrameGate::new(),
            pipeline: Arc::new(pipeline),
            ocr,
            scan_width_ratio: config.scan_width_ratio,
            scan_height_ratio: config.scan_height_ratio,
            frame_log_interval: config.frame_log_interval,
        })
    }

    pub fn analyze<F: CameraFrame>(&self, frame: F) -> FrameDisposition {
        self.analyze_boxed(Box::new(frame))
    }

    pub fn analyze_boxed(&self, frame: Box<dyn CameraFrame>) -> FrameDisposition {
        let counters = &self.pipeline.counters;
        let processed = counters.processed_frames.fetch_add(1, Ordering::Relaxed) + 1;
        if processed % self.frame_log_interval == 0 {
            debug!("Camera is active: processed {} frames", processed);
        }

        let lease = FrameLease::new(frame);

        let Some(busy) = self.gate.try_acquire() else {
            counters.dropped_frames.fetch_add(1, Ordering::Relaxed);
            trace!("Analyzer busy, dropping frame #{}", processed);
            return FrameDisposition::DroppedBusy;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| self.submit(lease, busy))) {
            Ok(disposition) => disposition,
            Err(_) => {
                error!("❌ Panic while analyzing frame #{}, frame released", processed);
                FrameDisposition::Rejected
            }
        }
    }

    fn submit(&self, lease: FrameLease, busy: BusyLease) -> FrameDisposition {
        let Some(image) = lease.image() else {
            debug!("No image available from camera");
            return FrameDisposition::NoImage;
        };

        let region = match ScanRegion::for_frame(
            image.width,
            image.height,
            self.scan_width_ratio,
            self.scan_height_ratio,
        ) {
            Ok(region) => region,
            Err(e) => {
                warn!("⚠️ Skipping frame: {}", e);
                return FrameDisposition::Rejected;
            }
        };

        trace!(
            "Scan area {:?} for {}x{} frame (rotation {})",
            region.rect,
            image.width,
            image.height,
            image.rotation_degrees
        );

        self.ocr
            .submit(OcrJob::new(lease, region, self.pipeline.clone(), busy));
        FrameDisposition::Submitted
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn last_detection_ms(&self) -> Option<u64> {
        self.pipeline.debouncer.last_accepted_ms()
    }

    pub fn stats(&self) -> ScanStats {
        self.pipeline.counters.snapshot()
    }

    pub fn reset_stats(&self) {
        self.pipeline.counters.reset();
    }
}
