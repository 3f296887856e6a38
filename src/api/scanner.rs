//! 会议号扫描器

use crate::api::models::scan::{ScanApiError, ScanEvent, ScanFrameData};
use crate::core::scanner::{
    url, FrameDisposition, LumaFrame, MeetingId, MeetingIdAnalyzer, MeetingUrlGenerator,
    ScanCallbacks, ScanStats, ScannerConfig, UpstreamOcr,
};
use flutter_rust_bridge::frb;
use log::info;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

/// 事件按产生线程归属，宿主侧 OCR 在调用 `process_frame` 的线程上同步完成
type EventBuffer = Arc<Mutex<Vec<(ThreadId, ScanEvent)>>>;

/// 会议号扫描器 - 相机与 OCR 在宿主侧，每帧带着识别出的文字块送进来
///
/// ```dart
/// final scanner = MeetingIdScanner.create(configJson5: null);
/// final events = scanner.processFrame(frame: frameData);
/// final stats = scanner.stats;
/// ```
#[frb(opaque)]
pub struct MeetingIdScanner {
    analyzer: MeetingIdAnalyzer,
    events: EventBuffer,
}

impl MeetingIdScanner {
    /// 创建扫描器，config_json5 为空时使用默认配置
    #[frb(sync)]
    pub fn create(config_json5: Option<String>) -> Result<Self, ScanApiError> {
        crate::init_logging();

        let config = match config_json5 {
            Some(text) => ScannerConfig::from_json5(&text)?,
            None => ScannerConfig::default(),
        };

        let urls = match &config.web_domain {
            Some(domain) => MeetingUrlGenerator::with_domain(domain)?,
            None => MeetingUrlGenerator::default(),
        };

        let events: EventBuffer = Arc::new(Mutex::new(Vec::new()));
        let detected = events.clone();
        let brightness = events.clone();

        let callbacks = ScanCallbacks::new(move |event| {
            let web_url = MeetingId::parse(&event.meeting_id)
                .map(|id| urls.web_url(&id))
                .unwrap_or_default();
            if let Ok(mut events) = detected.lock() {
                events.push((
                    thread::current().id(),
                    ScanEvent::Detected {
                        uri: event.uri,
                        web_url,
                        meeting_id: event.meeting_id,
                    },
                ));
            }
        })
        .with_brightness(move |class| {
            if let Ok(mut events) = brightness.lock() {
                events.push((
                    thread::current().id(),
                    ScanEvent::Brightness {
                        level: class.into(),
                    },
                ));
            }
        });

        let analyzer = MeetingIdAnalyzer::new(config, Arc::new(UpstreamOcr), callbacks)?;

        info!("📷 MeetingIdScanner: created");
        Ok(Self { analyzer, events })
    }

    /// 处理一帧，返回本帧产生的事件（识别成功或亮度反馈）
    ///
    /// 多线程并发调用时，每个调用方只取回自己那一帧的事件。
    #[frb(sync)]
    pub fn process_frame(&self, frame: ScanFrameData) -> Vec<ScanEvent> {
        if self.analyzer.analyze(LumaFrame::from(frame)) != FrameDisposition::Submitted {
            return Vec::new();
        }

        let Ok(mut events) = self.events.lock() else {
            return Vec::new();
        };

        let current = thread::current().id();
        let (mine, others): (Vec<_>, Vec<_>) = std::mem::take(&mut *events)
            .into_iter()
            .partition(|(producer, _)| *producer == current);
        *events = others;

        mine.into_iter().map(|(_, event)| event).collect()
    }

    /// 获取扫描统计
    #[frb(sync, getter)]
    pub fn stats(&self) -> ScanStats {
        self.analyzer.stats()
    }

    /// 重置统计
    #[frb(sync)]
    pub fn reset_stats(&self) {
        self.analyzer.reset_stats()
    }
}

impl Drop for MeetingIdScanner {
    fn drop(&mut self) {
        info!("🗑️ MeetingIdScanner: released");
    }
}

/// 把任意带分隔符的 11 位会议号格式化为 `XXX-XXXX-XXXX`
#[frb(sync)]
pub fn format_meeting_id(text: String) -> Result<String, ScanApiError> {
    Ok(MeetingId::parse(&text)?.formatted())
}

/// 浏览器打开用的网页链接，domain 为空时使用 zoom.us
#[frb(sync)]
pub fn meeting_web_url(meeting_id: String, domain: Option<String>) -> Result<String, ScanApiError> {
    let id = MeetingId::parse(&meeting_id)?;
    let urls = match domain {
        Some(domain) => MeetingUrlGenerator::with_domain(&domain)?,
        None => MeetingUrlGenerator::default(),
    };
    Ok(urls.web_url(&id))
}

/// 清洗用户输入的公司域名
#[frb(sync)]
pub fn sanitize_domain(domain: String) -> String {
    url::sanitize_domain(&domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::scan::{BlockBounds, BrightnessLevel, OcrTextBlock};

    fn frame_with(text_blocks: Vec<OcrTextBlock>, luma: u8) -> ScanFrameData {
        ScanFrameData {
            width: 100,
            height: 100,
            rotation_degrees: 90,
            y_plane: Some(vec![luma; 100 * 100]),
            text_blocks,
        }
    }

    fn centered(text: &str) -> OcrTextBlock {
        OcrTextBlock {
            text: text.to_string(),
            bounds: Some(BlockBounds {
                left: 30,
                top: 40,
                right: 70,
                bottom: 50,
            }),
        }
    }

    #[test]
    fn test_process_frame_detects_with_custom_domain() {
        let scanner =
            MeetingIdScanner::create(Some(r#"{ web_domain: "Acme.Zoom.us" }"#.to_string()))
                .expect("scanner should be created");

        let events = scanner.process_frame(frame_with(
            vec![centered("Meeting ID: 938 5144 6032")],
            128,
        ));

        assert_eq!(
            events,
            vec![ScanEvent::Detected {
                uri: "zoomus://zoom.us/join?confno=93851446032".to_string(),
                web_url: "https://acme.zoom.us/j/93851446032".to_string(),
                meeting_id: "938-5144-6032".to_string(),
            }]
        );
        assert_eq!(scanner.stats().detections, 1);
    }

    #[test]
    fn test_process_frame_reports_brightness_when_region_empty() {
        let scanner = MeetingIdScanner::create(None).unwrap();

        let outside = OcrTextBlock {
            text: "93851446032".to_string(),
            bounds: Some(BlockBounds {
                left: 0,
                top: 0,
                right: 10,
                bottom: 10,
            }),
        };
        let unbounded = OcrTextBlock {
            text: "93851446032".to_string(),
            bounds: None,
        };

        let events = scanner.process_frame(frame_with(vec![outside, unbounded], 20));
        assert_eq!(
            events,
            vec![ScanEvent::Brightness {
                level: BrightnessLevel::TooDark
            }]
        );
    }

    #[test]
    fn test_frame_without_image_yields_nothing() {
        let scanner = MeetingIdScanner::create(None).unwrap();
        let mut frame = frame_with(vec![centered("93851446032")], 128);
        frame.y_plane = None;

        assert!(scanner.process_frame(frame).is_empty());
        assert_eq!(scanner.stats().processed_frames, 1);
    }

    #[test]
    fn test_events_stay_with_the_producing_thread() {
        let scanner = MeetingIdScanner::create(None).unwrap();

        // 另一线程产生、尚未取走的事件
        let other = thread::spawn(|| thread::current().id()).join().unwrap();
        let foreign = ScanEvent::Brightness {
            level: BrightnessLevel::TooBright,
        };
        scanner.events.lock().unwrap().push((other, foreign.clone()));

        let events = scanner.process_frame(frame_with(vec![], 20));
        assert_eq!(
            events,
            vec![ScanEvent::Brightness {
                level: BrightnessLevel::TooDark
            }]
        );

        // 没有提交的帧不取任何事件
        let mut no_image = frame_with(vec![], 20);
        no_image.y_plane = None;
        assert!(scanner.process_frame(no_image).is_empty());

        assert_eq!(*scanner.events.lock().unwrap(), vec![(other, foreign)]);
    }

    #[test]
    fn test_create_rejects_bad_config() {
        let err = MeetingIdScanner::create(Some("{ min_overlap: 2 }".to_string()))
            .err()
            .expect("config should be rejected");
        assert_eq!(err.error_type, "InvalidConfig");

        let err = MeetingIdScanner::create(Some("{ web_domain: 'intranet' }".to_string()))
            .err()
            .expect("domain should be rejected");
        assert_eq!(err.error_type, "InvalidDomain");
    }

    #[test]
    fn test_free_functions() {
        assert_eq!(format_meeting_id("938 5144 6032".to_string()).unwrap(), "938-5144-6032");
        assert_eq!(
            format_meeting_id("938 5144 603".to_string()).unwrap_err().error_type,
            "InvalidMeetingId"
        );
        assert_eq!(
            meeting_web_url("93851446032".to_string(), None).unwrap(),
            "https://zoom.us/j/93851446032"
        );
        assert_eq!(sanitize_domain(" My Co.Zoom.us ".to_string()), "myco.zoom.us");
    }
}
