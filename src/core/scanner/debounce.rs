use std::sync::Mutex;
use std::time::Instant;

/// 毫秒时钟，测试中可替换
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// 单调时钟，从创建时刻开始计时
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// 识别成功去抖：冷却窗口内的再次识别被静默丢弃
///
/// 只有成功的识别才会写入时间戳。
pub struct DetectionDebouncer {
    cooldown_ms: u64,
    last_accepted_ms: Mutex<Option<u64>>,
}

impl DetectionDebouncer {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last_accepted_ms: Mutex::new(None),
        }
    }

    /// 冷却结束时运行 `detect`，其返回 `Some` 则记录 `now_ms` 为最近接受时间。
    /// 冷却期内不调用 `detect`。
    pub fn try_accept<T>(&self, now_ms: u64, detect: impl FnOnce() -> Option<T>) -> Option<T> {
        let mut last = match self.last_accepted_ms.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(last_ms) = *last {
            if now_ms.saturating_sub(last_ms) < self.cooldown_ms {
                return None;
            }
        }

        let detected = detect()?;
        *last = Some(now_ms);
        Some(detected)
    }

    pub fn last_accepted_ms(&self) -> Option<u64> {
        match self.last_accepted_ms.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::testing::ManualClock;

    #[test]
    fn test_first_detection_accepted_at_time_zero() {
        let debouncer = DetectionDebouncer::new(500);
        assert_eq!(debouncer.try_accept(0, || Some("a")), Some("a"));
        assert_eq!(debouncer.last_accepted_ms(), Some(0));
    }

    #[test]
    fn test_cooldown_suppresses_and_skips_detection() {
        let debouncer = DetectionDebouncer::new(500);
        assert!(debouncer.try_accept(1000, || Some(1)).is_some());

        let mut invoked = false;
        let result = debouncer.try_accept(1200, || {
            invoked = true;
            Some(2)
        });
        assert!(result.is_none());
        assert!(!invoked);
        assert!(debouncer.try_accept(1499, || Some(2)).is_none());

        assert_eq!(debouncer.try_accept(1600, || Some(3)), Some(3));
        assert_eq!(debouncer.last_accepted_ms(), Some(1600));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let debouncer = DetectionDebouncer::new(500);
        debouncer.try_accept(1000, || Some(()));
        assert!(debouncer.try_accept(1500, || Some(())).is_some());
    }

    #[test]
    fn test_failed_detection_leaves_timestamp_untouched() {
        let debouncer = DetectionDebouncer::new(500);
        assert!(debouncer.try_accept(1000, || None::<()>).is_none());
        assert_eq!(debouncer.last_accepted_ms(), None);
        assert_eq!(debouncer.try_accept(1001, || Some(())), Some(()));
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::at(5);
        assert_eq!(clock.now_ms(), 5);
        clock.set(600);
        assert_eq!(clock.now_ms(), 600);
    }
}
