use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 帧闸门：同一时刻最多一帧在识别流程中，忙时到达的帧直接丢弃（不排队）
#[derive(Debug, Default)]
pub struct FrameGate {
    busy: Arc<AtomicBool>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 原子地测试并置位忙标志，成功时返回租约，租约 drop 时清除忙标志
    pub fn try_acquire(&self) -> Option<BusyLease> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyLease {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// 忙标志租约，恰好释放一次
#[derive(Debug)]
pub struct BusyLease {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyLease {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_second_acquire_fails_while_busy() {
        let gate = FrameGate::new();
        let lease = gate.try_acquire().expect("gate starts idle");
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());

        drop(lease);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn test_concurrent_acquire_admits_one() {
        let gate = Arc::new(FrameGate::new());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    gate.try_acquire()
                })
            })
            .collect();

        let leases: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        assert_eq!(leases.iter().filter(|l| l.is_some()).count(), 1);
    }
}
