//! 关闭信号与等待
//!
//! 控制流程中的所有等待都经过 [`Pacer`]，收到关闭请求后立即返回
//! [`WaitOutcome::Cancelled`]。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

/// 一次等待的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// 等满了指定时长
    Elapsed,
    /// 被关闭请求打断
    Cancelled,
}

impl WaitOutcome {
    pub fn is_cancelled(self) -> bool {
        self == WaitOutcome::Cancelled
    }
}

/// 可被打断的等待
pub trait Pacer {
    fn wait(&self, duration: Duration) -> WaitOutcome;

    fn is_cancelled(&self) -> bool;
}

/// 创建一对关闭触发器/令牌
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownToken) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let fired = Arc::new(AtomicBool::new(false));
    (
        ShutdownTrigger {
            tx,
            fired: Arc::clone(&fired),
        },
        ShutdownToken { rx, fired },
    )
}

/// 关闭触发器（可克隆，可在信号处理线程中使用）
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Sender<()>,
    fired: Arc<AtomicBool>,
}

impl ShutdownTrigger {
    /// 请求关闭，重复调用无副作用
    pub fn fire(&self) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            // 容量为 1，唤醒正在等待的一方即可
            let _ = self.tx.try_send(());
        }
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

/// 关闭令牌，作为真实的 [`Pacer`]
#[derive(Debug)]
pub struct ShutdownToken {
    rx: Receiver<()>,
    fired: Arc<AtomicBool>,
}

impl Pacer for ShutdownToken {
    fn wait(&self, duration: Duration) -> WaitOutcome {
        if self.is_cancelled() {
            return WaitOutcome::Cancelled;
        }

        let start = Instant::now();
        match self.rx.recv_timeout(duration) {
            Ok(()) => WaitOutcome::Cancelled,
            Err(RecvTimeoutError::Timeout) if self.is_cancelled() => WaitOutcome::Cancelled,
            Err(RecvTimeoutError::Timeout) => WaitOutcome::Elapsed,
            Err(RecvTimeoutError::Disconnected) => {
                // 所有触发器都已释放，不会再有关闭请求
                spin_sleep::sleep(duration.saturating_sub(start.elapsed()));
                WaitOutcome::Elapsed
            },
        }
    }

    fn is_cancelled(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_wait_elapses_without_trigger() {
        let (_trigger, token) = shutdown_channel();
        let start = Instant::now();
        assert_eq!(token.wait(Duration::from_millis(20)), WaitOutcome::Elapsed);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_fire_interrupts_wait() {
        let (trigger, token) = shutdown_channel();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            trigger.fire();
        });

        let start = Instant::now();
        assert_eq!(token.wait(Duration::from_secs(10)), WaitOutcome::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();

        // 之后的等待立即返回
        assert!(token.is_cancelled());
        assert_eq!(token.wait(Duration::from_secs(10)), WaitOutcome::Cancelled);
    }

    #[test]
    fn test_fire_is_idempotent() {
        let (trigger, token) = shutdown_channel();
        let clone = trigger.clone();
        trigger.fire();
        clone.fire();
        assert!(trigger.is_fired());
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_dropped_trigger_still_waits() {
        let (trigger, token) = shutdown_channel();
        drop(trigger);
        let start = Instant::now();
        assert_eq!(token.wait(Duration::from_millis(15)), WaitOutcome::Elapsed);
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
