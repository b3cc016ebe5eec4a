//! 有界轮询等待 - 基础设施层
//!
//! UI 就绪、下载静默等所有"等到某条件成立"的场景共用这一个原语：
//! 固定间隔轮询，直到条件成立或超时。超时不抛错，由调用方决定
//! 是降级继续还是终止运行。

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

/// 轮询 `probe` 直到其返回 true 或超时
///
/// 返回条件是否在截止时间前成立。`probe` 至少执行一次，
/// 因此超时为零时仍然相当于一次即时探测。
pub async fn wait_until<F, Fut>(timeout: Duration, interval: Duration, mut probe: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if probe().await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_immediately_without_sleeping() {
        let held = wait_until(Duration::from_millis(10), Duration::from_millis(1), || async {
            true
        })
        .await;
        assert!(held);
    }

    #[tokio::test]
    async fn times_out_when_probe_never_holds() {
        let held = wait_until(Duration::from_millis(20), Duration::from_millis(5), || async {
            false
        })
        .await;
        assert!(!held);
    }

    #[tokio::test]
    async fn keeps_polling_until_probe_holds() {
        let calls = AtomicU32::new(0);
        let held = wait_until(Duration::from_secs(1), Duration::from_millis(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { n >= 3 }
        })
        .await;
        assert!(held);
        assert!(calls.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn zero_timeout_still_probes_once() {
        let calls = AtomicU32::new(0);
        let held = wait_until(Duration::ZERO, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { false }
        })
        .await;
        assert!(!held);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
