//! 下载完成探测服务 - 业务能力层
//!
//! 浏览器对进行中的下载使用 `.crdownload` 临时名，
//! 目录里不再有这类条目即认为下载已静默。
//! 等待是建议性的：超时后调用方照常继续，卡住的
//! 临时文件极少见，不应让整次运行失败。

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::infrastructure::wait_until;

/// 进行中下载的临时后缀
const PARTIAL_SUFFIX: &str = ".crdownload";

/// 下载完成探测器
pub struct DownloadWatcher {
    timeout: Duration,
    interval: Duration,
}

impl DownloadWatcher {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// 等待目录静默（没有 `.crdownload` 条目）
    ///
    /// 返回是否在超时前达到静默。
    pub async fn wait_for_quiescence(&self, dir: &Path) -> bool {
        let quiesced = wait_until(self.timeout, self.interval, || async {
            !has_partial_entries(dir)
        })
        .await;
        debug!(
            "下载目录 {} {}",
            dir.display(),
            if quiesced { "已静默" } else { "等待静默超时" }
        );
        quiesced
    }

    /// 目录中最近完成的下载文件（按修改时间，跳过临时条目）
    pub fn latest_completed_file(dir: &Path) -> Option<PathBuf> {
        let entries = std::fs::read_dir(dir).ok()?;
        entries
            .flatten()
            .filter(|e| e.path().is_file())
            .filter(|e| !is_partial(&e.file_name().to_string_lossy()))
            .filter_map(|e| {
                let modified = e.metadata().ok()?.modified().ok()?;
                Some((modified, e.path()))
            })
            .max_by_key(|(modified, _)| *modified)
            .map(|(_, path)| path)
    }
}

fn is_partial(name: &str) -> bool {
    name.to_lowercase().ends_with(PARTIAL_SUFFIX)
}

/// 目录里是否还有进行中的下载
///
/// 目录读不了时按"无临时条目"处理，保持建议性语义。
fn has_partial_entries(dir: &Path) -> bool {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .any(|e| is_partial(&e.file_name().to_string_lossy())),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn watcher_ms(timeout: u64) -> DownloadWatcher {
        DownloadWatcher::new(Duration::from_millis(timeout), Duration::from_millis(5))
    }

    #[tokio::test]
    async fn empty_dir_is_quiescent_immediately() {
        let dir = tempdir().unwrap();
        assert!(watcher_ms(50).wait_for_quiescence(dir.path()).await);
    }

    #[tokio::test]
    async fn completed_files_do_not_block_quiescence() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("hansard.txt"), "text").unwrap();
        assert!(watcher_ms(50).wait_for_quiescence(dir.path()).await);
    }

    #[tokio::test]
    async fn partial_entry_blocks_until_removed() {
        let dir = tempdir().unwrap();
        let partial = dir.path().join("hansard.txt.crdownload");
        fs::write(&partial, "half").unwrap();

        let remover = {
            let partial = partial.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                fs::remove_file(partial).unwrap();
            })
        };

        assert!(watcher_ms(500).wait_for_quiescence(dir.path()).await);
        remover.await.unwrap();
    }

    #[tokio::test]
    async fn stuck_partial_times_out_without_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("stuck.CRDOWNLOAD"), "half").unwrap();
        assert!(!watcher_ms(30).wait_for_quiescence(dir.path()).await);
    }

    #[test]
    fn latest_completed_file_skips_partials() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("older.txt"), "a").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        fs::write(dir.path().join("newer.txt"), "b").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        fs::write(dir.path().join("ignored.crdownload"), "c").unwrap();

        let latest = DownloadWatcher::latest_completed_file(dir.path()).unwrap();
        assert_eq!(latest.file_name().unwrap(), "newer.txt");
    }

    #[test]
    fn latest_completed_file_empty_dir_is_none() {
        let dir = tempdir().unwrap();
        assert_eq!(DownloadWatcher::latest_completed_file(dir.path()), None);
    }
}
