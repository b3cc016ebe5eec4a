//! 单文档处理流程 - 流程层
//!
//! 一个文档的完整获取流程：
//! （可选）按标题查重跳过 → 触发"下载为文本" → 固定缓冲 →
//! 等下载目录静默 → （可选）把最新完成的文件改成标题名。
//!
//! 把查看器能力和下载探测拼成 `DocumentPager` / `ViewerControls`，
//! 供翻页循环驱动。不持有 Page，只依赖业务能力层。

use std::path::Path;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::DocPosition;
use crate::services::viewer_navigator::sanitize_filename;
use crate::services::{DownloadWatcher, ViewerNavigator};
use crate::workflow::pagination::{DocumentPager, ViewerControls};

/// 单文档处理流程
pub struct DocumentFlow<'a> {
    navigator: &'a ViewerNavigator<'a>,
    watcher: &'a DownloadWatcher,
    download_dir: &'a Path,
    config: &'a Config,
    /// 本日期文档总数（用于翻页验证的目标标签）
    total: u32,
}

impl<'a> DocumentFlow<'a> {
    pub fn new(
        navigator: &'a ViewerNavigator<'a>,
        watcher: &'a DownloadWatcher,
        download_dir: &'a Path,
        config: &'a Config,
        total: u32,
    ) -> Self {
        Self {
            navigator,
            watcher,
            download_dir,
            config,
            total,
        }
    }

    /// 当前文档的目标文件名（重命名模式下）
    async fn derive_target_name(&self) -> anyhow::Result<Option<String>> {
        let Some(title) = self.navigator.document_title().await? else {
            return Ok(None);
        };
        let stem = sanitize_filename(&title);
        if stem.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("{}.txt", stem)))
    }

    /// 把最新完成的下载文件改名为 `target_name`（尽力而为）
    fn rename_latest(&self, target_name: &str) {
        let Some(latest) = DownloadWatcher::latest_completed_file(self.download_dir) else {
            warn!("⚠️ 下载目录里没有可重命名的文件");
            return;
        };
        let target = self.download_dir.join(target_name);
        match std::fs::rename(&latest, &target) {
            Ok(()) => info!(
                "✓ 已重命名 {} -> {}",
                latest.file_name().unwrap_or_default().to_string_lossy(),
                target_name
            ),
            Err(e) => warn!("⚠️ 重命名下载文件失败: {}", e),
        }
    }
}

#[async_trait]
impl DocumentPager for DocumentFlow<'_> {
    async fn fetch_current(&mut self, index: u32) -> anyhow::Result<()> {
        // 重命名模式：按标题查重，已存在则整个跳过下载
        let target_name = if self.config.rename_downloads {
            let name = self.derive_target_name().await?;
            if let Some(name) = &name {
                if self.download_dir.join(name).exists() {
                    info!("[文档 {}/{}] 已存在，跳过下载: {}", index, self.total, name);
                    return Ok(());
                }
            }
            name
        } else {
            None
        };

        self.navigator.download_as_text().await?;
        sleep(self.config.click_delay()).await;

        if !self.watcher.wait_for_quiescence(self.download_dir).await {
            // 建议性等待：超时照常继续，卡住的临时文件不终止运行
            warn!("[文档 {}/{}] ⚠️ 下载静默等待超时，照常继续", index, self.total);
        }

        if let Some(name) = target_name {
            self.rename_latest(&name);
        }
        info!("[文档 {}/{}] ✓ 下载已请求", index, self.total);
        Ok(())
    }

    async fn advance_to(&mut self, index: u32) -> anyhow::Result<bool> {
        self.navigator.advance_to(index, self.total).await
    }
}

#[async_trait]
impl ViewerControls for DocumentFlow<'_> {
    async fn read_position(&mut self) -> anyhow::Result<Option<DocPosition>> {
        self.navigator.read_position().await
    }

    async fn step_previous(&mut self) -> anyhow::Result<bool> {
        self.navigator.step_previous().await
    }
}
