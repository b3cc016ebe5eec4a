//! 浏览器会话管理 - 浏览器层
//!
//! 负责启动 / 关闭受控的无头浏览器实例，并把下载行为
//! 定向到本次运行的下载目录。创建失败对整次运行是致命的；
//! 关闭失败只记日志，不向上传播。

use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{MonitorError, Result};
use crate::infrastructure::PageDriver;

/// 浏览器会话
///
/// 持有 Browser 和 CDP 事件处理任务，生命周期与单日运行一致。
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    download_dir: PathBuf,
}

impl BrowserSession {
    /// 启动无头浏览器，下载目录定向到 `download_dir`
    pub async fn launch(download_dir: &Path, headless: bool) -> Result<Self> {
        info!("🚀 启动浏览器会话...");
        debug!("下载目录: {}", download_dir.display());

        std::fs::create_dir_all(download_dir)
            .map_err(|e| MonitorError::SessionFailed(format!("创建下载目录失败: {}", e)))?;

        let mut builder = BrowserConfig::builder().args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--remote-debugging-port=0",
        ]);
        builder = if headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        let config = builder
            .build()
            .map_err(|e| MonitorError::SessionFailed(format!("配置浏览器失败: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| MonitorError::SessionFailed(format!("启动浏览器失败: {}", e)))?;
        debug!("浏览器启动成功");

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        // 添加短暂延迟以等待浏览器状态同步
        sleep(Duration::from_millis(300)).await;

        Ok(Self {
            browser,
            handler_task,
            download_dir: download_dir.to_path_buf(),
        })
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// 打开页面并配置静默下载
    ///
    /// 下载行为必须在触发下载的那个 page 上配置，
    /// 否则浏览器会弹出保存对话框。
    pub async fn open_page(&self, url: &str) -> anyhow::Result<PageDriver> {
        debug!("打开页面: {}", url);
        let page = self.browser.new_page(url).await?;

        let params = SetDownloadBehaviorParams {
            behavior: SetDownloadBehaviorBehavior::Allow,
            download_path: Some(self.download_dir.to_string_lossy().to_string()),
            browser_context_id: None,
            events_enabled: None,
        };
        page.execute(params).await?;
        debug!("下载行为已定向到 {}", self.download_dir.display());

        Ok(PageDriver::new(page))
    }

    /// 关闭会话（尽力而为，失败只记日志）
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("⚠️ 关闭浏览器失败: {}", e);
        }
        // 给事件处理任务一点时间自然结束
        if tokio::time::timeout(Duration::from_secs(2), &mut self.handler_task)
            .await
            .is_err()
        {
            self.handler_task.abort();
        }
        info!("浏览器会话已关闭");
    }
}
