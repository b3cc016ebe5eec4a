//! 横幅清理服务 - 业务能力层
//!
//! 尽力关闭可能遮挡工具栏的 cookie / 同意横幅。
//! 横幅不存在是正常情况，不是错误；每个措辞的尝试
//! 都有自己独立的短超时，互不影响。

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::infrastructure::{wait_until, PageDriver};

/// 常见横幅按钮的措辞（小写比较）
const DISMISS_PHRASES: [&str; 4] = ["accept", "agree", "got it", "ok"];

/// 每次点击后给页面的稳定时间
const SETTLE: Duration = Duration::from_millis(200);

/// 横幅清理服务
pub struct BannerSweeper {
    /// 单个措辞的等待上限
    timeout: Duration,
    interval: Duration,
}

impl BannerSweeper {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: Duration::from_millis(300),
        }
    }

    /// 清理一轮横幅
    ///
    /// 在每个导航边界调用一次。任何求值失败都按
    /// "没有横幅"处理，绝不向上传播。
    pub async fn sweep(&self, driver: &PageDriver) {
        for phrase in DISMISS_PHRASES {
            let clicked = wait_until(self.timeout, self.interval, || {
                self.try_dismiss(driver, phrase)
            })
            .await;
            if clicked {
                debug!("已关闭横幅（按钮措辞: {:?}）", phrase);
                sleep(SETTLE).await;
            }
        }
    }

    /// 尝试点击文本包含 `phrase` 的可见按钮或链接
    async fn try_dismiss(&self, driver: &PageDriver, phrase: &str) -> bool {
        let js_code = format!(
            r#"(() => {{
                const phrase = {phrase};
                for (const el of document.querySelectorAll('button, a')) {{
                    const text = (el.textContent || '').trim().toLowerCase();
                    if (text.includes(phrase) && el.getClientRects().length > 0) {{
                        el.click();
                        return true;
                    }}
                }}
                return false;
            }})()"#,
            phrase = serde_json::to_string(phrase).unwrap_or_default(),
        );
        driver.eval_as::<bool>(js_code).await.unwrap_or(false)
    }
}
