//! 查看器导航服务 - 业务能力层
//!
//! 驱动门户的文档查看器：打开按日期过滤的结果页、激活查看器、
//! 读取工具栏计数、前后翻页、触发"下载为文本"。
//!
//! 工具栏标签是位置的唯一事实来源：门户 UI 偶发点击不生效、
//! 横幅拦截点击，所以每次导航都用重新读取标签来验证结果，
//! 而不是信任某次点击成功。

use std::time::Duration;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::MonitorError;
use crate::infrastructure::{wait_until, PageDriver};
use crate::models::DocPosition;

const VIEWER_TOOLBAR: &str = "#viewer_toolbar";
const TOOLBAR_LABEL: &str = "#viewer_toolbar_filename";
const PREV_BUTTON: &str = "#viewer_toolbar .btn.btn-prev";
const NEXT_BUTTON: &str = "#viewer_toolbar .btn.btn-next";
const DOWNLOAD_BUTTON: &str = "#viewer_toolbar .btn.btn-download";
const SEARCH_INPUT: &str = "input[name='IW_FIELD_WEB_STYLE']";

/// 打开下载菜单与点击菜单项之间的缓冲
const MENU_SETTLE: Duration = Duration::from_millis(200);
/// 提交搜索后等结果渲染的缓冲
const RESULTS_SETTLE: Duration = Duration::from_secs(3);

static FILENAME_SANITIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("文件名清洗正则"));

/// 查看器导航器
pub struct ViewerNavigator<'a> {
    driver: &'a PageDriver,
    config: &'a Config,
    /// UI 探测间隔
    poll: Duration,
}

impl<'a> ViewerNavigator<'a> {
    pub fn new(driver: &'a PageDriver, config: &'a Config) -> Self {
        Self {
            driver,
            config,
            poll: config.poll_interval(),
        }
    }

    /// 本日期的结果页 URL
    pub fn daily_results_url(&self, date: NaiveDate) -> String {
        build_daily_url(&self.config.search_base_url, &self.config.isys_query_id, date)
    }

    /// 导航到按日期过滤的结果页
    pub async fn open_results(&self, date: NaiveDate) -> Result<()> {
        let url = self.daily_results_url(date);
        info!("打开结果页: {}", url);
        self.driver.page().goto(url.as_str()).await?;
        self.driver.page().wait_for_navigation().await?;
        Ok(())
    }

    /// 备用流程：在搜索页提交日期短语查询
    ///
    /// 返回是否成功提交（输入框始终没出现则为 false）。
    pub async fn search_by_phrase(&self, date: NaiveDate) -> Result<bool> {
        let query = build_phrase_query(date);
        info!("🔍 备用流程：短语搜索 {}", query);

        self.driver
            .page()
            .goto(self.config.search_base_url.as_str())
            .await?;
        self.driver.page().wait_for_navigation().await?;

        let input_ready = self
            .driver
            .wait_for_visible(SEARCH_INPUT, self.config.wait_timeout(), self.poll)
            .await;
        if !input_ready {
            return Ok(false);
        }

        if !self.driver.set_value(SEARCH_INPUT, &query).await {
            return Ok(false);
        }
        if !self.driver.submit_form_of(SEARCH_INPUT).await {
            return Ok(false);
        }
        sleep(RESULTS_SETTLE).await;
        Ok(true)
    }

    /// 激活结果列表中第一个查看器链接，并等工具栏出现
    ///
    /// 查看器入口是 onclick 含 `isys.viewer.show` 的锚点，
    /// 点它可靠地打开文档集的查看器。
    pub async fn open_viewer(&self) -> crate::error::Result<()> {
        let js_code = r#"(() => {
            for (const a of document.querySelectorAll('a[onclick]')) {
                const onclick = a.getAttribute('onclick') || '';
                if (onclick.includes('isys.viewer.show') && a.getClientRects().length > 0) {
                    a.click();
                    return true;
                }
            }
            return false;
        })()"#;

        let clicked = wait_until(self.config.wait_timeout(), self.poll, || async {
            self.driver.eval_as::<bool>(js_code).await.unwrap_or(false)
        })
        .await;
        if !clicked {
            return Err(MonitorError::ViewerNotFound);
        }
        debug!("已点击查看器入口链接");

        let toolbar_ready = self
            .driver
            .wait_for_visible(VIEWER_TOOLBAR, self.config.wait_timeout(), self.poll)
            .await;
        if !toolbar_ready {
            return Err(MonitorError::ViewerNotFound);
        }
        Ok(())
    }

    /// 读取工具栏标签全文
    pub async fn read_label(&self) -> Result<Option<String>> {
        let visible = self
            .driver
            .wait_for_visible(TOOLBAR_LABEL, self.config.wait_timeout(), self.poll)
            .await;
        if !visible {
            return Ok(None);
        }
        self.driver.text(TOOLBAR_LABEL).await
    }

    /// 读取当前文档位置
    pub async fn read_position(&self) -> Result<Option<DocPosition>> {
        Ok(self
            .read_label()
            .await?
            .as_deref()
            .and_then(DocPosition::parse))
    }

    /// 当前文档标题（工具栏标签中计数之前的部分）
    pub async fn document_title(&self) -> Result<Option<String>> {
        Ok(self.read_label().await?.map(|label| {
            label
                .split('[')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        }))
    }

    /// 点一次"上一个"，返回是否点到了
    pub async fn step_previous(&self) -> Result<bool> {
        let clicked = self
            .driver
            .wait_and_click(PREV_BUTTON, self.config.wait_timeout(), self.poll)
            .await;
        if clicked {
            sleep(self.config.nav_delay()).await;
        }
        Ok(clicked)
    }

    /// 前进到第 `next` 个文档并验证
    ///
    /// 点击"下一个"后等工具栏字面出现 `[next of total]`。
    /// 按钮始终不可点是错误（终止本日期）；验证超时返回
    /// Ok(false)，由调用方决定是否继续。
    pub async fn advance_to(&self, next: u32, total: u32) -> Result<bool> {
        let clicked = self
            .driver
            .wait_and_click(NEXT_BUTTON, self.config.wait_timeout(), self.poll)
            .await;
        if !clicked {
            bail!("翻页按钮在 {} 秒内不可点击", self.config.wait_secs);
        }

        let target = DocPosition::label(next, total);
        let verified = self
            .driver
            .wait_for_text(TOOLBAR_LABEL, &target, self.config.wait_timeout(), self.poll)
            .await;
        if verified {
            sleep(self.config.nav_delay()).await;
        }
        Ok(verified)
    }

    /// 触发"下载为文本"（两步菜单交互）
    pub async fn download_as_text(&self) -> Result<()> {
        let opened = self
            .driver
            .wait_and_click(DOWNLOAD_BUTTON, self.config.wait_timeout(), self.poll)
            .await;
        if !opened {
            bail!("下载按钮在 {} 秒内不可点击", self.config.wait_secs);
        }
        sleep(MENU_SETTLE).await;

        // 菜单项没有稳定的 id，按文本匹配
        let js_code = r#"(() => {
            const menu = document.querySelector('#viewer_toolbar_download');
            if (!menu) return false;
            for (const li of menu.querySelectorAll('li')) {
                const text = (li.textContent || '').toLowerCase();
                if (text.includes('as text') && li.getClientRects().length > 0) {
                    li.click();
                    return true;
                }
            }
            return false;
        })()"#;
        let picked = wait_until(self.config.wait_timeout(), self.poll, || async {
            self.driver.eval_as::<bool>(js_code).await.unwrap_or(false)
        })
        .await;
        if !picked {
            bail!("下载菜单中 {} 秒内未出现\"as text\"选项", self.config.wait_secs);
        }
        Ok(())
    }
}

/// 按日期过滤的结果页 URL
///
/// 日期以 `YYYY MM DD` 形式嵌入两次，构成单日范围过滤。
pub fn build_daily_url(base: &str, query_id: &str, date: NaiveDate) -> String {
    let day = date.format("%Y %m %d");
    format!("{}/isysquery/{}/{}-{}/filter/date/", base, query_id, day, day)
}

/// 日期短语查询，如 `"Tuesday 17 March 2020"`（日无前导零）
pub fn build_phrase_query(date: NaiveDate) -> String {
    format!("\"{}\"", date.format("%A %-d %B %Y"))
}

/// 从文档标题导出文件系统安全的文件名
pub fn sanitize_filename(title: &str) -> String {
    FILENAME_SANITIZE_RE
        .replace_all(title, "")
        .trim()
        .replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_url_embeds_the_date_twice() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let url = build_daily_url(
            "https://search.parliament.tas.gov.au/search",
            "8e715d42-5fe7-4c4b-a8b5-8c1dbdd29c36",
            date,
        );
        assert_eq!(
            url,
            "https://search.parliament.tas.gov.au/search/isysquery/\
             8e715d42-5fe7-4c4b-a8b5-8c1dbdd29c36/2024 03 05-2024 03 05/filter/date/"
        );
    }

    #[test]
    fn phrase_query_is_quoted_with_unpadded_day() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 17).unwrap();
        assert_eq!(build_phrase_query(date), "\"Tuesday 17 March 2020\"");

        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(build_phrase_query(date), "\"Tuesday 5 March 2024\"");
    }

    #[test]
    fn sanitize_strips_punctuation_and_joins_with_underscores() {
        assert_eq!(
            sanitize_filename("House of Assembly, Tuesday 17 March 2020!"),
            "House_of_Assembly_Tuesday_17_March_2020"
        );
    }

    #[test]
    fn sanitize_trims_before_joining() {
        assert_eq!(sanitize_filename("  Question Time  "), "Question_Time");
        assert_eq!(sanitize_filename("A-B c"), "A-B_c");
    }
}
