//! 单日运行处理器 - 编排层
//!
//! ## 职责
//!
//! 处理一个日期的完整监测流程：
//!
//! 1. **会话获取**：为本日期的下载目录启动浏览器会话
//! 2. **浏览器驱动**：打开结果页 → 激活查看器 → 归位 → 翻页下载
//! 3. **保证释放**：无论驱动阶段成败，会话一定关闭
//! 4. **扫描与通知**：对下载的文本做关键词扫描、追加 CSV、发邮件
//!
//! 驱动阶段的致命错误终止本日期的剩余文档，但不会抛过
//! 运行边界：失败前已下载的文件照常进入扫描阶段。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::error::MonitorError;
use crate::models::{DocPosition, Mention};
use crate::services::{BannerSweeper, DownloadWatcher, MatchLog, Mailer, MentionScanner, ViewerNavigator};
use crate::workflow::{normalize_to_first, run_pagination, DocumentFlow, PaginationStats};

/// 单日运行结果
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// 目标日期（ISO 格式）
    pub date: String,
    /// 本日期目录中的转录文件数
    pub documents: usize,
    /// 关键词命中总数
    pub matches: usize,
    /// 是否发送了汇总邮件
    pub emailed: bool,
}

/// 处理一个日期
pub async fn process_date(config: &Config, date: NaiveDate, keywords: &[String]) -> Result<RunReport> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let download_dir = Path::new(&config.download_root).join(&date_str);

    // ========== 浏览器驱动阶段 ==========
    let session = BrowserSession::launch(&download_dir, config.headless).await?;
    let outcome = drive_viewer(&session, config, date).await;
    // 所有退出路径都在这里释放会话；释放失败只记日志
    session.close().await;

    match &outcome {
        Ok(stats) => info!(
            "[{}] ✓ 浏览器驱动阶段结束: 已请求 {} 个下载, 翻页超时 {} 次{}",
            date_str,
            stats.fetched,
            stats.advance_failures,
            if stats.aborted { "（提前终止）" } else { "" }
        ),
        Err(e) => error!("[{}] ❌ 浏览器驱动阶段失败: {}", date_str, e),
    }

    // ========== 扫描与通知阶段 ==========
    let transcripts = list_transcripts(&download_dir);
    if transcripts.is_empty() {
        info!("[{}] 本日期没有新文档，跳过扫描和邮件", date_str);
        return Ok(RunReport {
            date: date_str,
            documents: 0,
            matches: 0,
            emailed: false,
        });
    }

    let mentions = scan_transcripts(&transcripts, keywords);
    info!(
        "[{}] 📄 {} 个转录文件, {} 条关键词命中",
        date_str,
        transcripts.len(),
        mentions.len()
    );

    MatchLog::new(&config.match_log_file)
        .append(&date_str, &mentions)
        .context("写入匹配记录失败")?;

    let mailer = Mailer::new(config);
    let emailed = mailer.is_configured();
    mailer.send_summary(&date_str, &mentions).await?;

    Ok(RunReport {
        date: date_str,
        documents: transcripts.len(),
        matches: mentions.len(),
        emailed,
    })
}

/// 浏览器驱动阶段：结果页 → 查看器 → 归位 → 翻页下载
async fn drive_viewer(
    session: &BrowserSession,
    config: &Config,
    date: NaiveDate,
) -> Result<PaginationStats> {
    let driver = session.open_page("about:blank").await?;
    let navigator = ViewerNavigator::new(&driver, config);
    let sweeper = BannerSweeper::new(config.banner_timeout());

    navigator.open_results(date).await?;
    sweeper.sweep(&driver).await;

    // URL 流程找不到查看器入口时，回退到短语搜索再试一次
    if let Err(e) = navigator.open_viewer().await {
        warn!("结果页未出现查看器入口（{}），尝试短语搜索回退", e);
        if !navigator.search_by_phrase(date).await? {
            return Err(MonitorError::ViewerNotFound.into());
        }
        sweeper.sweep(&driver).await;
        navigator.open_viewer().await?;
    }
    sweeper.sweep(&driver).await;

    // 工具栏是位置的唯一事实来源；读不出计数就没法安全翻页
    let label = navigator.read_label().await?.unwrap_or_default();
    let Some(position) = DocPosition::parse(&label) else {
        return Err(MonitorError::ToolbarUnreadable { text: label }.into());
    };
    let total = position.total;
    info!("📄 本日期共 {} 个文档", total);

    let watcher = DownloadWatcher::new(config.download_timeout(), config.poll_interval());
    let mut flow = DocumentFlow::new(&navigator, &watcher, session.download_dir(), config, total);

    normalize_to_first(&mut flow, total).await?;
    Ok(run_pagination(&mut flow, total).await)
}

/// 列出日期目录里的转录文件（*.txt，按名字排序）
fn list_transcripts(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("txt"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// 扫描所有转录文件；单个文件读取失败只记日志，不影响其余文件
fn scan_transcripts(transcripts: &[PathBuf], keywords: &[String]) -> Vec<Mention> {
    let scanner = MentionScanner::new(keywords);
    let mut mentions = Vec::new();
    for path in transcripts {
        match scanner.scan_file(path) {
            Ok(found) => mentions.extend(found),
            Err(e) => warn!("⚠️ 扫描 {} 失败: {}", path.display(), e),
        }
    }
    mentions
}
