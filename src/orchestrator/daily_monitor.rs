//! 日常监测应用 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口对象，负责单日监测的调度。
//!
//! 1. **配置持有**：唯一持有 Config 的模块
//! 2. **关键词加载**：请求未指定时从关键词文件读取
//! 3. **运行调度**：委托 run_processor 处理具体日期
//! 4. **运行统计**：输出起止横幅和结果摘要

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::Config;
use crate::orchestrator::run_processor::{self, RunReport};
use crate::services::load_keywords;

/// 日常监测应用
pub struct DailyMonitor {
    config: Config,
}

impl DailyMonitor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 为指定日期跑一次完整监测
    ///
    /// `keywords` 为 None 时从配置的关键词文件加载；
    /// `recipients` 为 None 时沿用配置里的收件人。
    pub async fn run_for(
        &self,
        date: NaiveDate,
        keywords: Option<Vec<String>>,
        recipients: Option<String>,
    ) -> Result<RunReport> {
        let keywords = keywords
            .unwrap_or_else(|| load_keywords(Path::new(&self.config.keywords_file)));
        if keywords.is_empty() {
            warn!("⚠️ 关键词列表为空，下载仍会进行，但不会产生任何匹配");
        }

        let mut config = self.config.clone();
        if let Some(recipients) = recipients {
            config.recipients = recipients;
        }

        log_run_start(&date.format("%Y-%m-%d").to_string(), keywords.len());
        let report = run_processor::process_date(&config, date, &keywords).await?;
        log_run_complete(&report);
        Ok(report)
    }
}

// ========== 日志辅助函数 ==========

fn log_run_start(date: &str, keyword_count: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始监测 - 日期: {}", date);
    info!("📋 关键词数量: {}", keyword_count);
    info!("{}", "=".repeat(60));
}

fn log_run_complete(report: &RunReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 监测完成 - 日期: {}", report.date);
    info!("📄 转录文件: {}", report.documents);
    info!("✅ 关键词命中: {}", report.matches);
    info!(
        "📧 汇总邮件: {}",
        if report.emailed { "已发送" } else { "未配置，已跳过" }
    );
    info!("{}", "=".repeat(60));
}
