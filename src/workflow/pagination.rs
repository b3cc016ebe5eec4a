//! 翻页循环 - 流程层
//!
//! 把"归位到第 1 个文档"和"逐个下载直到最后一个"表达成
//! 与浏览器无关的两个流程，跑在 trait 接口上。流程本身的
//! 计数性质（下载 total 次、翻页 total-1 次、归位幂等）
//! 由此可以脱离浏览器验证。

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::error::MonitorError;
use crate::models::DocPosition;

/// 归位所需的最小查看器能力
#[async_trait]
pub trait ViewerControls {
    /// 读取当前位置（工具栏解析不出计数时为 None）
    async fn read_position(&mut self) -> anyhow::Result<Option<DocPosition>>;
    /// 点一次"上一个"
    async fn step_previous(&mut self) -> anyhow::Result<bool>;
}

/// 翻页循环所需的能力
#[async_trait]
pub trait DocumentPager {
    /// 获取当前文档（触发下载并等它完成）
    async fn fetch_current(&mut self, index: u32) -> anyhow::Result<()>;
    /// 前进到第 `index` 个文档，返回是否验证到位
    async fn advance_to(&mut self, index: u32) -> anyhow::Result<bool>;
}

/// 翻页循环统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PaginationStats {
    /// 成功触发下载的文档数
    pub fetched: u32,
    /// 翻页尝试次数
    pub advance_attempts: u32,
    /// 翻页验证超时次数（记录后继续）
    pub advance_failures: u32,
    /// 是否因不可恢复失败提前终止
    pub aborted: bool,
}

/// 把查看器归位到 `[1 of total]`
///
/// 查看器有时不从第 1 个文档打开。反复点"上一个"直到标签
/// 回到 1，预算为 `total + 2` 次标签读取；预算耗尽说明查看器
/// 状态已经不可信，终止本次运行。返回实际按下"上一个"的次数
/// （已经在第 1 个时为 0，重复调用不产生任何点击）。
pub async fn normalize_to_first<V>(viewer: &mut V, total: u32) -> anyhow::Result<u32>
where
    V: ViewerControls + Send,
{
    let budget = total + 2;
    let mut presses = 0u32;

    for _ in 0..budget {
        let position = viewer.read_position().await?;
        match position {
            Some(pos) if pos.total == total && pos.is_first() => {
                if presses > 0 {
                    info!("✓ 已归位到第 1 个文档（共按 {} 次上一个）", presses);
                }
                return Ok(presses);
            }
            _ => {
                viewer.step_previous().await?;
                presses += 1;
            }
        }
    }

    Err(MonitorError::PositionBudgetExhausted { budget }.into())
}

/// 对 `total` 个文档执行下载-翻页循环
///
/// 无失败时恰好触发 `total` 次下载、`total - 1` 次翻页。
/// 获取失败终止本日期剩余文档（不向上抛）；翻页验证超时
/// 只记录，循环继续。
pub async fn run_pagination<P>(pager: &mut P, total: u32) -> PaginationStats
where
    P: DocumentPager + Send,
{
    let mut stats = PaginationStats::default();

    for index in 1..=total {
        info!("\n[文档 {}/{}] {}", index, total, "─".repeat(30));

        if let Err(e) = pager.fetch_current(index).await {
            error!("[文档 {}/{}] ❌ 获取失败，终止本日期剩余文档: {}", index, total, e);
            stats.aborted = true;
            break;
        }
        stats.fetched += 1;

        if index < total {
            stats.advance_attempts += 1;
            match pager.advance_to(index + 1).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!("[文档 {}/{}] ⚠️ 翻页验证超时，继续处理", index, total);
                    stats.advance_failures += 1;
                }
                Err(e) => {
                    error!("[文档 {}/{}] ❌ 翻页失败，终止本日期剩余文档: {}", index, total, e);
                    stats.aborted = true;
                    break;
                }
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct MockViewer {
        /// 依次返回的标签读取结果，耗尽后停在最后一个
        positions: VecDeque<Option<DocPosition>>,
        last: Option<DocPosition>,
        presses: u32,
    }

    impl MockViewer {
        fn new(positions: Vec<Option<DocPosition>>) -> Self {
            Self {
                positions: positions.into(),
                last: None,
                presses: 0,
            }
        }
    }

    #[async_trait]
    impl ViewerControls for MockViewer {
        async fn read_position(&mut self) -> anyhow::Result<Option<DocPosition>> {
            if let Some(pos) = self.positions.pop_front() {
                self.last = pos;
            }
            Ok(self.last)
        }

        async fn step_previous(&mut self) -> anyhow::Result<bool> {
            self.presses += 1;
            Ok(true)
        }
    }

    fn at(current: u32, total: u32) -> Option<DocPosition> {
        Some(DocPosition { current, total })
    }

    #[tokio::test]
    async fn already_at_first_doc_presses_nothing() {
        let mut viewer = MockViewer::new(vec![at(1, 4)]);
        assert_eq!(normalize_to_first(&mut viewer, 4).await.unwrap(), 0);
        assert_eq!(viewer.presses, 0);

        // 幂等：再归位一次仍然零点击
        let mut viewer = MockViewer::new(vec![at(1, 4), at(1, 4)]);
        normalize_to_first(&mut viewer, 4).await.unwrap();
        assert_eq!(normalize_to_first(&mut viewer, 4).await.unwrap(), 0);
        assert_eq!(viewer.presses, 0);
    }

    #[tokio::test]
    async fn walks_back_from_arbitrary_offset() {
        let mut viewer = MockViewer::new(vec![at(3, 3), at(2, 3), at(1, 3)]);
        assert_eq!(normalize_to_first(&mut viewer, 3).await.unwrap(), 2);
        assert_eq!(viewer.presses, 2);
    }

    #[tokio::test]
    async fn unreadable_label_consumes_budget_then_fails() {
        let mut viewer = MockViewer::new(vec![None]);
        let err = normalize_to_first(&mut viewer, 3).await.unwrap_err();
        assert!(err.to_string().contains("预算耗尽"));
        // total + 2 次读取，每次都点了一下上一个
        assert_eq!(viewer.presses, 5);
    }

    #[tokio::test]
    async fn mismatched_total_keeps_stepping() {
        // 查看器短暂报出别的文档集的计数，随后稳定
        let mut viewer = MockViewer::new(vec![at(1, 9), at(1, 4)]);
        assert_eq!(normalize_to_first(&mut viewer, 4).await.unwrap(), 1);
    }

    #[derive(Default)]
    struct MockPager {
        fetches: Vec<u32>,
        advances: Vec<u32>,
        fail_fetch_at: Option<u32>,
        timeout_advance_at: Option<u32>,
    }

    #[async_trait]
    impl DocumentPager for MockPager {
        async fn fetch_current(&mut self, index: u32) -> anyhow::Result<()> {
            if self.fail_fetch_at == Some(index) {
                anyhow::bail!("下载按钮不可点击");
            }
            self.fetches.push(index);
            Ok(())
        }

        async fn advance_to(&mut self, index: u32) -> anyhow::Result<bool> {
            self.advances.push(index);
            Ok(self.timeout_advance_at != Some(index))
        }
    }

    #[tokio::test]
    async fn clean_run_downloads_total_and_advances_total_minus_one() {
        let mut pager = MockPager::default();
        let stats = run_pagination(&mut pager, 5).await;

        assert_eq!(pager.fetches, vec![1, 2, 3, 4, 5]);
        assert_eq!(pager.advances, vec![2, 3, 4, 5]);
        assert_eq!(stats.fetched, 5);
        assert_eq!(stats.advance_attempts, 4);
        assert_eq!(stats.advance_failures, 0);
        assert!(!stats.aborted);
    }

    #[tokio::test]
    async fn single_document_never_advances() {
        let mut pager = MockPager::default();
        let stats = run_pagination(&mut pager, 1).await;
        assert_eq!(stats.fetched, 1);
        assert_eq!(pager.advances, Vec::<u32>::new());
    }

    #[tokio::test]
    async fn fetch_failure_aborts_remaining_documents() {
        let mut pager = MockPager {
            fail_fetch_at: Some(3),
            ..Default::default()
        };
        let stats = run_pagination(&mut pager, 5).await;

        assert_eq!(stats.fetched, 2);
        assert!(stats.aborted);
        assert_eq!(pager.advances, vec![2, 3]);
    }

    #[tokio::test]
    async fn advance_timeout_is_logged_and_loop_continues() {
        let mut pager = MockPager {
            timeout_advance_at: Some(3),
            ..Default::default()
        };
        let stats = run_pagination(&mut pager, 4).await;

        assert_eq!(stats.fetched, 4);
        assert_eq!(stats.advance_failures, 1);
        assert!(!stats.aborted);
    }
}
