//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! daily_monitor (单日监测调度)
//!     ↓
//! run_processor (会话获取 → 浏览器驱动 → 扫描 → 通知)
//!     ↓
//! workflow (归位 / 翻页循环 / 单文档流程)
//!     ↓
//! services (能力层：导航 / 下载探测 / 扫描 / CSV / 邮件)
//!     ↓
//! infrastructure (基础设施：PageDriver / wait_until)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层创建 BrowserSession，并保证释放
//! 2. **失败边界**：驱动阶段的致命错误止步于 run_processor，
//!    已下载的文件照常进入扫描阶段
//! 3. **无业务逻辑**：只做调度和统计

pub mod daily_monitor;
pub mod run_processor;

pub use daily_monitor::DailyMonitor;
pub use run_processor::{process_date, RunReport};
