//! 错误类型定义
//!
//! 只有会终止"单日运行"的条件才建模为类型化错误；
//! 低层 UI 交互失败在调用点就地转换为布尔值 + 日志，
//! 其余错误通过 anyhow 携带上下文向上传播。

use thiserror::Error;

/// 终止单日运行的错误
#[derive(Debug, Error)]
pub enum MonitorError {
    /// 结果页上始终没有出现可打开查看器的文档链接
    #[error("结果页中未找到文档查看器入口")]
    ViewerNotFound,

    /// 工具栏标签无法解析出文档计数
    #[error("无法从工具栏读取文档计数: {text:?}")]
    ToolbarUnreadable { text: String },

    /// 归位重试预算耗尽（查看器未能回到第 1 个文档）
    #[error("归位重试预算耗尽（允许 {budget} 次读取）")]
    PositionBudgetExhausted { budget: u32 },

    /// 浏览器会话创建失败（对整次运行是致命的）
    #[error("浏览器会话创建失败: {0}")]
    SessionFailed(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
