//! 浏览器层
//!
//! 唯一创建 / 销毁 Browser 的地方。

pub mod session;

pub use session::BrowserSession;
