//! 业务能力层
//!
//! 每个模块描述一种单一能力，不编排流程、不持有浏览器。

pub mod banner_sweeper;
pub mod download_watcher;
pub mod keyword_store;
pub mod mailer;
pub mod match_log;
pub mod mention_scanner;
pub mod viewer_navigator;

pub use banner_sweeper::BannerSweeper;
pub use download_watcher::DownloadWatcher;
pub use keyword_store::load_keywords;
pub use mailer::Mailer;
pub use match_log::MatchLog;
pub use mention_scanner::MentionScanner;
pub use viewer_navigator::ViewerNavigator;
