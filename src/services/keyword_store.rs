//! 关键词加载服务 - 业务能力层
//!
//! 关键词文件：每行一个关键词，空白行忽略。
//! 文件不存在按空列表处理，由上层决定是否继续。

use std::path::Path;

use tracing::warn;

/// 加载关键词列表
pub fn load_keywords(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        warn!("⚠️ 关键词文件不存在: {}", path.display());
        return Vec::new();
    };
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
