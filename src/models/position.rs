//! 文档位置
//!
//! 查看器工具栏的文本形如 `"Some Title [3 of 7]"`，
//! 方括号里的计数是判断当前位置的唯一依据。

use once_cell::sync::Lazy;
use regex::Regex;

static TOOLBAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[\s*(\d+)\s+of\s+(\d+)\s*\]").expect("工具栏计数正则"));

/// 查看器中的文档位置（1 基）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocPosition {
    /// 当前文档序号
    pub current: u32,
    /// 文档总数（同一会话同一日期内固定不变）
    pub total: u32,
}

impl DocPosition {
    /// 从工具栏文本解析位置，不匹配返回 None
    pub fn parse(text: &str) -> Option<Self> {
        let caps = TOOLBAR_RE.captures(text)?;
        let current = caps.get(1)?.as_str().parse().ok()?;
        let total = caps.get(2)?.as_str().parse().ok()?;
        Some(Self { current, total })
    }

    /// 工具栏中某个位置的字面文本（用于翻页后的精确等待）
    pub fn label(current: u32, total: u32) -> String {
        format!("[{} of {}]", current, total)
    }

    pub fn is_first(&self) -> bool {
        self.current == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_counts() {
        let pos = DocPosition::parse("[3 of 7]").unwrap();
        assert_eq!(pos.current, 3);
        assert_eq!(pos.total, 7);
    }

    #[test]
    fn parses_counts_embedded_in_title() {
        let pos = DocPosition::parse("House of Assembly Tuesday 17 March 2020 [1 of 4]").unwrap();
        assert_eq!((pos.current, pos.total), (1, 4));
        assert!(pos.is_first());
    }

    #[test]
    fn tolerates_whitespace_and_case() {
        let pos = DocPosition::parse("[ 12  OF  34 ]").unwrap();
        assert_eq!((pos.current, pos.total), (12, 34));
    }

    #[test]
    fn non_matching_text_yields_none() {
        assert_eq!(DocPosition::parse(""), None);
        assert_eq!(DocPosition::parse("3 of 7"), None);
        assert_eq!(DocPosition::parse("[three of seven]"), None);
        assert_eq!(DocPosition::parse("[3 de 7]"), None);
    }

    #[test]
    fn label_round_trips_through_parse() {
        let label = DocPosition::label(2, 9);
        assert_eq!(label, "[2 of 9]");
        assert_eq!(
            DocPosition::parse(&label),
            Some(DocPosition { current: 2, total: 9 })
        );
    }
}
