//! 关键词扫描服务 - 业务能力层
//!
//! 对下载的转录文本做行级扫描：
//! - 关键词按大小写不敏感的子串匹配
//! - 引文取命中行前后各两行（裁剪到文档边界），逐行去除
//!   首尾空白后用单个空格连接
//! - 发言人从命中行开始向前回溯，找最近一个形如
//!   `CAPITALISED NAME - ` 的行；找不到记为 "Unknown"
//! - 同一行命中多个关键词时各生成一条记录

use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Mention;

static SPEAKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Za-z .'\-]+)\s-").expect("发言人行正则"));

/// 发言人无法解析时的占位值
const UNKNOWN_SPEAKER: &str = "Unknown";

/// 关键词扫描器
pub struct MentionScanner {
    /// (原始关键词, 小写形式)
    keywords: Vec<(String, String)>,
}

impl MentionScanner {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|kw| (kw.clone(), kw.to_lowercase()))
                .collect(),
        }
    }

    /// 扫描单个转录文件
    ///
    /// 转录文本偶见非法 UTF-8 字节，按有损解码处理。
    pub fn scan_file(&self, path: &Path) -> Result<Vec<Mention>> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("读取转录文件失败: {}", path.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(self.scan_text(&file_name, &text))
    }

    /// 扫描一段文本
    pub fn scan_text(&self, file_name: &str, text: &str) -> Vec<Mention> {
        let lines: Vec<&str> = text.lines().collect();
        let mut mentions = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            let line_lower = line.to_lowercase();
            for (keyword, keyword_lower) in &self.keywords {
                if line_lower.contains(keyword_lower.as_str()) {
                    mentions.push(Mention {
                        file: file_name.to_string(),
                        keyword: keyword.clone(),
                        speaker: find_speaker(&lines, idx),
                        quote: build_quote(&lines, idx),
                    });
                }
            }
        }
        mentions
    }
}

/// 从 `idx` 行开始向前回溯解析发言人
fn find_speaker(lines: &[&str], idx: usize) -> String {
    for line in lines[..=idx].iter().rev() {
        if let Some(caps) = SPEAKER_RE.captures(line) {
            return caps[1].to_string();
        }
    }
    UNKNOWN_SPEAKER.to_string()
}

/// 命中行前后各两行的引文，裁剪到文档边界
fn build_quote(lines: &[&str], idx: usize) -> String {
    let start = idx.saturating_sub(2);
    let end = (idx + 3).min(lines.len());
    lines[start..end]
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join(" ")
}
