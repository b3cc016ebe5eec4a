//! 匹配记录持久化 - 业务能力层
//!
//! 追加式 CSV：表头只在文件首次创建时写一次，
//! 之后只追加行，从不改写历史记录。

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::Mention;

/// CSV 列顺序
const COLUMNS: [&str; 5] = ["date", "file", "speaker", "keyword", "quote"];

/// 匹配记录日志
pub struct MatchLog {
    path: PathBuf,
}

impl MatchLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 追加一批匹配记录
    ///
    /// 空列表不触碰文件。
    pub fn append(&self, date: &str, mentions: &[Mention]) -> Result<()> {
        if mentions.is_empty() {
            return Ok(());
        }

        let file_existed = self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("打开匹配记录文件失败: {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if !file_existed {
            writer.write_record(COLUMNS)?;
        }
        for mention in mentions {
            writer.write_record([
                date,
                mention.file.as_str(),
                mention.speaker.as_str(),
                mention.keyword.as_str(),
                mention.quote.as_str(),
            ])?;
        }
        writer.flush()?;

        info!("✓ 已追加 {} 条匹配记录到 {}", mentions.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn mention(keyword: &str) -> Mention {
        Mention {
            file: "hansard.txt".to_string(),
            keyword: keyword.to_string(),
            speaker: "MS JONES".to_string(),
            quote: "a quote, with \"punctuation\"".to_string(),
        }
    }

    #[test]
    fn empty_batch_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        MatchLog::new(&path).append("2024-03-05", &[]).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn header_is_written_exactly_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        let log = MatchLog::new(&path);

        log.append("2024-03-05", &[mention("housing")]).unwrap();
        log.append("2024-03-06", &[mention("salmon")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header_count = content
            .lines()
            .filter(|l| l.starts_with("date,file,speaker"))
            .count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn rows_round_trip_through_a_csv_reader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        MatchLog::new(&path)
            .append("2024-03-05", &[mention("housing")])
            .unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap(),
            &csv::StringRecord::from(COLUMNS.to_vec())
        );
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "2024-03-05");
        assert_eq!(&row[1], "hansard.txt");
        assert_eq!(&row[2], "MS JONES");
        assert_eq!(&row[3], "housing");
        assert_eq!(&row[4], "a quote, with \"punctuation\"");
    }
}
