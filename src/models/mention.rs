//! 关键词提及记录

/// 一次关键词命中
///
/// 同一行命中多个关键词时各生成一条记录；
/// 记录之间只有结构相等意义上的同一性，重复扫描会产生重复记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    /// 来源文件名
    pub file: String,
    /// 命中的关键词
    pub keyword: String,
    /// 归属发言人（向前回溯解析，找不到为 "Unknown"）
    pub speaker: String,
    /// 上下文引文（命中行前后各两行，裁剪至文档边界）
    pub quote: String,
}
