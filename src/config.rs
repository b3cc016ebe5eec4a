use std::time::Duration;

/// 程序配置
///
/// 所有字段都可以通过环境变量覆盖，默认值与议会搜索门户的
/// 实际表现相匹配（等待时长经过线上验证，不要随意调小）。
#[derive(Clone, Debug)]
pub struct Config {
    /// 下载文件根目录（每个日期一个子目录）
    pub download_root: String,
    /// 关键词文件路径（每行一个关键词，空行忽略）
    pub keywords_file: String,
    /// 匹配记录 CSV 文件（只追加）
    pub match_log_file: String,
    /// 搜索门户基础 URL
    pub search_base_url: String,
    /// 按日期过滤的 isysquery 查询 ID
    pub isys_query_id: String,
    /// UI 就绪等待上限（秒）
    pub wait_secs: u64,
    /// 触发下载后的固定延迟（毫秒）
    pub click_delay_ms: u64,
    /// 翻页后的固定延迟（毫秒）
    pub nav_delay_ms: u64,
    /// 每次横幅关闭尝试的独立超时（秒）
    pub banner_timeout_secs: u64,
    /// 下载静默等待上限（秒）
    pub download_timeout_secs: u64,
    /// 下载目录轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 是否无头运行浏览器
    pub headless: bool,
    /// 是否按文档标题重命名下载文件（目标文件已存在则跳过下载）
    pub rename_downloads: bool,
    /// HTTP 触发服务端口
    pub server_port: u16,
    // --- SMTP 配置 ---
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    /// 收件人（逗号分隔；与凭据任一为空则跳过邮件）
    pub recipients: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_root: "transcripts".to_string(),
            keywords_file: "keywords.txt".to_string(),
            match_log_file: "metadata.csv".to_string(),
            search_base_url: "https://search.parliament.tas.gov.au/search".to_string(),
            isys_query_id: "8e715d42-5fe7-4c4b-a8b5-8c1dbdd29c36".to_string(),
            wait_secs: 25,
            click_delay_ms: 600,
            nav_delay_ms: 400,
            banner_timeout_secs: 3,
            download_timeout_secs: 180,
            poll_interval_ms: 500,
            headless: true,
            rename_downloads: false,
            server_port: 5000,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            smtp_user: String::new(),
            smtp_pass: String::new(),
            recipients: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            download_root: std::env::var("DOWNLOAD_ROOT").unwrap_or(default.download_root),
            keywords_file: std::env::var("KEYWORDS_FILE").unwrap_or(default.keywords_file),
            match_log_file: std::env::var("MATCH_LOG_FILE").unwrap_or(default.match_log_file),
            search_base_url: std::env::var("SEARCH_BASE_URL").unwrap_or(default.search_base_url),
            isys_query_id: std::env::var("ISYS_QUERY_ID").unwrap_or(default.isys_query_id),
            wait_secs: std::env::var("WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.wait_secs),
            click_delay_ms: std::env::var("CLICK_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.click_delay_ms),
            nav_delay_ms: std::env::var("NAV_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.nav_delay_ms),
            banner_timeout_secs: std::env::var("BANNER_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.banner_timeout_secs),
            download_timeout_secs: std::env::var("DOWNLOAD_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.download_timeout_secs),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_ms),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            rename_downloads: std::env::var("RENAME_DOWNLOADS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.rename_downloads),
            server_port: std::env::var("SERVER_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.server_port),
            smtp_host: std::env::var("SMTP_HOST").unwrap_or(default.smtp_host),
            smtp_port: std::env::var("SMTP_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.smtp_port),
            smtp_user: std::env::var("SMTP_USER").unwrap_or(default.smtp_user),
            smtp_pass: std::env::var("SMTP_PASS").unwrap_or(default.smtp_pass),
            recipients: std::env::var("RECIPIENTS").unwrap_or(default.recipients),
        }
    }

    /// UI 就绪等待上限
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    /// 触发下载后的固定延迟
    pub fn click_delay(&self) -> Duration {
        Duration::from_millis(self.click_delay_ms)
    }

    /// 翻页后的固定延迟
    pub fn nav_delay(&self) -> Duration {
        Duration::from_millis(self.nav_delay_ms)
    }

    /// 横幅关闭尝试的独立超时
    pub fn banner_timeout(&self) -> Duration {
        Duration::from_secs(self.banner_timeout_secs)
    }

    /// 下载静默等待上限
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// 下载目录轮询间隔
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_match_portal_timings() {
        let config = Config::default();
        assert_eq!(config.wait_secs, 25);
        assert_eq!(config.click_delay_ms, 600);
        assert_eq!(config.nav_delay_ms, 400);
        assert_eq!(config.download_timeout_secs, 180);
        assert_eq!(config.poll_interval_ms, 500);
        assert!(config.headless);
        assert!(!config.rename_downloads);
    }

    #[test]
    fn duration_helpers_convert_units() {
        let config = Config::default();
        assert_eq!(config.wait_timeout(), Duration::from_secs(25));
        assert_eq!(config.click_delay(), Duration::from_millis(600));
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
    }
}
