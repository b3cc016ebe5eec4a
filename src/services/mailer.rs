//! 邮件通知服务 - 业务能力层
//!
//! 每次运行最多发送一封汇总邮件。凭据或收件人缺失时
//! 跳过发送并记一条警告，运行仍算成功：邮件是通知渠道，
//! 不是运行结果的一部分。

use anyhow::{Context, Result};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::Config;
use crate::models::Mention;

/// 邮件通知服务
pub struct Mailer {
    host: String,
    port: u16,
    user: String,
    pass: String,
    /// 逗号分隔的收件人列表
    recipients: String,
}

impl Mailer {
    pub fn new(config: &Config) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            user: config.smtp_user.clone(),
            pass: config.smtp_pass.clone(),
            recipients: config.recipients.clone(),
        }
    }

    /// 凭据和收件人是否齐全
    pub fn is_configured(&self) -> bool {
        !self.user.is_empty() && !self.pass.is_empty() && !self.recipients.is_empty()
    }

    /// 发送一次运行的汇总邮件
    ///
    /// 未配置时为空操作（返回 Ok）。
    pub async fn send_summary(&self, date: &str, mentions: &[Mention]) -> Result<()> {
        if !self.is_configured() {
            warn!("⚠️ 邮件凭据未配置，跳过发送");
            return Ok(());
        }

        let mut builder = Message::builder()
            .from(self.user.parse::<Mailbox>().context("发件人地址无效")?)
            .subject(format!("Tasmania Hansard matches for {}", date));
        for recipient in self.recipients.split(',') {
            let recipient = recipient.trim();
            if recipient.is_empty() {
                continue;
            }
            builder = builder.to(recipient
                .parse::<Mailbox>()
                .with_context(|| format!("收件人地址无效: {}", recipient))?);
        }

        let email = builder
            .body(compose_body(date, mentions))
            .context("构建邮件失败")?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .context("创建 SMTP 传输失败")?
            .port(self.port)
            .credentials(Credentials::new(self.user.clone(), self.pass.clone()))
            .build();

        transport.send(email).await.context("发送邮件失败")?;
        info!("📧 汇总邮件已发送（{} 条匹配）", mentions.len());
        Ok(())
    }
}

/// 汇总邮件正文
///
/// 有匹配时逐条列出；文件非空但没有任何匹配时只写一行说明。
fn compose_body(date: &str, mentions: &[Mention]) -> String {
    if mentions.is_empty() {
        return format!("No keyword matches found in transcripts for {}.", date);
    }
    mentions
        .iter()
        .map(|m| {
            format!(
                "Keyword: {}\nSpeaker: {}\nQuote: {}\nFile: {}\n",
                m.keyword, m.speaker, m.quote, m.file
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention() -> Mention {
        Mention {
            file: "hansard.txt".to_string(),
            keyword: "housing".to_string(),
            speaker: "MS JONES".to_string(),
            quote: "We must address housing affordability.".to_string(),
        }
    }

    #[test]
    fn body_lists_every_match() {
        let body = compose_body("2024-03-05", &[mention(), mention()]);
        assert_eq!(body.matches("Keyword: housing").count(), 2);
        assert!(body.contains("Speaker: MS JONES"));
        assert!(body.contains("File: hansard.txt"));
    }

    #[test]
    fn body_without_matches_is_a_single_line() {
        let body = compose_body("2024-03-05", &[]);
        assert_eq!(
            body,
            "No keyword matches found in transcripts for 2024-03-05."
        );
    }

    #[tokio::test]
    async fn missing_credentials_skip_without_error() {
        let mailer = Mailer::new(&Config::default());
        assert!(!mailer.is_configured());
        // 不应尝试任何网络操作
        mailer.send_summary("2024-03-05", &[mention()]).await.unwrap();
    }
}
