use anyhow::Result;
use chrono::{Local, NaiveDate};

use hansard_daily_monitor::utils::logging;
use hansard_daily_monitor::{server, Config, DailyMonitor};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env（如果有）
    dotenvy::dotenv().ok();

    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();
    let port = config.server_port;
    let monitor = DailyMonitor::new(config);

    // 三种模式：serve / 指定日期 / 今天
    match std::env::args().nth(1).as_deref() {
        Some("serve") => server::serve(monitor, port).await?,
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| anyhow::anyhow!("日期参数格式应为 YYYY-MM-DD: {}", raw))?;
            monitor.run_for(date, None, None).await?;
        }
        None => {
            let today = Local::now().date_naive();
            monitor.run_for(today, None, None).await?;
        }
    }

    Ok(())
}
