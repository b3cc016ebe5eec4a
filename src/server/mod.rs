//! HTTP 触发接口
//!
//! 监测核心的外围协作者：接受日期和关键词，同步跑一次监测，
//! 返回运行结果作为确认。格式错误的输入是客户端错误；
//! 其余失败都属于监测本身。

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::orchestrator::DailyMonitor;

/// 服务共享状态
pub struct AppState {
    pub monitor: DailyMonitor,
}

/// 启动触发服务（阻塞直到进程退出）
pub async fn serve(monitor: DailyMonitor, port: u16) -> Result<()> {
    let state = Arc::new(AppState { monitor });

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/run", post(handlers::run))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("🚀 触发服务已启动: http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
