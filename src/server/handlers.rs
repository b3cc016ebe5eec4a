//! 触发接口的请求处理

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::server::AppState;

/// `POST /run` 请求体
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    /// 目标日期，`YYYY-MM-DD`
    pub date: String,
    /// 可选的关键词覆盖（缺省时读关键词文件）
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    /// 可选的收件人覆盖（逗号分隔）
    #[serde(default)]
    pub recipients: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

/// `POST /run`：同步执行一次监测
pub async fn run(State(state): State<Arc<AppState>>, Json(req): Json<RunRequest>) -> Response {
    let Some(date) = parse_run_date(&req.date) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                message: "invalid date format, expected YYYY-MM-DD".to_string(),
            }),
        )
            .into_response();
    };

    match state.monitor.run_for(date, req.keywords, req.recipients).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            error!("❌ 监测运行失败: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    message: format!("{:#}", e),
                }),
            )
                .into_response()
        }
    }
}

/// 校验并解析日期参数
fn parse_run_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
