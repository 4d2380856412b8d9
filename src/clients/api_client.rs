/// 调查服务 API 客户端
///
/// 封装所有与调查服务端的 HTTP 交互
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, TransportError};

pub const LOGIN: &str = "/api/login";
pub const AREAS: &str = "/api/areas";
pub const SAVE_RESPONSES: &str = "/api/responses";

/// 某区域下的选区列表
pub fn wards_endpoint(area_id: i64) -> String {
    format!("/api/wards/{}", area_id)
}

/// 某问卷的题目目录
pub fn survey_questions_endpoint(survey_id: i64) -> String {
    format!("/api/surveys/{}/questions", survey_id)
}

/// 远程 API 能力：发出一个请求，返回响应 JSON
///
/// 连接失败、非 2xx 状态、响应体无法解析统一走 `Err`
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn fetch_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, TransportError>;
}

/// 基于 reqwest 的实现
pub struct HttpApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApiClient {
    /// 创建新的客户端，连接与整体请求共用同一超时
    pub fn new(config: &Config) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Other(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            base_url: config.api_base_url.trim().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ApiTransport for HttpApiClient {
    async fn fetch_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("请求失败 ({}): {}", path, e);
            TransportError::Unreachable(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            warn!("服务器返回 {} ({})", status.as_u16(), path);
            return Err(TransportError::Status {
                code: status.as_u16(),
                body: serde_json::from_str(&text).ok(),
            });
        }

        serde_json::from_str(&text).map_err(|e| TransportError::InvalidBody(e.to_string()))
    }
}
