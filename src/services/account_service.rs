//! 账号与区域服务
//!
//! 登录、区域列表、选区列表。列表按条解析，坏记录跳过

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::clients::api_client::{wards_endpoint, ApiTransport, AREAS, LOGIN};
use crate::clients::{decode_each, rejection_message, ApiEnvelope};
use crate::error::{AccountError, AppError, AppResult, LoadError, ValidationError};
use crate::models::{Area, UserProfile, Ward};

/// 账号与区域服务
pub struct AccountService {
    api: Arc<dyn ApiTransport>,
}

impl AccountService {
    pub fn new(api: Arc<dyn ApiTransport>) -> Self {
        Self { api }
    }

    /// 使用手机号和密码登录
    pub async fn login(&self, phone: &str, password: &str) -> AppResult<UserProfile> {
        let phone = phone.trim();
        if phone.is_empty() || password.is_empty() {
            return Err(ValidationError::EmptyRequired.into());
        }

        let body = json!({ "phone": phone, "password": password });
        let data = self
            .request(Method::POST, LOGIN, Some(&body), "登录失败")
            .await
            .map_err(|e| match e {
                AppError::Load(LoadError::Rejected(m)) => AccountError::Rejected(m).into(),
                AppError::Load(LoadError::Unreachable(m)) => AccountError::Unreachable(m).into(),
                AppError::Load(LoadError::Malformed(m)) => AccountError::Malformed(m).into(),
                other => other,
            })?;

        let user: UserProfile =
            serde_json::from_value(data).map_err(|e| AccountError::Malformed(e.to_string()))?;

        info!("✓ 登录成功: {} (ID: {})", user.name, user.id);
        Ok(user)
    }

    /// 获取全部区域
    pub async fn areas(&self) -> AppResult<Vec<Area>> {
        self.list(AREAS, "加载区域失败").await
    }

    /// 获取某区域下的选区
    pub async fn wards(&self, area_id: i64) -> AppResult<Vec<Ward>> {
        self.list(&wards_endpoint(area_id), "加载选区失败").await
    }

    async fn list<T: DeserializeOwned>(&self, endpoint: &str, fallback: &str) -> AppResult<Vec<T>> {
        let data = self.request(Method::GET, endpoint, None, fallback).await?;
        let array = data
            .as_array()
            .ok_or_else(|| AppError::Load(LoadError::Malformed("data 不是数组".to_string())))?;

        let decoded = decode_each::<T>(array);
        if !decoded.errors.is_empty() {
            warn!("⚠️ {} 中有 {} 条记录无法解析", endpoint, decoded.errors.len());
        }
        Ok(decoded.into_values())
    }

    /// 发出请求并取出 `data`
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        fallback: &str,
    ) -> AppResult<Value> {
        let response = match self.api.fetch_json(method, endpoint, body).await {
            Ok(value) => value,
            Err(err) => {
                if let Some(message) = rejection_message(&err, fallback) {
                    return Err(LoadError::Rejected(message).into());
                }
                return Err(LoadError::Unreachable(err.to_string()).into());
            }
        };

        let envelope = ApiEnvelope::parse(response).map_err(LoadError::Malformed)?;
        if !envelope.success {
            return Err(LoadError::Rejected(envelope.message_or(fallback)).into());
        }

        Ok(envelope.data)
    }
}
