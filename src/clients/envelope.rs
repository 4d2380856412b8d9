//! 服务端统一响应外层 `{ success, data, message }` 的解析

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::TransportError;

/// 统一响应外层
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiEnvelope {
    /// 解析响应 JSON，缺少 `success` 字段视为格式错误
    pub fn parse(value: Value) -> Result<Self, String> {
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    /// 服务端消息，缺失或为空时使用兜底文案
    pub fn message_or(&self, fallback: &str) -> String {
        match self.message.as_deref().map(str::trim) {
            Some(msg) if !msg.is_empty() => msg.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// `data` 作为数组返回
    pub fn data_array(&self) -> Option<&[Value]> {
        self.data.as_array().map(Vec::as_slice)
    }
}

/// 错误状态码下的业务拒绝
///
/// 响应体仍是 `success = false` 的外层时返回其消息，其余情况视为网络失败
pub fn rejection_message(err: &TransportError, fallback: &str) -> Option<String> {
    match err {
        TransportError::Status {
            body: Some(body), ..
        } => ApiEnvelope::parse(body.clone())
            .ok()
            .filter(|envelope| !envelope.success)
            .map(|envelope| envelope.message_or(fallback)),
        _ => None,
    }
}

/// 单条记录解析失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemError {
    pub index: usize,
    pub reason: String,
}

/// 逐条解析的结果：成功与失败分开收集
///
/// 成功项保留其在原数组中的下标，后续校验跳过时沿用同一下标
#[derive(Debug, Clone)]
pub struct DecodedList<T> {
    pub items: Vec<(usize, T)>,
    pub errors: Vec<ItemError>,
}

impl<T> Default for DecodedList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> DecodedList<T> {
    pub fn push_error(&mut self, index: usize, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("⚠️ 跳过第 {} 条记录: {}", index, reason);
        self.errors.push(ItemError { index, reason });
    }

    /// 丢弃下标，只取成功项
    pub fn into_values(self) -> Vec<T> {
        self.items.into_iter().map(|(_, item)| item).collect()
    }
}

/// 逐条解析数组，单条失败只记录不中断
pub fn decode_each<T: DeserializeOwned>(values: &[Value]) -> DecodedList<T> {
    let mut decoded = DecodedList::default();

    for (index, value) in values.iter().enumerate() {
        match serde_json::from_value::<T>(value.clone()) {
            Ok(item) => decoded.items.push((index, item)),
            Err(e) => decoded.push_error(index, e.to_string()),
        }
    }

    decoded
}
