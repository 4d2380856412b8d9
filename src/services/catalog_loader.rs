//! 题目目录加载服务
//!
//! 只负责"拉取并解析题目目录"，单条题目解析失败时跳过，不中断整体加载

use std::collections::HashSet;
use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info, warn};

use crate::clients::api_client::{survey_questions_endpoint, ApiTransport};
use crate::clients::{decode_each, rejection_message, ApiEnvelope, DecodedList, ItemError};
use crate::error::LoadError;
use crate::models::Question;

const LOAD_FALLBACK: &str = "加载问题失败";

/// 一次加载的结果：可用题目与被跳过的记录
#[derive(Debug, Clone, Default)]
pub struct CatalogReport {
    pub questions: Vec<Question>,
    pub skipped: Vec<ItemError>,
}

/// 题目目录加载服务
pub struct CatalogLoader {
    api: Arc<dyn ApiTransport>,
}

impl CatalogLoader {
    pub fn new(api: Arc<dyn ApiTransport>) -> Self {
        Self { api }
    }

    /// 加载题目目录，目录顺序即展示顺序
    ///
    /// 空目录也是成功结果，由调用方决定如何处理
    pub async fn load(&self, survey_id: i64) -> Result<Vec<Question>, LoadError> {
        Ok(self.load_report(survey_id).await?.questions)
    }

    /// 加载题目目录并返回被跳过的记录
    pub async fn load_report(&self, survey_id: i64) -> Result<CatalogReport, LoadError> {
        let endpoint = survey_questions_endpoint(survey_id);
        info!("📋 正在加载问卷 {} 的题目...", survey_id);

        let response = match self.api.fetch_json(Method::GET, &endpoint, None).await {
            Ok(value) => value,
            Err(err) => {
                if let Some(message) = rejection_message(&err, LOAD_FALLBACK) {
                    warn!("⚠️ 服务端拒绝加载题目: {}", message);
                    return Err(LoadError::Rejected(message));
                }
                warn!("⚠️ 加载题目失败: {}", err);
                return Err(LoadError::Unreachable(err.to_string()));
            }
        };

        let envelope = ApiEnvelope::parse(response).map_err(LoadError::Malformed)?;
        if !envelope.success {
            return Err(LoadError::Rejected(envelope.message_or(LOAD_FALLBACK)));
        }

        let data = envelope
            .data_array()
            .ok_or_else(|| LoadError::Malformed("data 不是数组".to_string()))?;

        let report = build_catalog(decode_each(data));
        info!(
            "✓ 题目加载完成: {} 道可用, {} 条跳过",
            report.questions.len(),
            report.skipped.len()
        );

        Ok(report)
    }
}

/// 校验题目结构并剔除重复的题目 ID（保留首次出现）
fn build_catalog(decoded: DecodedList<Question>) -> CatalogReport {
    let mut report = CatalogReport {
        questions: Vec::with_capacity(decoded.items.len()),
        skipped: decoded.errors,
    };
    let mut seen = HashSet::new();

    for (index, question) in decoded.items {
        let question = match question.normalized() {
            Ok(question) => question,
            Err(reason) => {
                warn!("⚠️ 跳过题目: {}", reason);
                report.skipped.push(ItemError { index, reason });
                continue;
            }
        };

        if !seen.insert(question.id) {
            let reason = format!("题目 ID {} 重复", question.id);
            warn!("⚠️ 跳过题目: {}", reason);
            report.skipped.push(ItemError { index, reason });
            continue;
        }

        debug!("题目 {} ({}): {}", question.id, question.kind, question.text);
        report.questions.push(question);
    }

    report
}
