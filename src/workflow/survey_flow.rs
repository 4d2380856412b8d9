//! 答题流程 - 流程层
//!
//! 核心职责：按目录顺序逐题作答，维护答案集合，最后生成并提交载荷
//!
//! 状态流转：
//! 1. Presenting(i) → advance → Presenting(i + 1)
//! 2. 最后一题 → submit → Submitting → Completed
//! 3. 提交失败 → 回到 Presenting(i)，可重试
//! 4. 任意答题状态 → abort → Aborted

use reqwest::Method;
use tracing::{debug, info, warn};

use crate::clients::api_client::{ApiTransport, SAVE_RESPONSES};
use crate::clients::{rejection_message, ApiEnvelope};
use crate::error::{FlowError, SubmitError, ValidationError};
use crate::models::{
    Answer, AnswerCollection, AnswerDto, AnswerValue, FlowContext, Question, RawInput,
    SubmissionPayload,
};
use crate::utils::logging::truncate_text;
use crate::workflow::answer_validator;
use crate::workflow::classifier::{InputHint, KeywordClassifier, QuestionClassifier};

const SUBMIT_FALLBACK: &str = "提交问卷失败";

/// 流程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// 正在展示第 i 题（从 0 开始）
    Presenting(usize),
    /// 载荷已发出，等待服务端确认
    Submitting,
    /// 提交成功（终止）
    Completed,
    /// 用户中途退出（终止）
    Aborted,
}

impl FlowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, FlowState::Completed | FlowState::Aborted)
    }
}

/// 答题流程
///
/// - 目录只读，顺序即作答顺序
/// - 每道题在答案集合中至多一条，离开题目时整体替换
/// - 只能前进，不支持回看上一题
pub struct SurveyFlow {
    catalog: Vec<Question>,
    answers: AnswerCollection,
    state: FlowState,
    context: FlowContext,
    classifier: Box<dyn QuestionClassifier>,
}

impl SurveyFlow {
    /// 使用默认的关键词分类器创建流程
    pub fn new(catalog: Vec<Question>, context: FlowContext) -> Result<Self, FlowError> {
        Self::with_classifier(catalog, context, Box::new(KeywordClassifier))
    }

    /// 目录为空时没有合法的初始状态
    pub fn with_classifier(
        catalog: Vec<Question>,
        context: FlowContext,
        classifier: Box<dyn QuestionClassifier>,
    ) -> Result<Self, FlowError> {
        if catalog.is_empty() {
            warn!("⚠️ 问卷 {} 没有可作答的题目", context.survey_id);
            return Err(FlowError::NoQuestions);
        }

        info!(
            "📝 开始答题: 问卷 {} | 共 {} 题 | 区域 {} | 选区 {}",
            context.survey_id,
            catalog.len(),
            context.area_id,
            context.ward_id
        );

        Ok(Self {
            catalog,
            answers: AnswerCollection::new(),
            state: FlowState::Presenting(0),
            context,
            classifier,
        })
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn catalog(&self) -> &[Question] {
        &self.catalog
    }

    pub fn answers(&self) -> &AnswerCollection {
        &self.answers
    }

    pub fn context(&self) -> &FlowContext {
        &self.context
    }

    /// 当前题目，非答题状态时为 `None`
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            FlowState::Presenting(cursor) => self.catalog.get(cursor),
            _ => None,
        }
    }

    /// 当前题目已保存的答案
    pub fn current_answer(&self) -> Option<&Answer> {
        self.current_question()
            .and_then(|question| self.answers.get(question.id))
    }

    /// "第 N 题 / 共 M 题"，N 从 1 开始
    pub fn progress(&self) -> Option<(usize, usize)> {
        match self.state {
            FlowState::Presenting(cursor) => Some((cursor + 1, self.catalog.len())),
            _ => None,
        }
    }

    /// 是否为最后一题，表现层据此显示"提交"而不是"下一题"
    pub fn is_last(&self) -> bool {
        matches!(self.state, FlowState::Presenting(cursor) if cursor + 1 == self.catalog.len())
    }

    /// 当前题目的输入提示
    pub fn input_hint(&self) -> Option<InputHint> {
        self.current_question()
            .map(|question| self.classifier.input_hint(question))
    }

    /// 保存当前题目的答案并前进到下一题
    ///
    /// 最后一题只保存不前进，调用方应改用 `submit`
    pub fn advance(&mut self, raw: &RawInput) -> Result<(), ValidationError> {
        let cursor = self.capture_current(raw)?;

        if cursor + 1 < self.catalog.len() {
            self.state = FlowState::Presenting(cursor + 1);
            if let Some(next) = self.catalog.get(cursor + 1) {
                self.log_question(cursor + 1, next);
            }
        }

        Ok(())
    }

    /// 保存当前题目的答案，返回当前题目的下标
    fn capture_current(&mut self, raw: &RawInput) -> Result<usize, ValidationError> {
        let FlowState::Presenting(cursor) = self.state else {
            return Err(ValidationError::NotPresenting);
        };
        let question = self
            .catalog
            .get(cursor)
            .ok_or(ValidationError::NotPresenting)?;

        let answer = answer_validator::capture(question, raw, self.classifier.as_ref())?;
        if self.answers.upsert(answer).is_some() {
            debug!("题目 {} 的答案已更新", question.id);
        }

        Ok(cursor)
    }

    /// 生成提交载荷，顺序与目录一致
    ///
    /// 答案数少于题目数时返回 `Incomplete`
    pub fn build_payload(&self) -> Result<SubmissionPayload, ValidationError> {
        let missing = self.catalog.len().saturating_sub(self.answers.len());
        if missing > 0 {
            return Err(ValidationError::Incomplete(missing));
        }

        let answers = self
            .catalog
            .iter()
            .filter_map(|question| self.answers.get(question.id))
            .filter_map(|answer| {
                let dto = AnswerDto::from_answer(answer);
                if dto.is_none() {
                    warn!("⚠️ 题目 {} 的答案没有有效内容，已丢弃", answer.question_id());
                }
                dto
            })
            .collect();

        Ok(SubmissionPayload::new(&self.context, answers))
    }

    /// 保存最后一题的答案并提交
    ///
    /// 先用 `raw` 采集当前题目，再检查完整性，最后发送。
    /// 服务端拒绝或网络失败时回到当前题目，可以重试
    pub async fn submit(
        &mut self,
        raw: &RawInput,
        api: &dyn ApiTransport,
    ) -> Result<SubmissionPayload, SubmitError> {
        let cursor = self.capture_current(raw)?;
        let payload = self.build_payload()?;
        let body = serde_json::to_value(&payload).map_err(|e| SubmitError::Encode(e.to_string()))?;

        self.state = FlowState::Submitting;
        self.log_payload(&payload);

        let result = match api.fetch_json(Method::POST, SAVE_RESPONSES, Some(&body)).await {
            Ok(response) => match ApiEnvelope::parse(response) {
                Ok(envelope) if envelope.success => Ok(()),
                Ok(envelope) => Err(SubmitError::Rejected(envelope.message_or(SUBMIT_FALLBACK))),
                Err(e) => Err(SubmitError::Malformed(e)),
            },
            Err(err) => match rejection_message(&err, SUBMIT_FALLBACK) {
                Some(message) => Err(SubmitError::Rejected(message)),
                None => Err(SubmitError::Unreachable(err.to_string())),
            },
        };

        match result {
            Ok(()) => {
                self.state = FlowState::Completed;
                info!("✓ 问卷提交成功: {} 条答案", payload.answers.len());
                Ok(payload)
            }
            Err(e) => {
                self.state = FlowState::Presenting(cursor);
                warn!("⚠️ 问卷提交失败，可重试: {}", e);
                Err(e)
            }
        }
    }

    /// 用户中途退出，丢弃已作答内容
    pub fn abort(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        info!("用户退出答题，丢弃 {} 条答案", self.answers.len());
        self.answers.clear();
        self.state = FlowState::Aborted;
    }

    // ========== 日志辅助方法 ==========

    fn log_question(&self, cursor: usize, question: &Question) {
        debug!(
            "第 {}/{} 题 ({}): {}",
            cursor + 1,
            self.catalog.len(),
            question.kind,
            truncate_text(&question.text, 80)
        );
    }

    fn log_payload(&self, payload: &SubmissionPayload) {
        info!(
            "📤 正在提交问卷: 用户 {} | 区域 {} | 选区 {} | {} 条答案",
            payload.user_id,
            payload.area_id,
            payload.ward_id,
            payload.answers.len()
        );
        for (i, dto) in payload.answers.iter().enumerate() {
            match &dto.value {
                AnswerValue::AnswerText(text) => {
                    debug!("  {}. 题目 {} 文本: {}", i + 1, dto.question_id, truncate_text(text, 40))
                }
                AnswerValue::SelectedOptionId(id) => {
                    debug!("  {}. 题目 {} 单选: {}", i + 1, dto.question_id, id)
                }
                AnswerValue::SelectedOptionIds(ids) => {
                    debug!("  {}. 题目 {} 多选: {:?}", i + 1, dto.question_id, ids)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::FakeTransport;
    use crate::error::TransportError;
    use crate::models::{QuestionKind, QuestionOption};
    use crate::workflow::classifier::TextRule;
    use serde_json::json;

    fn option(id: i64, text: &str) -> QuestionOption {
        QuestionOption {
            id,
            text: text.to_string(),
        }
    }

    fn sample_catalog() -> Vec<Question> {
        vec![
            Question {
                id: 1,
                text: "Full Name".to_string(),
                kind: QuestionKind::Text,
                options: Vec::new(),
            },
            Question {
                id: 2,
                text: "Gender".to_string(),
                kind: QuestionKind::SingleChoice,
                options: vec![option(10, "M"), option(11, "F")],
            },
            Question {
                id: 3,
                text: "Issues".to_string(),
                kind: QuestionKind::MultipleChoice,
                options: vec![option(20, "Roads"), option(21, "Water")],
            },
        ]
    }

    fn context() -> FlowContext {
        FlowContext {
            user_id: 7,
            survey_id: 1,
            area_id: 2,
            ward_id: 11,
        }
    }

    fn flow() -> SurveyFlow {
        SurveyFlow::new(sample_catalog(), context()).unwrap()
    }

    #[test]
    fn test_empty_catalog_has_no_initial_state() {
        assert_eq!(
            SurveyFlow::new(Vec::new(), context()).err(),
            Some(FlowError::NoQuestions)
        );
    }

    #[test]
    fn test_advance_moves_cursor() {
        let mut flow = flow();
        assert_eq!(flow.state(), FlowState::Presenting(0));
        assert_eq!(flow.progress(), Some((1, 3)));
        assert!(!flow.is_last());

        flow.advance(&RawInput::text("Asha Rao")).unwrap();
        flow.advance(&RawInput::choice(10)).unwrap();

        assert_eq!(flow.state(), FlowState::Presenting(2));
        assert!(flow.is_last());
        assert_eq!(flow.answers().len(), 2);
    }

    #[test]
    fn test_empty_text_keeps_cursor() {
        let mut flow = flow();
        assert_eq!(
            flow.advance(&RawInput::text("  ")),
            Err(ValidationError::EmptyRequired)
        );
        assert_eq!(flow.state(), FlowState::Presenting(0));
        assert!(flow.answers().is_empty());
    }

    #[test]
    fn test_advance_on_last_question_stays() {
        let mut flow = flow();
        flow.advance(&RawInput::text("Asha Rao")).unwrap();
        flow.advance(&RawInput::choice(11)).unwrap();
        flow.advance(&RawInput::choices([20])).unwrap();
        flow.advance(&RawInput::choices([21])).unwrap();

        assert_eq!(flow.state(), FlowState::Presenting(2));
        assert_eq!(flow.answers().len(), 3);
        assert_eq!(
            flow.current_answer(),
            Some(&Answer::MultipleChoice {
                question_id: 3,
                selected_option_ids: vec![21]
            })
        );
    }

    #[test]
    fn test_build_payload_in_catalog_order() {
        let mut flow = flow();
        flow.advance(&RawInput::text("Asha Rao")).unwrap();
        flow.advance(&RawInput::choice(10)).unwrap();
        flow.advance(&RawInput::choices([21, 20])).unwrap();

        let payload = flow.build_payload().unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "user_id": 7,
                "survey_id": 1,
                "area_id": 2,
                "ward_id": 11,
                "answers": [
                    { "question_id": 1, "answer_text": "Asha Rao" },
                    { "question_id": 2, "selected_option_id": 10 },
                    { "question_id": 3, "selected_option_ids": [20, 21] }
                ]
            })
        );
    }

    #[test]
    fn test_build_payload_incomplete() {
        let mut flow = flow();
        flow.advance(&RawInput::text("Asha Rao")).unwrap();

        assert_eq!(flow.build_payload(), Err(ValidationError::Incomplete(2)));
    }

    #[tokio::test]
    async fn test_submit_success_completes() {
        let transport = FakeTransport::new().reply(Ok(json!({ "success": true })));
        let mut flow = flow();
        flow.advance(&RawInput::text("Asha Rao")).unwrap();
        flow.advance(&RawInput::choice(10)).unwrap();

        let payload = flow
            .submit(&RawInput::choices([20, 21]), &transport)
            .await
            .unwrap();

        assert_eq!(flow.state(), FlowState::Completed);
        assert_eq!(payload.answers.len(), 3);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].path, SAVE_RESPONSES);
        assert_eq!(
            requests[0].body.as_ref().unwrap()["answers"][2],
            json!({ "question_id": 3, "selected_option_ids": [20, 21] })
        );
    }

    #[tokio::test]
    async fn test_submit_from_middle_is_incomplete() {
        let transport = FakeTransport::new();
        let mut flow = flow();
        flow.advance(&RawInput::text("Asha Rao")).unwrap();

        let err = flow.submit(&RawInput::choice(10), &transport).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Validation(ValidationError::Incomplete(1))
        ));
        assert!(transport.requests().is_empty());
        assert_eq!(flow.state(), FlowState::Presenting(1));
    }

    #[tokio::test]
    async fn test_submit_rejected_allows_retry() {
        let transport = FakeTransport::new()
            .reply(Ok(json!({ "success": false, "message": "Duplicate response" })))
            .reply(Err(TransportError::Unreachable("timed out".to_string())))
            .reply(Ok(json!({ "success": true })));
        let mut flow = flow();
        flow.advance(&RawInput::text("Asha Rao")).unwrap();
        flow.advance(&RawInput::choice(10)).unwrap();
        let last = RawInput::choices([20]);

        let err = flow.submit(&last, &transport).await.unwrap_err();
        assert!(matches!(err, SubmitError::Rejected(ref m) if m == "Duplicate response"));
        assert_eq!(flow.state(), FlowState::Presenting(2));

        let err = flow.submit(&last, &transport).await.unwrap_err();
        assert!(matches!(err, SubmitError::Unreachable(_)));
        assert_eq!(flow.state(), FlowState::Presenting(2));

        flow.submit(&last, &transport).await.unwrap();
        assert_eq!(flow.state(), FlowState::Completed);
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_submit_rejection_without_message_uses_fallback() {
        let transport = FakeTransport::new().reply(Ok(json!({ "success": false })));
        let mut flow = flow();
        flow.advance(&RawInput::text("Asha Rao")).unwrap();
        flow.advance(&RawInput::choice(10)).unwrap();

        let err = flow.submit(&RawInput::choices([20]), &transport).await.unwrap_err();
        assert!(matches!(err, SubmitError::Rejected(ref m) if m == SUBMIT_FALLBACK));
    }

    #[tokio::test]
    async fn test_submit_reply_without_envelope_is_malformed() {
        let transport = FakeTransport::new()
            .reply(Ok(json!({ "status": "ok" })))
            .reply(Ok(json!({ "success": true })));
        let mut flow = flow();
        flow.advance(&RawInput::text("Asha Rao")).unwrap();
        flow.advance(&RawInput::choice(10)).unwrap();
        let last = RawInput::choices([21]);

        let err = flow.submit(&last, &transport).await.unwrap_err();
        assert!(matches!(err, SubmitError::Malformed(_)));
        assert!(err.to_string().starts_with("服务器响应格式错误"));
        assert_eq!(flow.state(), FlowState::Presenting(2));

        flow.submit(&last, &transport).await.unwrap();
        assert_eq!(flow.state(), FlowState::Completed);
    }

    #[tokio::test]
    async fn test_terminal_states_reject_operations() {
        let transport = FakeTransport::new();
        let mut flow = flow();
        flow.advance(&RawInput::text("Asha Rao")).unwrap();
        flow.abort();

        assert_eq!(flow.state(), FlowState::Aborted);
        assert!(flow.answers().is_empty());
        assert_eq!(flow.current_question(), None);
        assert_eq!(
            flow.advance(&RawInput::text("again")),
            Err(ValidationError::NotPresenting)
        );
        let err = flow.submit(&RawInput::text("again"), &transport).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Validation(ValidationError::NotPresenting)
        ));
    }

    struct StrictClassifier;

    impl QuestionClassifier for StrictClassifier {
        fn validation_rule(&self, _question: &Question) -> TextRule {
            TextRule::PhoneNumber
        }

        fn input_hint(&self, _question: &Question) -> InputHint {
            InputHint::Phone
        }
    }

    #[test]
    fn test_classifier_is_pluggable() {
        let mut flow =
            SurveyFlow::with_classifier(sample_catalog(), context(), Box::new(StrictClassifier))
                .unwrap();

        assert_eq!(flow.input_hint(), Some(InputHint::Phone));
        assert_eq!(
            flow.advance(&RawInput::text("Asha Rao")),
            Err(ValidationError::FormatMismatch("phone".to_string()))
        );
        assert!(flow.advance(&RawInput::text("9876543210")).is_ok());
    }
}
