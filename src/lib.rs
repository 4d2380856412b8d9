//! # Election Survey
//!
//! 入户问卷采集客户端：登录、选择区域和选区、逐题作答并提交到调查服务
//!
//! ## 架构设计
//!
//! ### ① 传输层（Clients）
//! - `clients/` - 远程 API 能力，只负责"发请求、拿 JSON"
//! - `ApiTransport` - 可替换的请求接口，`HttpApiClient` 为 reqwest 实现
//!
//! ### ② 业务能力层（Services）
//! - `CatalogLoader` - 拉取题目目录，坏记录跳过
//! - `AccountService` - 登录、区域、选区
//! - `SessionStore` - 本地会话持久化
//!
//! ### ③ 流程层（Workflow）
//! - `SurveyFlow` - 逐题作答、维护答案集合、生成并提交载荷
//! - `QuestionClassifier` - 题干关键词分类（校验规则与输入提示）
//!
//! ### ④ 表现层
//! - `presenter` / `app` - 终端交互

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod presenter;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{ApiTransport, HttpApiClient};
pub use config::Config;
pub use error::{AppError, AppResult, LoadError, SubmitError, ValidationError};
pub use models::{Question, RawInput, SubmissionPayload};
pub use services::{AccountService, CatalogLoader, SessionStore};
pub use workflow::{FlowState, SurveyFlow};
