use std::fmt;

use serde_json::Value;

use crate::models::QuestionKind;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 题目目录加载错误
    Load(LoadError),
    /// 问卷提交错误
    Submit(SubmitError),
    /// 答题流程错误
    Flow(FlowError),
    /// 登录错误
    Account(AccountError),
    /// 本地校验错误
    Validation(ValidationError),
    /// 会话错误
    Session(SessionError),
    /// 文件操作错误
    File(FileError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Load(e) => write!(f, "加载错误: {}", e),
            AppError::Submit(e) => write!(f, "提交错误: {}", e),
            AppError::Flow(e) => write!(f, "流程错误: {}", e),
            AppError::Account(e) => write!(f, "登录错误: {}", e),
            AppError::Validation(e) => write!(f, "校验错误: {}", e),
            AppError::Session(e) => write!(f, "会话错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Load(e) => Some(e),
            AppError::Submit(e) => Some(e),
            AppError::Flow(e) => Some(e),
            AppError::Account(e) => Some(e),
            AppError::Validation(e) => Some(e),
            AppError::Session(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 本地校验错误，只在客户端出现，不会发往服务端
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// 必填项为空
    #[error("请输入答案")]
    EmptyRequired,
    /// 格式不符（例如手机号）
    #[error("格式不正确: {0}")]
    FormatMismatch(String),
    /// 选择题未选择或选择了无效选项
    #[error("请选择有效的选项")]
    NoSelection,
    /// 仍有未作答的题目
    #[error("还有 {0} 道题未作答，请全部作答后再提交")]
    Incomplete(usize),
    /// 输入类型与题型不符
    #[error("输入类型与题型不符，期望: {expected}")]
    KindMismatch { expected: QuestionKind },
    /// 流程不在答题状态（提交中或已结束）
    #[error("当前没有正在作答的题目")]
    NotPresenting,
}

/// 远程请求的统一失败原因
///
/// 对应请求辅助函数的 `onError`：连接失败、非 2xx 状态、响应体无法解析
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// 连接失败或超时
    #[error("无法连接服务器: {0}")]
    Unreachable(String),
    /// 非 2xx 状态码，`body` 为能解析出的 JSON 响应体
    #[error("服务器错误: {code}")]
    Status { code: u16, body: Option<Value> },
    /// 响应体不是合法 JSON
    #[error("服务器响应无效: {0}")]
    InvalidBody(String),
}

impl TransportError {
    /// 服务端在错误状态码下仍给出的 `message` 字段
    pub fn server_message(&self) -> Option<&str> {
        match self {
            TransportError::Status {
                body: Some(body), ..
            } => body.get("message").and_then(|v| v.as_str()),
            _ => None,
        }
    }
}

/// 题目目录加载错误
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// 服务端返回 `success = false`
    #[error("{0}")]
    Rejected(String),
    /// 网络或传输失败
    #[error("无法连接服务器: {0}")]
    Unreachable(String),
    /// 响应外层结构不合法（缺少 `success` 或 `data`）
    #[error("服务器响应格式错误: {0}")]
    Malformed(String),
}

/// 问卷提交错误
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// 本地校验未通过，未发起请求
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// 服务端拒绝，可重试
    #[error("{0}")]
    Rejected(String),
    /// 网络失败或响应无法解析，可重试
    #[error("无法连接服务器: {0}")]
    Unreachable(String),
    /// 服务端应答不是 `{ success, ... }` 外层，可重试
    #[error("服务器响应格式错误: {0}")]
    Malformed(String),
    /// 载荷无法编码
    #[error("无法生成提交内容: {0}")]
    Encode(String),
}

/// 登录错误
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// 账号或密码错误等服务端拒绝
    #[error("{0}")]
    Rejected(String),
    /// 网络或传输失败
    #[error("无法连接服务器: {0}")]
    Unreachable(String),
    /// 用户信息无法解析
    #[error("服务器响应格式错误: {0}")]
    Malformed(String),
}

/// 答题流程错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// 目录为空，没有可以作答的题目
    #[error("没有可作答的题目")]
    NoQuestions,
}

/// 会话错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// 尚未登录
    #[error("尚未登录")]
    NotLoggedIn,
    /// 尚未选择区域
    #[error("尚未选择区域")]
    AreaNotSelected,
    /// 尚未选择选区
    #[error("尚未选择选区")]
    WardNotSelected,
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 删除文件失败
    DeleteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// JSON 内容损坏
    JsonParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            FileError::DeleteFailed { path, source } => {
                write!(f, "删除文件失败 ({}): {}", path, source)
            }
            FileError::JsonParseFailed { path, source } => {
                write!(f, "JSON解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. }
            | FileError::WriteFailed { source, .. }
            | FileError::DeleteFailed { source, .. }
            | FileError::JsonParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 配置项取值非法
    InvalidValue { key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TomlParseFailed { path, source } => {
                write!(f, "TOML解析失败 ({}): {}", path, source)
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "配置项 {} 的值 '{}' 不合法", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        AppError::Load(err)
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        AppError::Submit(err)
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        AppError::Account(err)
    }
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        AppError::Flow(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Session(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 是否可以由用户重试（网络失败、服务端拒绝）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Load(LoadError::Rejected(_) | LoadError::Unreachable(_))
                | AppError::Submit(
                    SubmitError::Rejected(_)
                        | SubmitError::Unreachable(_)
                        | SubmitError::Malformed(_)
                )
                | AppError::Account(AccountError::Unreachable(_))
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
