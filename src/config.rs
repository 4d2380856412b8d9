use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 调查服务端地址（不带结尾的 `/`）
    pub api_base_url: String,
    /// 请求超时（秒），连接与读写共用
    pub request_timeout_secs: u64,
    /// 目标问卷 ID
    pub survey_id: i64,
    /// 会话文件路径
    pub session_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:4000".to_string(),
            request_timeout_secs: 30,
            survey_id: 1,
            session_file: "survey_session.json".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("SURVEY_API_BASE_URL").unwrap_or(default.api_base_url),
            request_timeout_secs: std::env::var("SURVEY_REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            survey_id: std::env::var("SURVEY_ID").ok().and_then(|v| v.parse().ok()).unwrap_or(default.survey_id),
            session_file: std::env::var("SURVEY_SESSION_FILE").unwrap_or(default.session_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 文件加载配置，缺失的键使用默认值
    pub async fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            AppError::Config(ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })?;

        config.validate()?;
        Ok(config)
    }

    /// 检查配置取值是否合法
    pub fn validate(&self) -> AppResult<()> {
        if self.survey_id <= 0 {
            return Err(AppError::Config(ConfigError::InvalidValue {
                key: "survey_id".to_string(),
                value: self.survey_id.to_string(),
            }));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(ConfigError::InvalidValue {
                key: "request_timeout_secs".to_string(),
                value: "0".to_string(),
            }));
        }
        Ok(())
    }
}
