//! 会话存储服务
//!
//! 只负责把会话读写到本地 JSON 文件，进程重启后仍然有效

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult, FileError};
use crate::models::Session;

/// 会话存储服务
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取会话，文件不存在时返回 `None`
    pub async fn load(&self) -> AppResult<Option<Session>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("会话文件不存在: {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(AppError::file_read_failed(self.path.display().to_string(), e)),
        };

        let session = serde_json::from_str(&content).map_err(|e| {
            AppError::File(FileError::JsonParseFailed {
                path: self.path.display().to_string(),
                source: Box::new(e),
            })
        })?;

        Ok(Some(session))
    }

    pub async fn save(&self, session: &Session) -> AppResult<()> {
        let content = serde_json::to_string_pretty(session)
            .map_err(|e| AppError::file_write_failed(self.path.display().to_string(), e))?;

        fs::write(&self.path, content)
            .await
            .map_err(|e| AppError::file_write_failed(self.path.display().to_string(), e))?;

        debug!("会话已保存: {}", self.path.display());
        Ok(())
    }

    /// 删除会话（退出登录）
    pub async fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::File(FileError::DeleteFailed {
                path: self.path.display().to_string(),
                source: Box::new(e),
            })),
        }
    }
}
