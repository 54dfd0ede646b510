//! 结果写入服务 - 业务能力层
//!
//! 只负责"把结果写成 JSON 文件"能力，不关心流程

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::FileError;

/// 结果写入服务
///
/// 文件名为 `<名称>_<时间戳>.json`，名称中的路径分隔符等字符会被替换
pub struct OutputWriter {
    folder: PathBuf,
}

impl OutputWriter {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// 写入一个 JSON 文件，返回文件路径
    pub async fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, FileError> {
        let file_name = format!(
            "{}_{}.json",
            sanitize_file_stem(name),
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = self.folder.join(file_name);
        let path_str = path.display().to_string();

        let body = serde_json::to_vec_pretty(value).map_err(|source| FileError::SerializeFailed {
            path: path_str.clone(),
            source,
        })?;

        tokio::fs::create_dir_all(&self.folder)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: self.folder.display().to_string(),
                source,
            })?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: path_str.clone(),
                source,
            })?;

        debug!("结果已写入: {}", path_str);
        Ok(path)
    }
}

/// 文件名只保留字母、数字和下划线
fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "toets".to_string()
    } else {
        stem
    }
}
