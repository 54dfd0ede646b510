use crate::error::FileError;
use crate::models::job::ExamJob;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载试卷任务
pub async fn load_toml_to_exam_job(toml_file_path: &Path) -> Result<ExamJob> {
    let path = toml_file_path.display().to_string();
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: path.clone(),
            source,
        })?;

    let job: ExamJob = toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
        path: path.clone(),
        source,
    })?;

    // 参数范围在加载时检查
    job.params
        .validate()
        .with_context(|| format!("任务参数不合法: {}", path))?;

    Ok(job.with_file_path(path))
}

/// 从文件夹中加载所有 TOML 任务，按文件名排序
///
/// 单个文件解析失败只记录警告，不影响其他任务
pub async fn load_all_toml_files(folder_path: &str) -> Result<Vec<ExamJob>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut jobs = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_toml_to_exam_job(&path).await {
            Ok(job) => {
                tracing::info!(
                    "成功加载任务 {} (题目数: {}, 修订轮数: {})",
                    job.name,
                    job.params.question_count,
                    job.revisions.len()
                );
                jobs.push(job);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(jobs)
}
