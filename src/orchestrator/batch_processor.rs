//! 批量任务处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量任务的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、LLM 后端、协作者
//! 2. **批量加载**：扫描并加载所有 TOML 任务（`Vec<ExamJob>`）
//! 3. **并发控制**：使用 Semaphore 限制同时运行的任务数
//! 4. **资源管理**：持有唯一的协作者，所有任务共享
//! 5. **全局统计**：汇总所有任务的处理结果
//!
//! 每个任务拥有独立的 `ExamPipeline`，任务之间不共享试卷状态。

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::{LlmBackend, OpenAiBackend};
use crate::models::ExamJob;
use crate::orchestrator::job_processor;
use crate::services::{ExamCollaborator, OutputWriter};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    collaborator: Arc<ExamCollaborator>,
    writer: Arc<OutputWriter>,
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

impl App {
    /// 使用 OpenAI 兼容后端初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let backend: Arc<dyn LlmBackend> = Arc::new(OpenAiBackend::new(&config));
        Self::with_backend(config, backend)
    }

    /// 使用指定后端初始化应用
    pub fn with_backend(config: Config, backend: Arc<dyn LlmBackend>) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(
            config.max_concurrent_jobs,
            &config.llm_fast_model,
            &config.llm_pro_model,
            &config.llm_api_base_url,
        );

        if config.llm_api_key.is_empty() {
            warn!("⚠️ 未设置 LLM_API_KEY，请求可能被拒绝");
        }

        let collaborator = Arc::new(ExamCollaborator::new(backend, &config));
        let writer = Arc::new(OutputWriter::new(&config.output_folder));

        Ok(Self {
            config,
            collaborator,
            writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let jobs = self.load_jobs().await?;

        if jobs.is_empty() {
            warn!("⚠️ 没有找到待处理的 TOML 任务，程序结束");
            return Ok(ProcessingStats::default());
        }

        logging::log_jobs_loaded(jobs.len(), self.config.max_concurrent_jobs);

        let started = Instant::now();
        let stats = self.process_all_jobs(jobs).await?;

        if let Err(e) = logging::log_batch_summary(
            stats.success,
            stats.failed,
            stats.total,
            started.elapsed(),
            &self.config.output_log_file,
        ) {
            warn!("写入日志文件失败: {}", e);
        }

        Ok(stats)
    }

    async fn load_jobs(&self) -> Result<Vec<ExamJob>> {
        info!("\n📁 正在扫描待处理的任务: {}", self.config.job_folder);
        crate::models::load_all_toml_files(&self.config.job_folder).await
    }

    /// 并发处理所有任务，同时运行的数量受 Semaphore 限制
    async fn process_all_jobs(&self, jobs: Vec<ExamJob>) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_jobs));
        let mut stats = ProcessingStats {
            total: jobs.len(),
            ..Default::default()
        };

        let mut handles = Vec::new();
        for (idx, job) in jobs.into_iter().enumerate() {
            let job_index = idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let collaborator = self.collaborator.clone();
            let writer = self.writer.clone();
            let log_file = self.config.output_log_file.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let name = job.name.clone();
                let result =
                    job_processor::process_job(collaborator, job, job_index, &writer).await;

                let line = match &result {
                    Ok(outcome) => format!(
                        "✓ {} → {}",
                        name,
                        outcome.output_path.display()
                    ),
                    Err(e) => {
                        error!("[任务 {}] ❌ 处理过程中发生错误: {:#}", job_index, e);
                        format!("✗ {}: {:#}", name, e)
                    }
                };
                if let Err(e) = logging::append_log_line(&log_file, &line) {
                    warn!("写入日志文件失败: {}", e);
                }
                result.is_ok()
            });
            handles.push((job_index, handle));
        }

        let (indices, handles): (Vec<usize>, Vec<_>) = handles.into_iter().unzip();
        for (job_index, joined) in indices.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(true) => stats.success += 1,
                Ok(false) => stats.failed += 1,
                Err(e) => {
                    error!("[任务 {}] 任务执行失败: {}", job_index, e);
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }
}
