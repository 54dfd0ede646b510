use thiserror::Error;

use crate::models::Stage;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入参数错误（预算、权重、配置范围）
    #[error("输入错误: {0}")]
    InvalidInput(#[from] InputError),
    /// 外部生成服务（LLM）错误
    #[error("协作服务错误: {0}")]
    Collaborator(#[from] CollaboratorError),
    /// 流水线状态错误（前置条件、并发）
    #[error("流水线错误: {0}")]
    Pipeline(#[from] PipelineError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 输入参数错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    /// 题目总数为负
    #[error("题目总数不能为负: {0}")]
    NegativeBudget(i64),
    /// 权重为负
    #[error("RTTI 权重不能为负: {category}={value}")]
    NegativeWeight { category: &'static str, value: i64 },
    /// 数值超出允许范围
    #[error("{field} 超出范围 [{min}, {max}]: {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    /// 未启用任何题型
    #[error("至少需要启用一种题型")]
    NoQuestionTypes,
}

/// 协作服务错误
///
/// 任何一种都意味着该阶段失败，绝不做部分合并
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// 网络失败或 API 返回非成功响应
    #[error("LLM 服务不可用 (阶段: {stage}, 模型: {model}): {message}")]
    Unavailable {
        stage: Stage,
        model: String,
        message: String,
    },
    /// 返回内容为空
    #[error("LLM 返回内容为空 (阶段: {stage}, 模型: {model})")]
    EmptyResponse { stage: Stage, model: String },
    /// 返回内容不是合法 JSON 或不符合约定结构
    #[error("LLM 返回结果不符合 {stage} 的结构约定: {source}")]
    SchemaMismatch {
        stage: Stage,
        #[source]
        source: serde_json::Error,
    },
    /// 结构合法但违反试卷不变量
    #[error("LLM 返回的试卷违反结构约束 (阶段: {stage}): {reason}")]
    InvariantViolation { stage: Stage, reason: String },
    /// 构建请求失败
    #[error("构建 LLM 请求失败 (阶段: {stage}): {message}")]
    RequestBuild { stage: Stage, message: String },
}

impl CollaboratorError {
    /// 失败所属的阶段
    pub fn stage(&self) -> Stage {
        match self {
            CollaboratorError::Unavailable { stage, .. }
            | CollaboratorError::EmptyResponse { stage, .. }
            | CollaboratorError::SchemaMismatch { stage, .. }
            | CollaboratorError::InvariantViolation { stage, .. }
            | CollaboratorError::RequestBuild { stage, .. } => *stage,
        }
    }

    /// 是否为传输层失败（而非返回内容问题）
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CollaboratorError::Unavailable { .. })
    }
}

/// 流水线状态错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// 缺少必要输入，请求未发出
    #[error("{stage} 缺少必要输入: {what}")]
    EmptyInput { stage: Stage, what: &'static str },
    /// 还没有生成试卷
    #[error("{stage} 需要先生成试卷")]
    NoArtifact { stage: Stage },
    /// 没有待规范化的提取结果
    #[error("没有待规范化的提取结果")]
    NoExtraction,
    /// 同一阶段或互斥阶段正在执行
    #[error("{stage} 无法开始: {blocking} 正在执行")]
    StageBusy { stage: Stage, blocking: Stage },
    /// 执行期间试卷版本已变化，结果被丢弃
    #[error("{stage} 的结果已过期: 期望版本 {expected}, 当前版本 {actual}")]
    StaleResult {
        stage: Stage,
        expected: u64,
        actual: u64,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 读取失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 结果序列化失败
    #[error("序列化失败 ({path}): {source}")]
    SerializeFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷判断 ==========

impl AppError {
    /// 是否为单飞/互斥拒绝
    pub fn is_busy(&self) -> bool {
        matches!(self, AppError::Pipeline(PipelineError::StageBusy { .. }))
    }

    /// 是否在发出请求前就被拒绝（零成本失败）
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            AppError::InvalidInput(_)
                | AppError::Pipeline(PipelineError::EmptyInput { .. })
                | AppError::Pipeline(PipelineError::NoArtifact { .. })
                | AppError::Pipeline(PipelineError::NoExtraction)
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
