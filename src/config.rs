/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的试卷任务数量
    pub max_concurrent_jobs: usize,
    /// TOML 任务文件存放目录
    pub job_folder: String,
    /// 生成结果输出目录
    pub output_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    /// 提取 / 规范化 / 预检使用的快速模型
    pub llm_fast_model: String,
    /// 生成 / 协同修订 / 审计使用的强模型
    pub llm_pro_model: String,
    pub llm_max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 4,
            job_folder: "jobs".to_string(),
            output_folder: "output".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_fast_model: "gemini-3-flash-preview".to_string(),
            llm_pro_model: "gemini-3-pro-preview".to_string(),
            llm_max_tokens: 16384,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_jobs: env_parse("MAX_CONCURRENT_JOBS")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(default.max_concurrent_jobs),
            job_folder: std::env::var("JOB_FOLDER").unwrap_or(default.job_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL")
                .unwrap_or(default.llm_api_base_url),
            llm_fast_model: std::env::var("LLM_FAST_MODEL").unwrap_or(default.llm_fast_model),
            llm_pro_model: std::env::var("LLM_PRO_MODEL").unwrap_or(default.llm_pro_model),
            llm_max_tokens: env_parse("LLM_MAX_TOKENS").unwrap_or(default.llm_max_tokens),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
