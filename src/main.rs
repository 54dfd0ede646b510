use anyhow::Result;
use exam_pipeline::utils::logging;
use exam_pipeline::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let stats = App::initialize(config).await?.run().await?;

    if stats.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
