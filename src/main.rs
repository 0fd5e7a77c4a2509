use anyhow::Result;
use bulk_question_upload::utils::logging;
use bulk_question_upload::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let _outcome = App::initialize(config)?.run().await?;

    Ok(())
}
