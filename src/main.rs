use anyhow::Result;
use sales_form_submit::utils::logging;
use sales_form_submit::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(&config)?;

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
