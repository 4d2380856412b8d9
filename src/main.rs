use std::path::PathBuf;

use anyhow::Result;
use election_survey::utils::logging;
use election_survey::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置：传入 TOML 路径时使用文件，否则读取环境变量
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_toml_file(&PathBuf::from(path)).await?,
        None => Config::from_env(),
    };

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config)?.run().await?;

    Ok(())
}
