use std::process::ExitCode;

use clap::Parser;
use exam_review::cli::Cli;
use exam_review::utils::logging;
use exam_review::{AppError, Config};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    match cli.run(config).await {
        Ok(code) => code,
        Err(e) => {
            error!("❌ {:#}", e);
            match e.downcast_ref::<AppError>() {
                Some(app_err) => eprintln!("{}", app_err.user_message()),
                None => eprintln!("Erro: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}
