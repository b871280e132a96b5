//! 命令行入口
//!
//! 只负责解析参数和分派，业务交给 `App`

pub mod commands;

use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::app::App;
use crate::config::{Config, RubricConfig, SegmentStrategy};
use crate::presentation::render_text;
use commands::{CheckArgs, Commands, ServeArgs};

/// 需要修改的试卷使用的退出码
pub const EXIT_NEEDS_REVIEW: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "exam_review",
    version,
    about = "Verifica critérios de avaliação de provas de múltipla escolha (PDF/DOCX)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(self, config: Config) -> Result<ExitCode> {
        match self.command {
            Commands::Check(args) => run_check(config, args).await,
            Commands::Serve(args) => run_serve(config, args).await,
        }
    }
}

async fn run_check(config: Config, args: CheckArgs) -> Result<ExitCode> {
    let rubric = load_rubric(&config, args.rubric.as_deref(), args.strategy)?;
    let app = App::initialize(config, rubric);

    let report = app.check_file(&args.file, args.options()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report).context("报告序列化失败")?);
    } else {
        let file_name = args
            .file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        print!(
            "{}",
            render_text(&report, &file_name, std::io::stdout().is_terminal())
        );
    }

    Ok(if report.is_approved() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NEEDS_REVIEW)
    })
}

async fn run_serve(config: Config, args: ServeArgs) -> Result<ExitCode> {
    let rubric = load_rubric(&config, args.rubric.as_deref(), args.strategy)?;
    let app = App::initialize(config, rubric);

    app.serve(args.addr.as_deref()).await?;
    Ok(ExitCode::SUCCESS)
}

/// 命令行参数优先于环境变量
fn load_rubric(
    config: &Config,
    rubric_file: Option<&Path>,
    strategy: Option<SegmentStrategy>,
) -> Result<RubricConfig> {
    let mut rubric = match rubric_file {
        Some(path) => {
            info!("📄 加载评分规则: {}", path.display());
            RubricConfig::from_file(path)?
        }
        None => config.load_rubric()?,
    };

    if let Some(strategy) = strategy {
        rubric.strategy = strategy;
    }

    Ok(rubric)
}
