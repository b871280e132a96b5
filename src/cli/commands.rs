use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::SegmentStrategy;
use crate::workflow::ReviewOptions;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 分析一份 PDF 或 DOCX 试卷并输出报告
    Check(CheckArgs),
    /// 启动网页上传服务
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// 试卷文件（.pdf 或 .docx）
    pub file: PathBuf,

    /// 对每道题的题干做语法检查
    #[arg(long)]
    pub grammar: bool,

    /// 请求 LLM 整体审阅
    #[arg(long)]
    pub llm: bool,

    /// 报告末尾附带提取出的文本
    #[arg(long)]
    pub show_text: bool,

    /// 以 JSON 输出报告
    #[arg(long)]
    pub json: bool,

    /// 评分规则 TOML 文件，优先于 RUBRIC_FILE
    #[arg(long, value_name = "TOML")]
    pub rubric: Option<PathBuf>,

    /// 分题策略
    #[arg(long, value_enum)]
    pub strategy: Option<SegmentStrategy>,
}

impl CheckArgs {
    pub fn options(&self) -> ReviewOptions {
        ReviewOptions {
            grammar: self.grammar,
            llm: self.llm,
            show_text: self.show_text,
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// 监听地址，默认取 SERVER_ADDR
    #[arg(long)]
    pub addr: Option<String>,

    /// 评分规则 TOML 文件，优先于 RUBRIC_FILE
    #[arg(long, value_name = "TOML")]
    pub rubric: Option<PathBuf>,

    /// 分题策略
    #[arg(long, value_enum)]
    pub strategy: Option<SegmentStrategy>,
}
