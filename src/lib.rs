//! # Exam Review
//!
//! 检查多项选择题试卷（PDF / DOCX）是否符合评分规则
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 把上传的文档变成原始文本
//! - `pdf` - 基于 pdf-extract
//! - `docx` - 基于 zip + quick-xml，嵌入图片输出占位行
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心请求从哪里来
//! - `Segmenter` - 分题、识别选项
//! - `RubricEvaluator` - 确定性评分
//! - `GrammarService` / `LlmService` - 可选的外部审阅
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份试卷"的完整处理流程
//! - `ReviewCtx` - 上下文封装（文件名 + 用户选项）
//! - `ReviewFlow` - 流程编排（提取 → 分题 → 评分 → 审阅）
//!
//! ### ④ 编排层与展示层
//! - `app` - 持有配置和流程，分派到单文件分析或网页服务
//! - `presentation/` - 终端报告、网页报告、上传服务
//! - `cli` - 命令行参数
//!
//! ## 模块结构

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod presentation;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::{Config, RubricConfig};
pub use error::{AppError, AppResult};
pub use models::{Document, DocumentFormat, Exam, Finding, Question, Report, ReviewStatus};
pub use services::{RubricEvaluator, Segmenter};
pub use workflow::{ReviewCtx, ReviewFlow, ReviewOptions};
