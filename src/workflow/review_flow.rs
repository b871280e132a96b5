//! 试卷分析流程 - 流程层
//!
//! 核心职责：定义"一份试卷"的完整处理流程
//!
//! 流程顺序：
//! 1. 提取文本
//! 2. 分题 → 评分（确定性，先完成）
//! 3. 语法检查（可选，失败只留下一条提示）
//! 4. LLM 审阅（可选，失败只留下一条提示）

use tracing::{info, warn};

use crate::config::{Config, RubricConfig};
use crate::error::{AppError, AppResult};
use crate::infrastructure::extract_text;
use crate::models::{Document, Exam, Finding, Report};
use crate::services::segmenter::normalize_text;
use crate::services::{
    ExamReviewer, GrammarService, LlmService, RubricEvaluator, Segmenter, StatementReviewer,
};
use crate::utils::logging;
use crate::workflow::review_ctx::{ReviewCtx, ReviewOptions};

pub const MSG_GRAMMAR_UNAVAILABLE: &str =
    "Não foi possível verificar a gramática. Tente novamente mais tarde.";
pub const MSG_LLM_UNAVAILABLE: &str = "Não foi possível obter a revisão do modelo de linguagem.";
pub const MSG_LLM_NOT_CONFIGURED: &str =
    "Revisão por modelo de linguagem não configurada (defina LLM_API_KEY).";

/// 试卷分析流程
///
/// - 编排提取、分题、评分和可选的外部审阅
/// - 确定性部分只依赖本地文本
/// - 外部审阅通过 trait 注入，可替换
pub struct ReviewFlow {
    segmenter: Segmenter,
    evaluator: RubricEvaluator,
    grammar: Box<dyn StatementReviewer>,
    llm: Option<Box<dyn ExamReviewer>>,
}

impl ReviewFlow {
    /// 按配置创建流程；未配置 LLM 凭证时不创建 LLM 服务
    pub fn new(config: &Config, rubric: RubricConfig) -> Self {
        let llm: Option<Box<dyn ExamReviewer>> = if config.llm_enabled() {
            Some(Box::new(LlmService::new(config, rubric.clone())))
        } else {
            None
        };

        Self::with_reviewers(rubric, Box::new(GrammarService::new(config)), llm)
    }

    /// 使用自定义的审阅实现创建流程
    pub fn with_reviewers(
        rubric: RubricConfig,
        grammar: Box<dyn StatementReviewer>,
        llm: Option<Box<dyn ExamReviewer>>,
    ) -> Self {
        let segmenter = Segmenter::new(rubric.strategy)
            .with_alternative_limit(rubric.alternatives_per_question);

        Self {
            segmenter,
            evaluator: RubricEvaluator::new(rubric),
            grammar,
            llm,
        }
    }

    /// 分析一份上传的文档
    pub async fn run(&self, document: Document, options: ReviewOptions) -> AppResult<Report> {
        let ctx = ReviewCtx::new(document.file_name.clone(), options);
        let format = document.format;
        logging::log_review_start(&ctx.file_name, document.bytes.len());

        // 文本提取是 CPU 密集操作，放到阻塞线程池
        let text = tokio::task::spawn_blocking(move || extract_text(&document))
            .await
            .map_err(|e| AppError::extraction_failed(format, format!("提取任务异常终止: {}", e)))??;
        logging::log_extracted_text(&ctx.file_name, &text);

        self.review_text(&text, &ctx).await
    }

    /// 对已提取的文本执行分析
    pub async fn review_text(&self, text: &str, ctx: &ReviewCtx) -> AppResult<Report> {
        let (exam, mut report) = self.evaluate_text(text);

        if ctx.options.show_text {
            report.raw_text = Some(normalize_text(text));
        }

        if ctx.options.grammar {
            self.apply_grammar(&exam, &mut report, ctx).await;
        }

        if ctx.options.llm {
            self.apply_llm(text, &mut report, ctx).await;
        }

        logging::log_report(&ctx.file_name, &report);
        info!("{} ✓ 分析完成，耗时 {} ms", ctx, ctx.elapsed_ms());

        Ok(report)
    }

    /// 确定性部分：分题 + 评分
    pub fn evaluate_text(&self, text: &str) -> (Exam, Report) {
        let exam = self.segmenter.segment(text);
        logging::log_segmentation(&exam);
        let report = self.evaluator.evaluate(&exam);
        (exam, report)
    }

    async fn apply_grammar(&self, exam: &Exam, report: &mut Report, ctx: &ReviewCtx) {
        info!("{} 🔍 正在进行语法检查...", ctx);

        for question in &exam.questions {
            match self.grammar.review(&question.statement).await {
                Ok(issues) if issues.is_empty() => {}
                Ok(issues) => {
                    report.advisories.push(Finding::question(
                        question.ordinal,
                        format!(
                            "Problemas de gramática/ortografia no enunciado: {}.",
                            issues.join(", ")
                        ),
                    ));
                }
                Err(e) => {
                    warn!("{} ⚠️ 语法检查失败: {}", ctx, e);
                    report.advisories.push(Finding::exam(MSG_GRAMMAR_UNAVAILABLE));
                    break;
                }
            }
        }
    }

    async fn apply_llm(&self, text: &str, report: &mut Report, ctx: &ReviewCtx) {
        let Some(llm) = self.llm.as_ref() else {
            warn!("{} ⚠️ 未配置 LLM，跳过整体审阅", ctx);
            report.advisories.push(Finding::exam(MSG_LLM_NOT_CONFIGURED));
            return;
        };

        info!("{} 🤖 正在请求 LLM 审阅...", ctx);
        match llm.review_exam(text).await {
            Ok(review) => report.llm_review = Some(review),
            Err(e) => {
                warn!("{} ⚠️ LLM 审阅失败: {}", ctx, e);
                report.llm_review = Some(MSG_LLM_UNAVAILABLE.to_string());
            }
        }
    }
}
