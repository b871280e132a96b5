//! 评分规则服务 - 业务能力层
//!
//! 纯函数：同样的输入总是得到同样的报告，不访问网络。

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::config::{ContextThreshold, RubricConfig, VisualCheck};
use crate::models::{AltLabel, DropReason, Exam, Finding, Question, Report};

/// 语境化关键词（葡萄牙语词干）
static RE_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(situaç|situac|context|históri|histori|caso|cenári|cenari|exemplo|com base)")
        .expect("valid context keyword regex")
});

/// 图片引用关键词：图表 / 图片 / 插图 / 表格 / 示意图
static RE_VISUAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(gráfico|grafico|imagem|imagens|figura|tabela|diagrama)")
        .expect("valid visual keyword regex")
});

pub const MSG_NOT_CONTEXTUALIZED: &str =
    "Enunciado não parece contextualizado (muito curto ou sem detalhes).";
pub const MSG_EMPTY_STATEMENT: &str = "enunciado vazio.";
pub const MSG_VISUAL_MISSING: &str = "Menciona gráfico/imagem, mas nenhum foi detectado.";

/// 题干是否提到图表、图片等
pub fn mentions_visual(statement: &str) -> bool {
    RE_VISUAL.is_match(statement)
}

/// 评分服务
pub struct RubricEvaluator {
    rubric: RubricConfig,
}

impl RubricEvaluator {
    pub fn new(rubric: RubricConfig) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> &RubricConfig {
        &self.rubric
    }

    /// 对整份试卷评分，所有检查都会执行，不会提前结束
    pub fn evaluate(&self, exam: &Exam) -> Report {
        let mut findings = Vec::new();

        if let Some(finding) = self.check_question_count(exam.len()) {
            findings.push(finding);
        }

        // 题干为空总是报告；没有选项的题块只在严格模式下报告
        for block in &exam.dropped {
            let message = match block.reason {
                DropReason::EmptyStatement => format!(
                    "Bloco iniciado por \"{}\" foi descartado: {}",
                    block.marker_line, MSG_EMPTY_STATEMENT
                ),
                DropReason::NoAlternatives if self.rubric.strict_segmentation => format!(
                    "Bloco iniciado por \"{}\" foi descartado: nenhuma alternativa encontrada.",
                    block.marker_line
                ),
                DropReason::NoAlternatives => continue,
            };
            findings.push(Finding::exam(message));
        }

        for question in &exam.questions {
            findings.extend(self.check_question(question, exam.has_visual));
        }

        Report::from_findings(exam.len(), findings)
    }

    fn check_question_count(&self, count: usize) -> Option<Finding> {
        let (min, max) = (self.rubric.min_questions, self.rubric.max_questions);
        if count < min || count > max {
            Some(Finding::exam(format!(
                "Número de questões inválido ({}). Deve ter entre {} e {} questões.",
                count, min, max
            )))
        } else {
            None
        }
    }

    /// 单题检查，返回该题的全部意见
    pub fn check_question(&self, question: &Question, document_has_visual: bool) -> Vec<Finding> {
        let n = question.ordinal;
        let mut findings = Vec::new();

        if let Some(message) = self.alternative_count_message(question) {
            findings.push(Finding::question(n, message));
        }

        let repeated = repeated_alternatives(question);
        if !repeated.is_empty() {
            let quoted: Vec<String> = repeated.iter().map(|t| format!("\"{}\"", t)).collect();
            findings.push(Finding::question(
                n,
                format!("Contém alternativas repetidas ou idênticas: {}.", quoted.join(", ")),
            ));
        }

        if !self.is_contextualized(&question.statement) {
            findings.push(Finding::question(n, MSG_NOT_CONTEXTUALIZED));
        }

        let has_visual = match self.rubric.visual_check {
            VisualCheck::PerQuestion => question.references_visual,
            VisualCheck::WholeDocument => document_has_visual,
        };
        if mentions_visual(&question.statement) && !has_visual {
            findings.push(Finding::question(n, MSG_VISUAL_MISSING));
        }

        findings
    }

    fn alternative_count_message(&self, question: &Question) -> Option<String> {
        let expected = self.rubric.alternatives_per_question;
        let found = question.alternatives.len();
        if found == expected {
            return None;
        }

        let mut message = format!(
            "Deve ter exatamente {} alternativas (encontrado: {}).",
            expected, found
        );

        let missing: Vec<String> = AltLabel::ALL
            .iter()
            .take(expected)
            .filter(|label| !question.alternatives.iter().any(|a| a.label == **label))
            .map(|label| label.to_string())
            .collect();
        if !missing.is_empty() {
            message.push_str(&format!(" Faltando: {}.", missing.join(", ")));
        }

        Some(message)
    }

    /// 语境化：包含关键词，或达到长度阈值
    pub fn is_contextualized(&self, statement: &str) -> bool {
        if RE_CONTEXT.is_match(statement) {
            return true;
        }

        match self.rubric.context_threshold {
            ContextThreshold::Words(min) => statement.split_whitespace().count() >= min,
            ContextThreshold::Chars(min) => {
                statement.contains(' ') && statement.chars().count() >= min
            }
        }
    }
}

impl Default for RubricEvaluator {
    fn default() -> Self {
        Self::new(RubricConfig::default())
    }
}

/// 归一化后重复出现的选项文本，按首次出现顺序
fn repeated_alternatives(question: &Question) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order = Vec::new();

    for alt in &question.alternatives {
        let key = alt.normalized();
        let count = counts.entry(key.clone()).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(key);
        }
    }

    order
}
