//! 分题服务 - 业务能力层
//!
//! 把原始文本切分为按顺序排列的题目。
//! 题号识别统一由 [`match_marker`] 完成，返回命中的题号类型和去掉前缀后的剩余文本。

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::config::SegmentStrategy;
use crate::infrastructure::IMAGE_PLACEHOLDER;
use crate::models::{AltLabel, Alternative, DropReason, DroppedBlock, Exam, Question};
use crate::services::alternatives;

static RE_BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n+").expect("valid blank run regex"));

// 题号模式按顺序尝试，先命中者优先
static RE_LABELED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:quest[ãa]o\s+|q\.?\s*)(\d+)").expect("valid labeled marker regex")
});
static RE_DOTTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*").expect("valid dotted marker regex"));
static RE_PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\)\s*").expect("valid parenthesized marker regex"));

static RE_ALTERNATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-e])[).]\s+").expect("valid alternative regex"));

/// 题号标记的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// "Questão 01" / "Q1"
    Labeled,
    /// "1. "
    Dotted,
    /// "1) "
    Parenthesized,
}

/// 题号匹配结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerMatch<'a> {
    pub kind: MarkerKind,
    pub number: Option<u32>,
    /// 去掉题号前缀后的文本
    pub remainder: &'a str,
}

/// 判断一行是否以题号开头
pub fn match_marker(line: &str) -> Option<MarkerMatch<'_>> {
    if let Some(caps) = RE_LABELED.captures(line) {
        let end = caps.get(0).map_or(0, |m| m.end());
        let remainder = line[end..]
            .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ':' | ')' | '-' | '–'));
        return Some(MarkerMatch {
            kind: MarkerKind::Labeled,
            number: caps[1].parse().ok(),
            remainder: remainder.trim(),
        });
    }

    if let Some(caps) = RE_DOTTED.captures(line) {
        let dot_end = caps.get(1).map_or(0, |m| m.end()) + 1;
        // "1.)" 不是题号
        if !line[dot_end..].starts_with(')') {
            let end = caps.get(0).map_or(0, |m| m.end());
            return Some(MarkerMatch {
                kind: MarkerKind::Dotted,
                number: caps[1].parse().ok(),
                remainder: line[end..].trim(),
            });
        }
    }

    if let Some(caps) = RE_PARENTHESIZED.captures(line) {
        let end = caps.get(0).map_or(0, |m| m.end());
        return Some(MarkerMatch {
            kind: MarkerKind::Parenthesized,
            number: caps[1].parse().ok(),
            remainder: line[end..].trim(),
        });
    }

    None
}

/// 判断一行是否为选项，返回字母和去掉字母后的文本
pub fn match_alternative(line: &str) -> Option<(AltLabel, &str)> {
    let caps = RE_ALTERNATIVE.captures(line)?;
    let label = caps[1].chars().next().and_then(AltLabel::from_char)?;
    let end = caps.get(0).map_or(0, |m| m.end());
    Some((label, line[end..].trim()))
}

/// 统一换行、合并连续空行
pub fn normalize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    RE_BLANK_RUN.replace_all(&text, "\n\n").trim().to_string()
}

/// 规范化后按行切分，去掉空行
pub fn normalized_lines(text: &str) -> Vec<String> {
    normalize_text(text)
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn is_image_placeholder(line: &str) -> bool {
    line.eq_ignore_ascii_case(IMAGE_PLACEHOLDER)
}

/// 分题服务
pub struct Segmenter {
    strategy: SegmentStrategy,
    alternatives_per_question: usize,
}

impl Segmenter {
    pub fn new(strategy: SegmentStrategy) -> Self {
        Self {
            strategy,
            alternatives_per_question: 5,
        }
    }

    /// 逐行扫描时收满多少个选项后停止识别选项
    pub fn with_alternative_limit(mut self, limit: usize) -> Self {
        self.alternatives_per_question = limit;
        self
    }

    pub fn segment(&self, text: &str) -> Exam {
        let lines = normalized_lines(text);
        debug!("分题策略: {:?}, 有效行数: {}", self.strategy, lines.len());

        match self.strategy {
            SegmentStrategy::LineScan => scan_lines(&lines, self.alternatives_per_question),
            SegmentStrategy::Span => alternatives::segment_spans(&lines),
        }
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(SegmentStrategy::LineScan)
    }
}

/// 正在收集中的题目
pub(crate) struct PendingQuestion {
    pub(crate) marker_line: String,
    pub(crate) number: Option<u32>,
    pub(crate) statement: String,
    pub(crate) alternatives: Vec<Alternative>,
    pub(crate) references_visual: bool,
}

impl PendingQuestion {
    pub(crate) fn start(line: &str, marker: &MarkerMatch<'_>) -> Self {
        Self {
            marker_line: line.to_string(),
            number: marker.number,
            statement: marker.remainder.to_string(),
            alternatives: Vec::new(),
            references_visual: false,
        }
    }

    pub(crate) fn append_statement(&mut self, line: &str) {
        if !self.statement.is_empty() {
            self.statement.push(' ');
        }
        self.statement.push_str(line);
    }
}

/// 收尾一道题：没有选项或题干为空的题块被丢弃并记录
pub(crate) fn flush(exam: &mut Exam, pending: PendingQuestion) {
    let statement = pending.statement.trim();
    let reason = if pending.alternatives.is_empty() {
        Some(DropReason::NoAlternatives)
    } else if statement.is_empty() {
        Some(DropReason::EmptyStatement)
    } else {
        None
    };

    if let Some(reason) = reason {
        exam.dropped.push(DroppedBlock::new(pending.marker_line, reason));
        return;
    }

    exam.questions.push(Question {
        ordinal: exam.questions.len() + 1,
        number: pending.number,
        statement: statement.to_string(),
        alternatives: pending.alternatives,
        references_visual: pending.references_visual,
    });
}

fn scan_lines(lines: &[String], limit: usize) -> Exam {
    let mut exam = Exam::default();
    let mut current: Option<PendingQuestion> = None;
    let mut expecting_alternatives = false;

    for line in lines {
        if let Some(marker) = match_marker(line) {
            if let Some(previous) = current.take() {
                flush(&mut exam, previous);
            }
            current = Some(PendingQuestion::start(line, &marker));
            expecting_alternatives = true;
            continue;
        }

        if is_image_placeholder(line) {
            exam.has_visual = true;
            if let Some(question) = current.as_mut() {
                question.references_visual = true;
            }
            continue;
        }

        // 题号出现之前的内容（封面、说明等）忽略
        let Some(question) = current.as_mut() else {
            continue;
        };

        if expecting_alternatives {
            if let Some((label, text)) = match_alternative(line) {
                question.alternatives.push(Alternative::new(label, text));
                if question.alternatives.len() >= limit {
                    expecting_alternatives = false;
                }
                continue;
            }
        }

        question.append_statement(line);
    }

    if let Some(last) = current.take() {
        flush(&mut exam, last);
    }

    exam
}
