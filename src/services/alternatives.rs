//! 选项解析 - 按题块切分的分题策略
//!
//! 先用题号把文本切成若干题块，再在每个题块内用一个正则提取全部选项。
//! 每个选项的文字延伸到下一个选项字母或题块末尾，不假定选项个数。

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{AltLabel, Alternative, Exam};
use crate::services::segmenter::{self, is_image_placeholder, match_marker, PendingQuestion};

static RE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)([a-e])[).]\s+").expect("valid label regex"));

/// 从题块文本中拆出题干和选项
pub fn parse_alternatives(span: &str) -> (String, Vec<Alternative>) {
    let labels: Vec<(AltLabel, usize, usize)> = RE_LABEL
        .captures_iter(span)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let label = caps[1].chars().next().and_then(AltLabel::from_char)?;
            Some((label, whole.start(), whole.end()))
        })
        .collect();

    let statement_end = labels.first().map_or(span.len(), |&(_, start, _)| start);
    let statement = collapse_whitespace(&span[..statement_end]);

    let alternatives = labels
        .iter()
        .enumerate()
        .map(|(i, &(label, _, text_start))| {
            let text_end = labels.get(i + 1).map_or(span.len(), |&(_, start, _)| start);
            Alternative::new(label, collapse_whitespace(&span[text_start..text_end]))
        })
        .collect();

    (statement, alternatives)
}

/// 题块策略：与逐行扫描产出相同结构的 `Exam`
pub fn segment_spans(lines: &[String]) -> Exam {
    let mut exam = Exam::default();
    let mut current: Option<(PendingQuestion, Vec<&str>)> = None;

    for line in lines {
        if let Some(marker) = match_marker(line) {
            if let Some((pending, body)) = current.take() {
                finish_span(&mut exam, pending, &body);
            }
            let pending = PendingQuestion::start(line, &marker);
            current = Some((pending, Vec::new()));
            continue;
        }

        if is_image_placeholder(line) {
            exam.has_visual = true;
            if let Some((pending, _)) = current.as_mut() {
                pending.references_visual = true;
            }
            continue;
        }

        if let Some((_, body)) = current.as_mut() {
            body.push(line.as_str());
        }
    }

    if let Some((pending, body)) = current.take() {
        finish_span(&mut exam, pending, &body);
    }

    exam
}

fn finish_span(exam: &mut Exam, mut pending: PendingQuestion, body: &[&str]) {
    // 题号行剩余的文字也属于题块
    let mut span = std::mem::take(&mut pending.statement);
    for line in body {
        if !span.is_empty() {
            span.push('\n');
        }
        span.push_str(line);
    }

    let (statement, alternatives) = parse_alternatives(&span);
    pending.statement = statement;
    pending.alternatives = alternatives;
    segmenter::flush(exam, pending);
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
