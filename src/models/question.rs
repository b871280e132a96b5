use serde::{Deserialize, Serialize};
use std::fmt;

/// 选项字母 a–e
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltLabel {
    A,
    B,
    C,
    D,
    E,
}

impl AltLabel {
    /// 全部合法字母，按顺序
    pub const ALL: [AltLabel; 5] = [
        AltLabel::A,
        AltLabel::B,
        AltLabel::C,
        AltLabel::D,
        AltLabel::E,
    ];

    /// 从字符解析（忽略大小写）
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' => Some(AltLabel::A),
            'b' => Some(AltLabel::B),
            'c' => Some(AltLabel::C),
            'd' => Some(AltLabel::D),
            'e' => Some(AltLabel::E),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            AltLabel::A => 'a',
            AltLabel::B => 'b',
            AltLabel::C => 'c',
            AltLabel::D => 'd',
            AltLabel::E => 'e',
        }
    }
}

impl fmt::Display for AltLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 单个选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub label: AltLabel,
    pub text: String,
}

impl Alternative {
    pub fn new(label: AltLabel, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }

    /// 用于判重的归一化文本（小写，连续空白合并为一个空格）
    ///
    /// 逐行扫描保留原始空白，题块策略会合并空白，两者必须得到相同的结果
    pub fn normalized(&self) -> String {
        self.text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

/// 一道选择题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 在试卷中的位置（从1开始）
    pub ordinal: usize,
    /// 题号标记中印刷的数字，例如 "Questão 07" 中的 7
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    pub statement: String,
    pub alternatives: Vec<Alternative>,
    /// 题目范围内检测到图片占位
    pub references_visual: bool,
}

impl Question {
    pub fn new(ordinal: usize, statement: impl Into<String>) -> Self {
        Self {
            ordinal,
            number: None,
            statement: statement.into(),
            alternatives: Vec::new(),
            references_visual: false,
        }
    }

    pub fn with_alternatives<I, S>(mut self, alternatives: I) -> Self
    where
        I: IntoIterator<Item = (AltLabel, S)>,
        S: Into<String>,
    {
        self.alternatives = alternatives
            .into_iter()
            .map(|(label, text)| Alternative::new(label, text))
            .collect();
        self
    }

    pub fn with_visual(mut self, references_visual: bool) -> Self {
        self.references_visual = references_visual;
        self
    }
}

/// 题块被丢弃的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DropReason {
    /// 没有识别到任何选项
    NoAlternatives,
    /// 有选项但题干为空
    EmptyStatement,
}

/// 没有成为题目的题块
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedBlock {
    /// 开启该题块的原始行
    pub marker_line: String,
    pub reason: DropReason,
}

impl DroppedBlock {
    pub fn new(marker_line: impl Into<String>, reason: DropReason) -> Self {
        Self {
            marker_line: marker_line.into(),
            reason,
        }
    }
}

/// 一次分析的完整输入：按顺序排列的题目以及文档级信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    pub questions: Vec<Question>,
    /// 整份文档中是否检测到任何图片
    pub has_visual: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<DroppedBlock>,
}

impl Exam {
    pub fn new(questions: Vec<Question>) -> Self {
        let has_visual = questions.iter().any(|q| q.references_visual);
        Self {
            questions,
            has_visual,
            dropped: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
