use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 审核结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewStatus {
    Approved,
    NeedsReview,
}

impl ReviewStatus {
    /// 页面上展示的标签
    pub fn label(self) -> &'static str {
        match self {
            ReviewStatus::Approved => "Aprovado",
            ReviewStatus::NeedsReview => "Revisar",
        }
    }

    pub fn is_approved(self) -> bool {
        self == ReviewStatus::Approved
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::Approved => write!(f, "approved"),
            ReviewStatus::NeedsReview => write!(f, "needs-review"),
        }
    }
}

/// 一条审核意见，`question` 为空表示试卷级意见
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<usize>,
    pub message: String,
}

impl Finding {
    pub fn exam(message: impl Into<String>) -> Self {
        Self {
            question: None,
            message: message.into(),
        }
    }

    pub fn question(ordinal: usize, message: impl Into<String>) -> Self {
        Self {
            question: Some(ordinal),
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.question {
            Some(n) => write!(f, "Questão {}: {}", n, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// 审核报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub status: ReviewStatus,
    pub question_count: usize,
    pub findings: Vec<Finding>,
    /// 语法检查等外部服务的提示，不影响结论
    #[serde(default)]
    pub advisories: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_review: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    pub generated_at: DateTime<Local>,
}

impl Report {
    /// 由审核意见生成报告，意见为空即通过
    pub fn from_findings(question_count: usize, findings: Vec<Finding>) -> Self {
        let status = if findings.is_empty() {
            ReviewStatus::Approved
        } else {
            ReviewStatus::NeedsReview
        };

        Self {
            status,
            question_count,
            findings,
            advisories: Vec::new(),
            llm_review: None,
            raw_text: None,
            generated_at: Local::now(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status.is_approved()
    }
}
