//! 外部审阅能力的接口
//!
//! 确定性的评分流程只依赖这两个 trait，测试时可以替换为假实现，不需要网络。

use async_trait::async_trait;

use crate::error::ReviewerError;

/// 对单个题干做语法 / 拼写检查，返回可读的问题描述
#[async_trait]
pub trait StatementReviewer: Send + Sync {
    async fn review(&self, statement: &str) -> Result<Vec<String>, ReviewerError>;
}

/// 对整份试卷做整体审阅，返回原样转交给用户的文字
#[async_trait]
pub trait ExamReviewer: Send + Sync {
    async fn review_exam(&self, exam_text: &str) -> Result<String, ReviewerError>;
}
