//! 分析请求上下文
//!
//! 封装"我正在分析哪份试卷、用户要求了哪些额外检查"这一信息

use std::fmt::Display;
use std::time::Instant;

/// 用户在一次请求中选择的可选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewOptions {
    /// 调用语法检查服务
    pub grammar: bool,
    /// 调用 LLM 整体审阅
    pub llm: bool,
    /// 报告中附带提取出的原始文本
    pub show_text: bool,
}

/// 分析上下文
#[derive(Debug, Clone)]
pub struct ReviewCtx {
    pub file_name: String,
    pub options: ReviewOptions,
    pub started_at: Instant,
}

impl ReviewCtx {
    pub fn new(file_name: impl Into<String>, options: ReviewOptions) -> Self {
        Self {
            file_name: file_name.into(),
            options,
            started_at: Instant::now(),
        }
    }

    /// 已耗时（毫秒），仅用于日志
    pub fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }
}

impl Display for ReviewCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[试卷 {}]", self.file_name)
    }
}
