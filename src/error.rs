use thiserror::Error;

use crate::models::DocumentFormat;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件格式不受支持（既不是 PDF 也不是 DOCX）
    #[error("不支持的文件格式: {file_name}")]
    UnsupportedFormat { file_name: String },

    /// 文档无法解析为文本（损坏、加密或没有文本层）
    #[error("{format} 文本提取失败: {reason}")]
    ExtractionFailed {
        format: DocumentFormat,
        reason: String,
    },

    /// 文件读取错误
    #[error("读取文件失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 评分规则文件读取失败
    #[error("无法读取评分规则文件 {path}: {source}")]
    RubricReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 评分规则文件解析失败
    #[error("无法解析评分规则文件 {path}: {source}")]
    RubricParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 评分规则取值非法
    #[error("评分规则非法: {0}")]
    InvalidRubric(String),
}

/// 外部审阅服务错误
#[derive(Debug, Error)]
pub enum ReviewerError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 服务返回非成功状态码
    #[error("服务返回错误响应 ({endpoint}): HTTP {status}")]
    BadResponse { endpoint: String, status: u16 },

    /// LLM API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    LlmCallFailed { model: String, message: String },

    /// LLM 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文本提取错误
    pub fn extraction_failed(format: DocumentFormat, reason: impl Into<String>) -> Self {
        AppError::ExtractionFailed {
            format,
            reason: reason.into(),
        }
    }

    /// 创建文件读取错误
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// 面向用户的提示语，对应上传页面的弹窗文案
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::UnsupportedFormat { .. } => "Formato de arquivo inválido. Use PDF ou DOCX.",
            AppError::ExtractionFailed { .. } | AppError::Io { .. } => {
                "Erro ao processar o arquivo. Verifique o formato."
            }
            AppError::Config(_) => "Configuração inválida.",
        }
    }
}

impl ReviewerError {
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        ReviewerError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
