//! 基础设施层 - 文本提取
//!
//! 只负责把上传的文档变成原始文本，不关心题目结构

pub mod docx;
pub mod pdf;

use crate::error::{AppError, AppResult};
use crate::models::{Document, DocumentFormat};

pub use docx::extract_docx_text;
pub use pdf::extract_pdf_text;

/// 图片占位行，提取器在遇到嵌入图片时输出
pub const IMAGE_PLACEHOLDER: &str = "[imagem]";

/// 按文档格式提取原始文本
///
/// 提取结果为空（例如扫描件没有文字层）视为提取失败
pub fn extract_text(document: &Document) -> AppResult<String> {
    let text = match document.format {
        DocumentFormat::Pdf => extract_pdf_text(&document.bytes)?,
        DocumentFormat::Docx => extract_docx_text(&document.bytes)?,
    };

    if text.trim().is_empty() {
        return Err(AppError::extraction_failed(
            document.format,
            "文档中没有可读取的文字",
        ));
    }

    Ok(text)
}
