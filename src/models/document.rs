use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// 支持的文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

static EXTENSIONS: phf::Map<&'static str, DocumentFormat> = phf_map! {
    "pdf" => DocumentFormat::Pdf,
    "docx" => DocumentFormat::Docx,
};

impl DocumentFormat {
    /// 根据文件扩展名判断格式（忽略大小写）
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|s| s.to_str())?
            .to_lowercase();
        EXTENSIONS.get(ext.as_str()).copied()
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "PDF"),
            DocumentFormat::Docx => write!(f, "DOCX"),
        }
    }
}

/// 上传的试卷文档，只在一次分析请求内存活
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

impl Document {
    /// 创建文档，扩展名无法识别时返回 `UnsupportedFormat`
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> AppResult<Self> {
        let file_name = file_name.into();
        let format = DocumentFormat::from_file_name(&file_name).ok_or_else(|| {
            AppError::UnsupportedFormat {
                file_name: file_name.clone(),
            }
        })?;

        Ok(Self {
            file_name,
            format,
            bytes,
        })
    }

    /// 从磁盘读取文档
    pub async fn load(path: &Path) -> AppResult<Self> {
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        // 先判断格式，避免读取无关的大文件
        if DocumentFormat::from_file_name(&file_name).is_none() {
            return Err(AppError::UnsupportedFormat { file_name });
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::io(path.display().to_string(), e))?;

        Self::new(file_name, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_file_name("prova.pdf"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_file_name("Prova Final.DOCX"),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(DocumentFormat::from_file_name("prova.doc"), None);
        assert_eq!(DocumentFormat::from_file_name("prova"), None);
    }

    #[test]
    fn test_unsupported_document() {
        let err = Document::new("notas.txt", b"abc".to_vec()).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result =
            tokio_test::block_on(Document::load(Path::new("/nonexistent/dir/prova.pdf")));
        assert!(matches!(result, Err(AppError::Io { .. })));
    }
}
