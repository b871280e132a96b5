//! DOCX 文本提取
//!
//! DOCX 本质是 ZIP 包，正文位于 `word/document.xml`。
//! 逐个事件读取 XML：`w:t` 为文字，`w:p` 结束时换行，
//! 嵌入的图片（`w:drawing` / `w:pict`）输出一行图片占位符。

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use super::IMAGE_PLACEHOLDER;
use crate::error::{AppError, AppResult};
use crate::models::DocumentFormat;

const DOCUMENT_XML: &str = "word/document.xml";

/// 从 DOCX 字节中提取纯文本
pub fn extract_docx_text(bytes: &[u8]) -> AppResult<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| failed(format!("无法打开 DOCX 压缩包: {}", e)))?;

    let mut entry = archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| failed(format!("缺少 {}: {}", DOCUMENT_XML, e)))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| failed(format!("读取 {} 失败: {}", DOCUMENT_XML, e)))?;

    document_xml_to_text(&xml)
}

/// 将 `document.xml` 转换为按段落分行的文本
pub fn document_xml_to_text(xml: &str) -> AppResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut output = String::new();
    let mut in_text_node = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = true,
                b"w:tab" => output.push('\t'),
                b"w:br" | b"w:cr" => output.push('\n'),
                b"w:drawing" | b"w:pict" => push_placeholder(&mut output),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => output.push('\t'),
                b"w:br" | b"w:cr" => output.push('\n'),
                b"w:p" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_node {
                    let value = e
                        .unescape()
                        .map_err(|err| failed(format!("XML 文本解码失败: {}", err)))?;
                    output.push_str(&value);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = false,
                b"w:p" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(failed(format!("XML 解析失败: {}", err))),
            _ => {}
        }
        buf.clear();
    }

    Ok(output.trim().to_string())
}

/// 图片单独占一行，方便分题时识别
fn push_placeholder(output: &mut String) {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
    output.push_str(IMAGE_PLACEHOLDER);
    output.push('\n');
}

fn failed(reason: String) -> AppError {
    AppError::extraction_failed(DocumentFormat::Docx, reason)
}
