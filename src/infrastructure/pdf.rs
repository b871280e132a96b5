use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use lopdf::{Dictionary, Object};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::IMAGE_PLACEHOLDER;
use crate::models::DocumentFormat;
use crate::services::segmenter::match_marker;

/// Form XObject 嵌套深度上限，避免循环引用
const MAX_FORM_DEPTH: usize = 4;
/// 沿 Parent 向上查找 Resources 的层数上限
const MAX_PARENT_DEPTH: usize = 16;

/// PDF 文本提取，基于 `pdf-extract`，只读取文字层
///
/// 多栏排版可能导致文字交错、选项字母被拆到不同的行，
/// 这是已知的漏检来源，这里不做版面分析。
///
/// 图片只能精确到页：含图片的页面里，每个题号行后面都插入一个占位行，
/// 页首也插入一个，归属于从上一页延续过来的题目。
pub fn extract_pdf_text(bytes: &[u8]) -> AppResult<String> {
    // pdf-extract 遇到畸形文件可能 panic
    let result = catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes).map(|pages| (pages, pages_with_images(bytes)))
    }))
    .map_err(|_| AppError::extraction_failed(DocumentFormat::Pdf, "解析器异常退出"))?;

    let (pages, image_pages) =
        result.map_err(|e| AppError::extraction_failed(DocumentFormat::Pdf, e.to_string()))?;
    debug!("PDF 共 {} 页，含图片的页: {:?}", pages.len(), image_pages);

    Ok(assemble_pages(&pages, &image_pages))
}

/// 拼接各页文本，并在含图片的页面插入占位行
pub fn assemble_pages(pages: &[String], image_pages: &BTreeSet<u32>) -> String {
    let mut output = String::new();

    for (index, page) in pages.iter().enumerate() {
        let has_image = image_pages.contains(&(index as u32 + 1));
        if has_image {
            push_line(&mut output, IMAGE_PLACEHOLDER);
        }

        // 分页符统一换成换行
        for line in page.replace('\u{c}', "\n").lines() {
            push_line(&mut output, line);
            if has_image && match_marker(line.trim()).is_some() {
                push_line(&mut output, IMAGE_PLACEHOLDER);
            }
        }
    }

    output
}

/// 含图片 XObject 的页码（从 1 开始）
///
/// lopdf 无法解析时返回空集合，文字提取照常进行
pub fn pages_with_images(bytes: &[u8]) -> BTreeSet<u32> {
    let doc = match lopdf::Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            debug!("lopdf 无法加载文档，跳过图片检测: {}", e);
            return BTreeSet::new();
        }
    };

    doc.get_pages()
        .into_iter()
        .filter(|&(_, page_id)| {
            doc.get_dictionary(page_id)
                .ok()
                .and_then(|page| page_resources(&doc, page))
                .is_some_and(|resources| resources_have_image(&doc, resources, 0))
        })
        .map(|(number, _)| number)
        .collect()
}

/// 页面的 Resources，可能继承自父节点
fn page_resources<'a>(doc: &'a lopdf::Document, page: &'a Dictionary) -> Option<&'a Dictionary> {
    let mut node = page;
    for _ in 0..MAX_PARENT_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            return resolve_dict(doc, resources);
        }
        node = resolve_dict(doc, node.get(b"Parent").ok()?)?;
    }
    None
}

fn resources_have_image(doc: &lopdf::Document, resources: &Dictionary, depth: usize) -> bool {
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|object| resolve_dict(doc, object))
    else {
        return false;
    };

    xobjects.iter().any(|(_, object)| {
        let Ok((_, Object::Stream(stream))) = doc.dereference(object) else {
            return false;
        };
        match stream.dict.get(b"Subtype").and_then(|subtype| subtype.as_name()) {
            Ok(b"Image") => true,
            Ok(b"Form") if depth < MAX_FORM_DEPTH => stream
                .dict
                .get(b"Resources")
                .ok()
                .and_then(|inner| resolve_dict(doc, inner))
                .is_some_and(|inner| resources_have_image(doc, inner, depth + 1)),
            _ => false,
        }
    })
}

fn resolve_dict<'a>(doc: &'a lopdf::Document, object: &'a Object) -> Option<&'a Dictionary> {
    doc.dereference(object)
        .ok()
        .and_then(|(_, resolved)| resolved.as_dict().ok())
}

fn push_line(output: &mut String, line: &str) {
    output.push_str(line);
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// 用 lopdf 生成多页 PDF；`with_image` 为真的页面在资源里声明一张 1x1 图片
    fn make_test_pdf(pages: &[(&str, bool)]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0],
        ));

        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();
        for (text, with_image) in pages {
            let content = format!("BT /F1 12 Tf 72 700 Td ({}) Tj ET", text);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

            let mut resources = dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            };
            if *with_image {
                resources.set("XObject", dictionary! { "Im1" => image_id });
            }

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => resources,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_garbage_bytes_fail() {
        let err = extract_pdf_text(b"%PDF-1.4 definitely not a pdf").unwrap_err();
        assert!(matches!(
            err,
            AppError::ExtractionFailed {
                format: DocumentFormat::Pdf,
                ..
            }
        ));
    }

    #[test]
    fn test_detects_pages_with_images() {
        let bytes = make_test_pdf(&[("Questao 1", false), ("Questao 2", true), ("Questao 3", false)]);
        assert_eq!(pages_with_images(&bytes), BTreeSet::from([2]));
    }

    #[test]
    fn test_no_images_without_xobjects() {
        let bytes = make_test_pdf(&[("Questao 1", false)]);
        assert!(pages_with_images(&bytes).is_empty());
        assert!(pages_with_images(b"not a pdf").is_empty());
    }

    #[test]
    fn test_extracted_text_carries_placeholder() {
        let bytes = make_test_pdf(&[("Questao 1 Observe o grafico", true)]);
        let text = extract_pdf_text(&bytes).unwrap();

        assert!(text.contains("Questao 1"));
        assert!(text.lines().any(|line| line == IMAGE_PLACEHOLDER));
    }

    #[test]
    fn test_placeholder_follows_each_marker_on_image_page() {
        let pages = vec![
            "Questão 1\nSem figura.\na) x".to_string(),
            "continua\nQuestão 2\nObserve o gráfico.\nQuestão 3\nVeja a tabela.".to_string(),
        ];
        let text = assemble_pages(&pages, &BTreeSet::from([2]));

        assert_eq!(
            text,
            "Questão 1\nSem figura.\na) x\n[imagem]\ncontinua\nQuestão 2\n[imagem]\n\
             Observe o gráfico.\nQuestão 3\n[imagem]\nVeja a tabela.\n"
        );
    }

    #[test]
    fn test_pages_without_images_are_untouched() {
        let pages = vec!["Questão 1\u{c}a) x".to_string()];
        assert_eq!(assemble_pages(&pages, &BTreeSet::new()), "Questão 1\na) x\n");
    }
}
