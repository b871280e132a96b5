//! 网页渲染
//!
//! 上传页和报告页都是纯字符串拼接，不引入模板引擎

use crate::models::{Report, ReviewStatus};
use crate::presentation::text::NO_FINDINGS;

const STYLE: &str = r#"<style>
body { font-family: sans-serif; max-width: 760px; margin: 2em auto; color: #222; }
h1 { font-size: 1.5em; }
.status { padding: 0.6em 1em; border-radius: 6px; font-weight: bold; color: #fff; }
.approved { background: #2e7d32; }
.needs-review { background: #c62828; }
.alert { padding: 0.6em 1em; border-radius: 6px; background: #fdecea; color: #611a15; }
ul { padding-left: 1.2em; }
pre { white-space: pre-wrap; background: #f5f5f5; padding: 1em; }
</style>"#;

/// 上传页
pub fn upload_page() -> String {
    page(
        "Revisão de Provas",
        r#"<h1>Revisão de Provas</h1>
<p>Envie uma prova em PDF ou DOCX para verificar os critérios de avaliação.</p>
<form action="/analyze" method="post" enctype="multipart/form-data">
  <p><input type="file" name="file" accept=".pdf,.docx" required></p>
  <p><label><input type="checkbox" name="grammar" value="on"> Verificar gramática</label></p>
  <p><label><input type="checkbox" name="llm" value="on"> Revisão por modelo de linguagem</label></p>
  <p><label><input type="checkbox" name="show_text" value="on"> Mostrar texto extraído</label></p>
  <p><button type="submit">Analisar</button></p>
</form>"#,
    )
}

/// 报告页
pub fn report_page(report: &Report, file_name: &str) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        "<h1>Resultado: {}</h1>\n",
        escape_html(file_name)
    ));

    let class = match report.status {
        ReviewStatus::Approved => "approved",
        ReviewStatus::NeedsReview => "needs-review",
    };
    body.push_str(&format!(
        "<p class=\"status {}\">{}</p>\n",
        class,
        report.status.label()
    ));
    body.push_str(&format!(
        "<p>Questões identificadas: {}</p>\n",
        report.question_count
    ));

    body.push_str("<h2>Sugestões de revisão</h2>\n");
    if report.findings.is_empty() {
        body.push_str(&format!("<p>{}</p>\n", NO_FINDINGS));
    } else {
        body.push_str(&list(report.findings.iter().map(|f| f.to_string())));
    }

    if !report.advisories.is_empty() {
        body.push_str("<h2>Avisos</h2>\n");
        body.push_str(&list(report.advisories.iter().map(|f| f.to_string())));
    }

    if let Some(review) = &report.llm_review {
        body.push_str("<h2>Revisão do modelo de linguagem</h2>\n");
        body.push_str(&format!("<pre>{}</pre>\n", escape_html(review)));
    }

    if let Some(raw) = &report.raw_text {
        body.push_str(&format!(
            "<details><summary>Texto extraído</summary><pre>{}</pre></details>\n",
            escape_html(raw)
        ));
    }

    body.push_str("<p><a href=\"/\">Analisar outra prova</a></p>");
    page("Resultado da revisão", &body)
}

/// 错误页，消息面向最终用户
pub fn error_page(message: &str) -> String {
    page(
        "Erro",
        &format!(
            "<h1>Revisão de Provas</h1>\n<p class=\"alert\">{}</p>\n<p><a href=\"/\">Voltar</a></p>",
            escape_html(message)
        ),
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{}\n</head>\n<body>\n{}\n</body>\n</html>\n",
        title, STYLE, body
    )
}

fn list(items: impl Iterator<Item = String>) -> String {
    let mut out = String::from("<ul>\n");
    for item in items {
        out.push_str(&format!("  <li>{}</li>\n", escape_html(&item)));
    }
    out.push_str("</ul>\n");
    out
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
