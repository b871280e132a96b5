use crate::models::{Report, ReviewStatus};

const GREEN: &str = "\x1b[32;1m";
const RED: &str = "\x1b[31;1m";
const RESET: &str = "\x1b[0m";

pub const NO_FINDINGS: &str = "Nenhuma sugestão de revisão.";

/// 终端报告
///
/// `color` 为真时用 ANSI 颜色强调结论
pub fn render_text(report: &Report, file_name: &str, color: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", "=".repeat(60)));
    out.push_str(&format!("Revisão de Provas - {}\n", file_name));
    out.push_str(&format!(
        "Gerado em {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("{}\n", "=".repeat(60)));

    let label = report.status.label();
    if color {
        let paint = match report.status {
            ReviewStatus::Approved => GREEN,
            ReviewStatus::NeedsReview => RED,
        };
        out.push_str(&format!("Status: {}{}{}\n", paint, label, RESET));
    } else {
        out.push_str(&format!("Status: {}\n", label));
    }
    out.push_str(&format!("Questões identificadas: {}\n", report.question_count));

    out.push_str("\nSugestões de revisão:\n");
    if report.findings.is_empty() {
        out.push_str(&format!("  - {}\n", NO_FINDINGS));
    } else {
        for finding in &report.findings {
            out.push_str(&format!("  - {}\n", finding));
        }
    }

    if !report.advisories.is_empty() {
        out.push_str("\nAvisos (não alteram o status):\n");
        for advisory in &report.advisories {
            out.push_str(&format!("  - {}\n", advisory));
        }
    }

    if let Some(review) = &report.llm_review {
        out.push_str("\nRevisão do modelo de linguagem:\n");
        for line in review.lines() {
            out.push_str(&format!("  {}\n", line));
        }
    }

    if let Some(raw) = &report.raw_text {
        out.push_str(&format!("\n{}\nTexto extraído:\n{}\n", "─".repeat(60), "─".repeat(60)));
        out.push_str(raw);
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Finding;

    #[test]
    fn test_empty_findings_placeholder() {
        let report = Report::from_findings(15, Vec::new());
        let text = render_text(&report, "prova.pdf", false);
        assert!(text.contains("Status: Aprovado"));
        assert!(text.contains(NO_FINDINGS));
        assert!(!text.contains("Avisos"));
    }

    #[test]
    fn test_findings_in_order_with_color() {
        let report = Report::from_findings(
            14,
            vec![
                Finding::exam("Número de questões inválido (14). Deve ter entre 15 e 20 questões."),
                Finding::question(2, "Contém alternativas repetidas ou idênticas: \"x\"."),
            ],
        );
        let text = render_text(&report, "prova.pdf", true);
        assert!(text.contains(&format!("{}Revisar{}", RED, RESET)));

        let first = text.find("Número de questões").unwrap();
        let second = text.find("Questão 2: Contém").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_raw_text_section() {
        let mut report = Report::from_findings(0, Vec::new());
        report.raw_text = Some("Questão 1\na) um".to_string());
        let text = render_text(&report, "prova.docx", false);
        assert!(text.ends_with("Questão 1\na) um\n"));
    }
}
