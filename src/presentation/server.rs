//! 网页上传服务
//!
//! - `GET /`：上传页
//! - `POST /analyze`：接收 multipart 表单，返回报告页
//! - `GET /health`：存活检查

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tracing::{info, warn};

use crate::models::Document;
use crate::presentation::html;
use crate::workflow::{ReviewFlow, ReviewOptions};

/// 上传大小上限（含 multipart 开销）
const MAX_UPLOAD_BYTES: usize = 55 * 1024 * 1024;

const MSG_NO_FILE: &str = "Nenhum arquivo enviado.";
const MSG_READ_FAILED: &str = "Falha ao ler os dados do arquivo.";

/// 服务状态：所有请求共享同一个分析流程
pub struct ServerState {
    pub flow: ReviewFlow,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(serve_upload_page))
        .route("/analyze", post(handle_analyze))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// 启动服务并阻塞直到收到 Ctrl+C
pub async fn serve(addr: &str, state: Arc<ServerState>) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("无效的监听地址: {}", addr))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法绑定地址: {}", addr))?;

    info!("🌐 服务已启动: http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务运行失败")?;

    info!("👋 服务已关闭");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("无法监听 Ctrl+C 信号: {}", e);
    }
}

async fn serve_upload_page() -> Html<String> {
    Html(html::upload_page())
}

async fn health() -> &'static str {
    "ok"
}

async fn handle_analyze(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Response {
    let mut options = ReviewOptions::default();
    let mut upload: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("⚠️ multipart 请求解析失败: {}", e);
                return error_response(StatusCode::BAD_REQUEST, MSG_READ_FAILED);
            }
        };
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                match field.bytes().await {
                    Ok(bytes) => upload = Some((file_name, bytes.to_vec())),
                    Err(e) => {
                        warn!("⚠️ 读取上传内容失败: {}", e);
                        return error_response(StatusCode::BAD_REQUEST, MSG_READ_FAILED);
                    }
                }
            }
            "grammar" => options.grammar = checkbox(field.text().await.ok()),
            "llm" => options.llm = checkbox(field.text().await.ok()),
            "show_text" => options.show_text = checkbox(field.text().await.ok()),
            _ => {}
        }
    }

    let Some((file_name, bytes)) = upload.filter(|(name, _)| !name.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, MSG_NO_FILE);
    };

    let document = match Document::new(file_name.clone(), bytes) {
        Ok(document) => document,
        Err(e) => {
            warn!("⚠️ 拒绝上传 {}: {}", file_name, e);
            return error_response(StatusCode::BAD_REQUEST, e.user_message());
        }
    };

    match state.flow.run(document, options).await {
        Ok(report) => Html(html::report_page(&report, &file_name)).into_response(),
        Err(e) => {
            warn!("❌ 分析失败 {}: {}", file_name, e);
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.user_message())
        }
    }
}

/// 复选框：浏览器只在勾选时提交字段
fn checkbox(value: Option<String>) -> bool {
    match value {
        Some(v) => !matches!(v.trim().to_lowercase().as_str(), "" | "off" | "false" | "0"),
        None => false,
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Html(html::error_page(message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RubricConfig;
    use crate::error::ReviewerError;
    use crate::services::StatementReviewer;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::io::{Cursor, Write};
    use tower::ServiceExt;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const BOUNDARY: &str = "exam-review-boundary";

    struct NoGrammar;

    #[async_trait]
    impl StatementReviewer for NoGrammar {
        async fn review(&self, _statement: &str) -> Result<Vec<String>, ReviewerError> {
            Ok(Vec::new())
        }
    }

    fn test_state() -> Arc<ServerState> {
        Arc::new(ServerState {
            flow: ReviewFlow::with_reviewers(RubricConfig::default(), Box::new(NoGrammar), None),
        })
    }

    fn docx_with_questions(n: usize) -> Vec<u8> {
        let mut body = String::new();
        for i in 1..=n {
            for line in [
                format!("Questão {}", i),
                format!("Considere a situação descrita no caso {}.", i),
                "a) um".to_string(),
                "b) dois".to_string(),
                "c) três".to_string(),
                "d) quatro".to_string(),
                "e) cinco".to_string(),
            ] {
                body.push_str(&format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", line));
            }
        }
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{}</w:body></w:document>",
            body
        );

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn multipart_request(file_name: &str, content: &[u8], checked: &[&str]) -> Request<Body> {
        let mut body = Vec::new();
        for name in checked {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\non\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_checkbox_values() {
        assert!(checkbox(Some("on".to_string())));
        assert!(checkbox(Some("true".to_string())));
        assert!(!checkbox(Some("off".to_string())));
        assert!(!checkbox(None));
    }

    #[tokio::test]
    async fn test_upload_page() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = router(test_state()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("action=\"/analyze\""));
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router(test_state()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_unsupported_format_rejected() {
        let req = multipart_request("prova.txt", "Questão 1".as_bytes(), &[]);
        let response = router(test_state()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response)
            .await
            .contains("Formato de arquivo inválido. Use PDF ou DOCX."));
    }

    #[tokio::test]
    async fn test_malformed_multipart_body_rejected() {
        let req = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from("sem delimitador nenhum"))
            .unwrap();
        let response = router(test_state()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains(MSG_READ_FAILED));
        assert!(!html.contains(MSG_NO_FILE));
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"grammar\"\r\n\r\non\r\n--{BOUNDARY}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = router(test_state()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains(MSG_NO_FILE));
    }

    #[tokio::test]
    async fn test_corrupt_docx_is_unprocessable() {
        let req = multipart_request("prova.docx", b"not a zip", &[]);
        let response = router(test_state()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response)
            .await
            .contains("Erro ao processar o arquivo. Verifique o formato."));
    }

    #[tokio::test]
    async fn test_docx_upload_approved_with_text() {
        let req = multipart_request("prova.docx", &docx_with_questions(15), &["show_text"]);
        let response = router(test_state()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("class=\"status approved\">Aprovado"));
        assert!(html.contains("Questões identificadas: 15"));
        assert!(html.contains("<summary>Texto extraído</summary>"));
    }

    #[tokio::test]
    async fn test_docx_upload_too_few_questions() {
        let req = multipart_request("prova.docx", &docx_with_questions(3), &[]);
        let response = router(test_state()).oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Revisar"));
        assert!(html.contains("Número de questões inválido (3)."));
    }
}
