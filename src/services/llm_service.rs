//! LLM 服务 - 业务能力层
//!
//! 只负责"LLM 整体审阅"能力，不参与确定性评分
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::{Config, ContextThreshold, RubricConfig};
use crate::error::ReviewerError;
use crate::services::reviewer::ExamReviewer;

const SYSTEM_MESSAGE: &str = "Você é um revisor pedagógico experiente. \
    Avalie provas de múltipla escolha de acordo com os critérios informados \
    e responda em português, de forma objetiva.";

/// LLM 服务
///
/// 职责：
/// - 把评分规则和整份试卷文本发送给 LLM
/// - 原样返回 LLM 的回复，不做解析
/// - 不影响确定性评分的结论
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    rubric: RubricConfig,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config, rubric: RubricConfig) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            rubric,
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, ReviewerError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| self.call_failed(e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| self.call_failed(e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(2048u32)
            .build()
            .map_err(|e| self.call_failed(e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            self.call_failed(e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| ReviewerError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }

    /// 构建审阅提示词：评分规则 + 整份试卷
    pub fn build_review_message(&self, exam_text: &str) -> String {
        format!(
            "{}\n\nPara cada problema encontrado, indique o número da questão e sugira uma correção. \
             Verifique também gramática e ortografia dos enunciados.\n\n\
             === PROVA ===\n{}\n=== FIM DA PROVA ===",
            rubric_instructions(&self.rubric),
            exam_text.trim()
        )
    }

    fn call_failed(&self, e: impl std::fmt::Display) -> ReviewerError {
        ReviewerError::LlmCallFailed {
            model: self.model_name.clone(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl ExamReviewer for LlmService {
    async fn review_exam(&self, exam_text: &str) -> Result<String, ReviewerError> {
        let user_message = self.build_review_message(exam_text);
        self.send_to_llm(&user_message, Some(SYSTEM_MESSAGE)).await
    }
}

/// 用自然语言描述评分规则
pub fn rubric_instructions(rubric: &RubricConfig) -> String {
    let context_rule = match rubric.context_threshold {
        ContextThreshold::Words(n) => format!("pelo menos {} palavras", n),
        ContextThreshold::Chars(n) => format!("pelo menos {} caracteres", n),
    };

    format!(
        "Analise a prova abaixo segundo os critérios:\n\
         1. A prova deve ter entre {} e {} questões.\n\
         2. Cada questão deve ter exatamente {} alternativas (a–e).\n\
         3. Não pode haver alternativas repetidas ou idênticas na mesma questão.\n\
         4. O enunciado deve ser contextualizado (situação, caso, cenário, exemplo) ou ter {}.\n\
         5. Se o enunciado menciona gráfico, imagem, figura, tabela ou diagrama, o recurso deve estar presente.",
        rubric.min_questions,
        rubric.max_questions,
        rubric.alternatives_per_question,
        context_rule
    )
}
