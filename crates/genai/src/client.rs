use anyhow::{Context, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionNamedToolChoice, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionToolArgs,
        ChatCompletionToolChoiceOption, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        FunctionName, FunctionObject, FunctionObjectArgs,
    },
    Client as OpenAIClient,
};
use async_trait::async_trait;
use predictpal_core::config::{AppConfig, GenAiConfig};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

use crate::invoker::{GenerationRequest, TextGenerator};
use crate::schema::Schema;

pub const STRUCTURED_OUTPUT_SYSTEM_PROMPT: &str = "You are the analysis assistant behind PredictPal, a sports prediction service. \
Always answer by calling the provided function exactly once. \
Fill every parameter with plain text; do not leave any field empty.";

/// OpenAI-compatible chat completion client. Built once at startup and
/// shared by reference with every flow.
#[derive(Debug, Clone)]
pub struct GenAiClient {
    client: OpenAIClient<OpenAIConfig>,
    config: GenAiConfig,
}

impl GenAiClient {
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let genai = config.require_genai_config()?.clone();
        Self::new(genai)
    }

    pub fn new(config: GenAiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .context("failed to build HTTP client for generative service")?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.clone())
            .with_api_base(config.endpoint.trim_end_matches('/').to_string());

        Ok(Self {
            client: OpenAIClient::with_config(openai_config).with_http_client(http_client),
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl TextGenerator for GenAiClient {
    #[instrument(skip(self, request), fields(model = %self.config.model, flow = request.flow))]
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<Option<String>> {
        let tool_name = structured_output_tool_name(request.output);
        let tool = build_function_object(
            &tool_name,
            Some(&format!(
                "Return the {} result. Every parameter is required.",
                request.flow
            )),
            Some(request.output.to_json_schema()),
        )?;

        let system_message = ChatCompletionRequestSystemMessageArgs::default()
            .content(STRUCTURED_OUTPUT_SYSTEM_PROMPT)
            .build()
            .context("failed to build system message")?;

        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt)
            .build()
            .context("failed to build user message")?;

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(self.config.model.clone())
            .messages([system_message.into(), user_message.into()])
            .tools(build_chat_tools(&[tool])?)
            .tool_choice(ChatCompletionToolChoiceOption::Named(
                ChatCompletionNamedToolChoice {
                    r#type: ChatCompletionToolType::Function,
                    function: FunctionName {
                        name: tool_name.clone(),
                    },
                },
            ))
            .build()
            .context("failed to build chat completion request")?;

        info!(
            prompt_chars = request.prompt.chars().count(),
            prompt = %truncate_for_log(request.prompt, 240),
            "Sending chat completion request"
        );

        let started = Instant::now();
        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .context("chat completion request failed")?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            choices = response.choices.len(),
            "Received chat completion response"
        );

        let Some(choice) = response.choices.into_iter().next() else {
            warn!("chat completion returned no choices");
            return Ok(None);
        };

        let arguments = choice.message.tool_calls.as_ref().and_then(|calls| {
            calls
                .iter()
                .find(|call| call.function.name == tool_name)
                .map(|call| call.function.arguments.clone())
        });

        if arguments.is_none() && choice.message.content.is_some() {
            warn!(tool = %tool_name, "model answered without calling the output tool");
        }

        Ok(arguments.or(choice.message.content))
    }
}

/// Name of the pseudo-function whose arguments carry the structured reply.
pub fn structured_output_tool_name(schema: &Schema) -> String {
    let sanitized: String = schema
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("emit_{sanitized}")
}

fn build_function_object(
    name: &str,
    description: Option<&str>,
    parameters: Option<Value>,
) -> Result<FunctionObject> {
    let mut builder = FunctionObjectArgs::default();
    builder.name(name.to_string());
    if let Some(desc) = description {
        builder.description(desc.to_string());
    }
    if let Some(schema) = parameters {
        builder.parameters(Some(schema));
    }
    builder.build().context("failed to build function description")
}

fn build_chat_tools(tools: &[FunctionObject]) -> Result<Vec<ChatCompletionTool>> {
    tools
        .iter()
        .map(|tool| {
            ChatCompletionToolArgs::default()
                .function(tool.clone())
                .build()
                .context("failed to build tool description")
        })
        .collect()
}

pub(crate) fn truncate_for_log(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    text.chars().take(max_chars).collect::<String>() + "…"
}
