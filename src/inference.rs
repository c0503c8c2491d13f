//! Structured inference over an OpenAI-compatible chat-completions API.
//!
//! [`InferenceClient`] sends a system persona, a text prompt and a frame
//! (as a `data:` URI) to the model, constrains the reply with a JSON Schema
//! taken from a [`StructuredOutput`] type, and decodes and validates the
//! answer. The HTTP exchange sits behind [`Transport`] so it can be replaced;
//! [`HttpTransport`] is the blocking `reqwest` implementation.
//!
//! One request is made per call. There is no retry and no streaming, and the
//! timeout is whatever the transport uses by default.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::AnalysisOptions,
    conversion::data_uri,
    credential::Credential,
    error::InferenceError,
    frame::JPEG_MIME_TYPE,
    schema::StructuredOutput,
};

// =============================================================================
// Wire types
// =============================================================================

/// Body of a chat-completions request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier.
    pub model: String,
    /// System and user messages, in order.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Structured-output constraint.
    pub response_format: ResponseFormat,
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: Role,
    /// Plain text or a list of content parts.
    pub content: MessageContent,
}

/// Message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instruction-setting message.
    System,
    /// Operator message.
    User,
}

/// Message body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// A single text string.
    Text(String),
    /// Mixed text and image parts.
    Parts(Vec<ContentPart>),
}

/// One part of a multimodal message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text part.
    Text {
        /// The text.
        text: String,
    },
    /// Image referenced by URL (here always a `data:` URI).
    ImageUrl {
        /// The image reference.
        image_url: ImageUrl,
    },
}

/// Image reference inside a [`ContentPart::ImageUrl`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    /// `data:image/jpeg;base64,...` or a remote URL.
    pub url: String,
}

/// `response_format` block requesting schema-conforming JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    /// Always `json_schema`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The schema constraint.
    pub json_schema: JsonSchemaFormat,
}

/// Named JSON Schema sent with the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchemaFormat {
    /// Schema name.
    pub name: String,
    /// The schema document.
    pub schema: Value,
    /// Ask the service to follow the schema exactly.
    pub strict: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Pull the message out of an error body.
///
/// Handles `{"error": {...}}` and the `[{"error": {...}}]` form some Google
/// endpoints return; anything else is passed through as-is.
fn api_error_message(body: &str) -> String {
    let detail = serde_json::from_str::<ApiError>(body)
        .map(|error| error.error)
        .or_else(|_| {
            serde_json::from_str::<Vec<ApiError>>(body).map(|mut errors| {
                if errors.is_empty() {
                    ApiErrorDetail {
                        message: body.to_string(),
                        status: None,
                    }
                } else {
                    errors.swap_remove(0).error
                }
            })
        });

    match detail {
        Ok(ApiErrorDetail {
            message,
            status: Some(status),
        }) => format!("{message} (status={status})"),
        Ok(ApiErrorDetail { message, .. }) => message,
        Err(_) => body.trim().to_string(),
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Carries a request to the model service and returns the raw response body.
///
/// Implementations must turn any transport failure or non-success status
/// into an [`InferenceError`].
pub trait Transport {
    /// Send `request` authorized by `credential`.
    fn complete(
        &self,
        credential: &Credential,
        request: &ChatCompletionRequest,
    ) -> Result<String, InferenceError>;
}

impl<F> Transport for F
where
    F: Fn(&Credential, &ChatCompletionRequest) -> Result<String, InferenceError>,
{
    fn complete(
        &self,
        credential: &Credential,
        request: &ChatCompletionRequest,
    ) -> Result<String, InferenceError> {
        self(credential, request)
    }
}

/// Blocking HTTPS transport with bearer-token authorization.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] if the HTTP client cannot be built (for
    /// example when the TLS backend fails to initialise).
    pub fn new(endpoint: impl Into<String>) -> Result<Self, InferenceError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| {
                InferenceError::new(format!("Failed to create HTTP client: {error}"))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn complete(
        &self,
        credential: &Credential,
        request: &ChatCompletionRequest,
    ) -> Result<String, InferenceError> {
        log::debug!("POST {} (model={})", self.endpoint, request.model);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .json(request)
            .send()
            .map_err(|error| InferenceError::new(format!("Request failed: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|error| InferenceError::new(format!("Failed to read response: {error}")))?;

        log::debug!("Response status {status}, {} byte body", body.len());

        if !status.is_success() {
            return Err(InferenceError::new(format!(
                "API error ({status}): {}",
                api_error_message(&body)
            )));
        }

        Ok(body)
    }
}

// =============================================================================
// Client
// =============================================================================

/// Client for schema-constrained model calls.
///
/// # Example
///
/// ```no_run
/// use framesight::{AnalysisOptions, AnalysisResult, Credential, InferenceClient};
///
/// let client = InferenceClient::new(Credential::new("key"), AnalysisOptions::new())?;
/// let payload = framesight::extract_frame("videos/sample.mp4").unwrap();
/// let result: AnalysisResult = client.invoke(framesight::ANALYSIS_PROMPT, &payload)?;
/// println!("{}", result.title);
/// # Ok::<(), framesight::InferenceError>(())
/// ```
#[derive(Debug)]
pub struct InferenceClient<T = HttpTransport> {
    credential: Credential,
    options: AnalysisOptions,
    transport: T,
}

impl InferenceClient<HttpTransport> {
    /// Create a client that talks to `options.base_url` over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] if the HTTP client cannot be built.
    pub fn new(credential: Credential, options: AnalysisOptions) -> Result<Self, InferenceError> {
        let transport = HttpTransport::new(options.completions_url())?;
        Ok(Self::with_transport(credential, options, transport))
    }
}

impl<T: Transport> InferenceClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(credential: Credential, options: AnalysisOptions, transport: T) -> Self {
        Self {
            credential,
            options,
            transport,
        }
    }

    /// Options the client was built with.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Build the request for `prompt` and a base64 JPEG payload.
    pub fn build_request<S: StructuredOutput>(
        &self,
        prompt: &str,
        image_base64: &str,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.options.model.clone(),
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: MessageContent::Text(self.options.system_prompt.clone()),
                },
                ChatMessage {
                    role: Role::User,
                    content: MessageContent::Parts(vec![
                        ContentPart::Text {
                            text: prompt.to_string(),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: data_uri(JPEG_MIME_TYPE, image_base64),
                            },
                        },
                    ]),
                },
            ],
            temperature: self.options.temperature,
            response_format: ResponseFormat {
                kind: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: S::SCHEMA_NAME.to_string(),
                    schema: S::json_schema(),
                    strict: true,
                },
            },
        }
    }

    /// Ask the model to describe the image and return a validated `S`.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] for transport failures, error statuses,
    /// refusals, bodies that do not decode to `S`, and decoded values that
    /// fail [`StructuredOutput::validate`].
    pub fn invoke<S: StructuredOutput>(
        &self,
        prompt: &str,
        image_base64: &str,
    ) -> Result<S, InferenceError> {
        let request = self.build_request::<S>(prompt, image_base64);

        log::info!(
            "Invoking model {} (schema={}, image payload {} bytes)",
            request.model,
            S::SCHEMA_NAME,
            image_base64.len()
        );

        let body = self.transport.complete(&self.credential, &request)?;
        let output = parse_structured_response::<S>(&body)?;

        log::info!("Model response accepted");
        Ok(output)
    }
}

/// Decode a chat-completions body into a validated `S`.
fn parse_structured_response<S: StructuredOutput>(body: &str) -> Result<S, InferenceError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| InferenceError::new("No choices returned from model"))?;

    if let Some(refusal) = choice.message.refusal {
        return Err(InferenceError::new(format!("Model refused: {refusal}")));
    }

    let content = choice
        .message
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| match choice.finish_reason.as_deref() {
            Some(reason) => InferenceError::new(format!("Empty response (finish_reason={reason})")),
            None => InferenceError::new("Empty response"),
        })?;

    let output: S = serde_json::from_str(strip_code_fence(&content))?;
    output.validate()?;
    Ok(output)
}

/// Remove a surrounding Markdown code fence, which some models add even in
/// JSON mode.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Invoke the default HTTPS client once.
///
/// Shorthand for [`InferenceClient::new`] with default [`AnalysisOptions`]
/// followed by [`InferenceClient::invoke`].
///
/// # Errors
///
/// See [`InferenceClient::invoke`].
pub fn invoke<S: StructuredOutput>(
    credential: &Credential,
    prompt: &str,
    image_base64: &str,
) -> Result<S, InferenceError> {
    InferenceClient::new(credential.clone(), AnalysisOptions::default())?
        .invoke(prompt, image_base64)
}
