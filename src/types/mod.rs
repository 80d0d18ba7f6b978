use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= API Request/Response Types =============

/// Body of `POST /api/chat`.
///
/// Parsing is forgiving the way the site widget expects: `messages` may be
/// missing or `null`, and entries that are not objects are skipped.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Conversation so far, oldest first.
    #[serde(default, deserialize_with = "lenient_messages")]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
}

/// One turn of a conversation as sent by the site widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    #[serde(default)]
    #[schema(value_type = String, example = "user")]
    pub role: MessageRole,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub content: String,
}

impl ChatMessage {
    /// Convenience constructor for a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Convenience constructor for an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Read one conversation entry. Non-objects yield `None`; a role or
    /// content that is missing or not a string reads as unknown or empty.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let entry = value.as_object()?;
        let role = entry
            .get("role")
            .and_then(serde_json::Value::as_str)
            .map(MessageRole::parse)
            .unwrap_or_default();
        let content = entry
            .get("content")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();

        Some(Self { role, content })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    /// Any role string the widget sends that we don't know about.
    #[serde(other)]
    #[default]
    Other,
}

impl MessageRole {
    pub fn parse(role: &str) -> Self {
        match role {
            "system" => MessageRole::System,
            "user" => MessageRole::User,
            "assistant" => MessageRole::Assistant,
            _ => MessageRole::Other,
        }
    }
}

fn lenient_messages<'de, D>(deserializer: D) -> std::result::Result<Vec<ChatMessage>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let entries = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .iter()
        .filter_map(ChatMessage::from_value)
        .collect())
}

fn text_or_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /api/contact`.
///
/// Every field defaults to empty so that a missing field surfaces as a
/// validation error rather than a malformed-payload error.
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub message: String,
}

/// Error body shared by every endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The generic rejection used for payloads that can't be parsed.
    pub fn bad_request() -> Self {
        AppError::BadRequest("Bad request".to_string())
    }

    /// Map a body rejection's status onto the public error shape.
    ///
    /// A body over the configured limit stays a 413; every other parse
    /// failure is the generic 400.
    pub fn from_rejection_status(status: axum::http::StatusCode) -> Self {
        if status == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Request body is too large".to_string())
        } else {
            AppError::bad_request()
        }
    }

    pub fn status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            AppError::BadRequest(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Configuration(_) | AppError::Mail(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest(msg)
            | AppError::InvalidInput(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Configuration(msg)
            | AppError::Mail(msg)
            | AppError::Internal(msg) => msg,
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::from_rejection_status(rejection.status())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
