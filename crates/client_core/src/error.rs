use shared::{
    error::FieldErrors,
    protocol::{ChatErrorEnvelope, MessageBody},
};
use thiserror::Error;

/// Failure of a single backend call.
///
/// Non-2xx responses keep the raw body; each caller decides how to read it
/// because the endpoints disagree on their error shapes.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),
    #[error("server responded with status {status}")]
    Status { status: u16, body: Vec<u8> },
    #[error("failed to encode request: {0}")]
    Encode(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn body(&self) -> Option<&[u8]> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Field-keyed rejection body, e.g. `{"price": "must be positive"}`.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        self.body().and_then(FieldErrors::from_json_bytes)
    }

    /// The body decoded as text, lossy, trimmed, `None` when blank.
    pub fn body_text(&self) -> Option<String> {
        let text = String::from_utf8_lossy(self.body()?).trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    /// `message` member of a JSON body, else the body text.
    pub fn server_message(&self) -> Option<String> {
        let body = self.body()?;
        match serde_json::from_slice::<MessageBody>(body) {
            Ok(parsed) if !parsed.message.trim().is_empty() => Some(parsed.message),
            _ => self.body_text(),
        }
    }

    /// `error.message` of the chat endpoint's error envelope.
    pub fn chat_error_message(&self) -> Option<String> {
        serde_json::from_slice::<ChatErrorEnvelope>(self.body()?)
            .ok()
            .and_then(|envelope| envelope.error)
            .and_then(|detail| detail.message)
            .filter(|message| !message.trim().is_empty())
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("base url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("failed to read settings file '{path}': {source}")]
    SettingsRead {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    SettingsParse {
        path: String,
        source: toml::de::Error,
    },
    #[error("failed to build http client: {0}")]
    HttpClientBuild(String),
}
