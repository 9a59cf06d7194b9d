use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedClientError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Server responded {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Token file error: {0}")]
    TokenFile(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl FeedClientError {
    /// Turns a non-success response into an error, reading the
    /// `{message, statusCode}` envelope when the server sent one.
    pub async fn from_http_response(resp: reqwest::Response) -> Self {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return FeedClientError::Unauthorized;
        }

        let message = match resp.text().await {
            Ok(text) => serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text),
            Err(err) => err.to_string(),
        };

        FeedClientError::Api { status, message }
    }
}
