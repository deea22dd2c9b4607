//! HTTP front ends for the two apps
//!
//! Each app gets its own axum [`Router`](axum::Router); they are served on
//! separate addresses and share only the rendering helpers and the error
//! response defined here.

pub mod board;
pub mod chat;
pub mod html;

use crate::error::{error_kind, ChatboardError};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

/// HTTP status for an application error
pub fn status_for(err: &anyhow::Error) -> StatusCode {
    match error_kind(err) {
        Some(ChatboardError::Validation(_)) => StatusCode::BAD_REQUEST,
        Some(ChatboardError::NotFound(_)) => StatusCode::NOT_FOUND,
        Some(
            ChatboardError::Authentication(_)
            | ChatboardError::Network(_)
            | ChatboardError::Provider(_),
        ) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Text shown to the user for an application error
///
/// Client-facing errors expose their message; everything else gets a
/// generic line so paths and SQL never reach the page.
pub fn user_message(err: &anyhow::Error) -> String {
    match error_kind(err) {
        Some(ChatboardError::Validation(m)) => m.clone(),
        Some(ChatboardError::NotFound(m)) => format!("{} was not found.", m),
        Some(ChatboardError::Authentication(_)) => {
            "The API key was rejected by the model service.".to_string()
        }
        Some(ChatboardError::Network(_)) => {
            "The model service could not be reached. Please try again.".to_string()
        }
        Some(ChatboardError::Provider(_)) => {
            "The model service returned an error. Please try again.".to_string()
        }
        _ => "Internal server error.".to_string(),
    }
}

/// Error returned by handlers, rendered as an HTML error page
#[derive(Debug)]
pub struct WebError(anyhow::Error);

impl From<anyhow::Error> for WebError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl From<ChatboardError> for WebError {
    fn from(err: ChatboardError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(error = ?self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, "request rejected");
        }

        let body = format!(
            "<h1>{}</h1>\n{}\n<p><a href=\"/\">Back</a></p>",
            status.as_u16(),
            html::banner("error", &user_message(&self.0))
        );
        (status, Html(html::page("Error", &body))).into_response()
    }
}
