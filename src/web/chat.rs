//! Chat page
//!
//! `GET /` renders the conversation of the caller's session, `POST /` sends
//! a message and re-renders, `POST /reset` ends the session. The session is
//! tracked with a cookie holding its id.

use crate::chat::{ChatApp, StartupFailure};
use crate::config::ChatConfig;
use crate::providers::{Message, Role};
use crate::web::html::{banner, escape, markdown, page};
use crate::web::{status_for, user_message, WebError};

use axum::extract::{Form, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "chatboard_session";

struct ChatPageState {
    app: ChatApp,
    title: String,
    description: String,
}

/// Submitted chat input
#[derive(Debug, Deserialize)]
pub struct MessageForm {
    #[serde(default)]
    message: String,
}

/// Build the chat app router
pub fn router(app: ChatApp, config: &ChatConfig) -> Router {
    let state = Arc::new(ChatPageState {
        app,
        title: config.title.clone(),
        description: config.description.clone(),
    });

    Router::new()
        .route("/", get(show_chat).post(send_message))
        .route("/reset", post(reset_session))
        .with_state(state)
}

async fn show_chat(
    State(state): State<Arc<ChatPageState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let service = match &state.app {
        ChatApp::Ready(service) => service,
        ChatApp::Unavailable(failure) => return Ok(startup_error(&state, *failure)),
    };

    let cookie = session_cookie(&headers);
    let (session, created) = service.sessions().get_or_create(cookie.as_deref())?;
    let session = session.lock().await;

    let body = render_chat(&state, session.history(), None);
    let response = Html(page(&state.title, &body)).into_response();
    Ok(if created {
        with_session_cookie(response, session.id())
    } else {
        response
    })
}

async fn send_message(
    State(state): State<Arc<ChatPageState>>,
    headers: HeaderMap,
    Form(form): Form<MessageForm>,
) -> Result<Response, WebError> {
    let service = match &state.app {
        ChatApp::Ready(service) => service,
        ChatApp::Unavailable(failure) => return Ok(startup_error(&state, *failure)),
    };

    let cookie = session_cookie(&headers);
    let (session, created) = service.sessions().get_or_create(cookie.as_deref())?;
    let mut session = session.lock().await;

    let (status, error) = if form.message.trim().is_empty() {
        (StatusCode::OK, None)
    } else {
        match session.send(&form.message).await {
            Ok(_) => (StatusCode::OK, None),
            Err(e) => (status_for(&e), Some(user_message(&e))),
        }
    };

    let body = render_chat(&state, session.history(), error.as_deref());
    let response = (status, Html(page(&state.title, &body))).into_response();
    Ok(if created {
        with_session_cookie(response, session.id())
    } else {
        response
    })
}

async fn reset_session(State(state): State<Arc<ChatPageState>>, headers: HeaderMap) -> Response {
    if let (Some(service), Some(id)) = (state.app.service(), session_cookie(&headers)) {
        service.sessions().end(&id);
    }

    let mut response = Redirect::to("/").into_response();
    let expired = format!("{}=; Path=/; Max-Age=0", SESSION_COOKIE);
    if let Ok(value) = HeaderValue::from_str(&expired) {
        response.headers_mut().insert(SET_COOKIE, value);
    }
    response
}

fn startup_error(state: &ChatPageState, failure: StartupFailure) -> Response {
    let body = format!(
        "<h1>{}</h1>\n{}",
        escape(&state.title),
        banner("error", failure.user_message())
    );
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Html(page(&state.title, &body)),
    )
        .into_response()
}

/// Extract the session id from the request cookies
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn with_session_cookie(mut response: Response, id: &str) -> Response {
    let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().insert(SET_COOKIE, value);
        }
        Err(e) => tracing::warn!("Could not set session cookie: {}", e),
    }
    response
}

fn render_chat(state: &ChatPageState, history: &[Message], error: Option<&str>) -> String {
    let mut body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n",
        escape(&state.title),
        escape(&state.description)
    );

    body.push_str("<details>\n<summary>Previous conversation</summary>\n");
    if history.is_empty() {
        body.push_str(&banner("info", "No conversation yet."));
    } else {
        for (i, message) in history.iter().enumerate() {
            let speaker = match message.role {
                Role::User => "User",
                Role::Assistant => "Gemini",
            };
            body.push_str(&format!(
                "<div><strong>{} {}</strong>:</div>\n{}<hr>\n",
                speaker,
                i / 2 + 1,
                markdown(&message.content)
            ));
        }
    }
    body.push_str("</details>\n");

    body.push_str("<div id=\"messages\">\n");
    for message in history {
        body.push_str(&format!(
            "<div class=\"msg {role}\"><div class=\"role\">{role}</div>{}</div>\n",
            markdown(&message.content),
            role = message.role
        ));
    }
    body.push_str("</div>\n<div id=\"thinking\">Thinking...</div>\n");

    if let Some(error) = error {
        body.push_str(&banner("error", error));
    }

    body.push_str(
        r#"<form method="post" action="/" id="chat-form">
<input type="text" name="message" placeholder="Type a message..." autocomplete="off" autofocus>
<button type="submit">Send</button>
</form>
<form method="post" action="/reset"><button type="submit">New conversation</button></form>
<script>
document.getElementById("chat-form").addEventListener("submit", function (e) {
  var input = this.querySelector("input[name=message]");
  if (!input.value.trim()) { e.preventDefault(); return; }
  var bubble = document.createElement("div");
  bubble.className = "msg user";
  bubble.textContent = input.value;
  document.getElementById("messages").appendChild(bubble);
  document.getElementById("thinking").style.display = "block";
  this.querySelector("button").disabled = true;
});
</script>
"#,
    );
    body
}
