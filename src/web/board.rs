//! Bulletin board pages
//!
//! Three views selected from the top menu: the post list, the write form,
//! and the manage view where a post is picked by id for editing or
//! deletion. Every write redirects to a fresh render of a view.

use crate::board::{BoardStore, Post, PostForm};
use crate::error::{error_kind, ChatboardError, Result};
use crate::web::html::{banner, escape, page};
use crate::web::{user_message, WebError};

use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;

struct BoardPageState {
    store: Arc<BoardStore>,
    title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    List,
    Write,
    Manage,
}

/// Query string of the list view
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    notice: Option<String>,
}

/// Query string of the manage view
#[derive(Debug, Default, Deserialize)]
pub struct ManageQuery {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    notice: Option<String>,
}

/// Build the board app router
pub fn router(store: Arc<BoardStore>, title: impl Into<String>) -> Router {
    let state = Arc::new(BoardPageState {
        store,
        title: title.into(),
    });

    Router::new()
        .route("/", get(list_view))
        .route("/write", get(write_view))
        .route("/manage", get(manage_view))
        .route("/posts", post(create_post))
        .route("/posts/:id", post(update_post))
        .route("/posts/:id/delete", post(delete_post))
        .with_state(state)
}

/// Run a store operation off the async runtime
async fn with_store<T, F>(state: &BoardPageState, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&BoardStore) -> Result<T> + Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| anyhow::anyhow!("board storage task failed: {}", e))?
}

async fn list_view(
    State(state): State<Arc<BoardPageState>>,
    Query(query): Query<ListQuery>,
) -> std::result::Result<Html<String>, WebError> {
    let posts = with_store(&state, |store| store.list_posts()).await?;

    let mut body = notice_banner(query.notice.as_deref());
    if posts.is_empty() {
        body.push_str(&banner("info", "No posts yet."));
    } else {
        for post in &posts {
            body.push_str(&format!(
                "<div class=\"post\"><h3>{}</h3><p>{}</p></div>\n",
                escape(&post.label()),
                escape(&post.content).replace('\n', "<br>")
            ));
        }
    }

    Ok(Html(render(&state, View::List, &body)))
}

async fn write_view(State(state): State<Arc<BoardPageState>>) -> Html<String> {
    let body = post_form("/posts", &PostForm::default(), "Submit");
    Html(render(&state, View::Write, &body))
}

async fn create_post(
    State(state): State<Arc<BoardPageState>>,
    Form(form): Form<PostForm>,
) -> std::result::Result<Response, WebError> {
    let submitted = form.clone();
    match with_store(&state, move |store| store.create_post(&form)).await {
        Ok(_) => Ok(Redirect::to("/?notice=created").into_response()),
        Err(e) if is_validation(&e) => {
            let body = format!(
                "{}{}",
                banner("error", &user_message(&e)),
                post_form("/posts", &submitted, "Submit")
            );
            Ok((
                StatusCode::BAD_REQUEST,
                Html(render(&state, View::Write, &body)),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

async fn manage_view(
    State(state): State<Arc<BoardPageState>>,
    Query(query): Query<ManageQuery>,
) -> std::result::Result<Html<String>, WebError> {
    let selected = query.id;
    let (posts, post) = with_store(&state, move |store| {
        let posts = store.list_posts()?;
        let post = match selected {
            Some(id) => store.get_post(id)?,
            None => None,
        };
        Ok((posts, post))
    })
    .await?;

    let mut body = notice_banner(query.notice.as_deref());
    if posts.is_empty() {
        body.push_str(&banner("info", "No posts yet."));
        return Ok(Html(render(&state, View::Manage, &body)));
    }

    body.push_str(&post_selector(&posts, selected));
    match (selected, post) {
        (Some(_), Some(post)) => body.push_str(&edit_forms(&post, &PostForm::from(&post))),
        (Some(_), None) => body.push_str(&banner("error", "That post no longer exists.")),
        (None, _) => {}
    }

    Ok(Html(render(&state, View::Manage, &body)))
}

async fn update_post(
    State(state): State<Arc<BoardPageState>>,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> std::result::Result<Response, WebError> {
    let submitted = form.clone();
    match with_store(&state, move |store| store.update_post(id, &form)).await {
        Ok(_) => Ok(Redirect::to(&format!("/manage?id={}&notice=updated", id)).into_response()),
        Err(e) if is_validation(&e) => {
            let (posts, post) = with_store(&state, move |store| {
                Ok((store.list_posts()?, store.get_post(id)?))
            })
            .await?;
            let post = post.ok_or_else(|| ChatboardError::NotFound(format!("post {}", id)))?;

            let body = format!(
                "{}{}{}",
                post_selector(&posts, Some(id)),
                banner("error", &user_message(&e)),
                edit_forms(&post, &submitted)
            );
            Ok((
                StatusCode::BAD_REQUEST,
                Html(render(&state, View::Manage, &body)),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

async fn delete_post(
    State(state): State<Arc<BoardPageState>>,
    Path(id): Path<i64>,
) -> std::result::Result<Redirect, WebError> {
    with_store(&state, move |store| store.delete_post(id)).await?;
    Ok(Redirect::to("/manage?notice=deleted"))
}

fn is_validation(err: &anyhow::Error) -> bool {
    matches!(error_kind(err), Some(ChatboardError::Validation(_)))
}

fn notice_banner(notice: Option<&str>) -> String {
    let text = match notice {
        Some("created") => "Post created.",
        Some("updated") => "Post updated.",
        Some("deleted") => "Post deleted.",
        _ => return String::new(),
    };
    banner("notice", text)
}

fn render(state: &BoardPageState, active: View, body: &str) -> String {
    let link = |view: View, href: &str, label: &str| {
        let class = if view == active { " class=\"active\"" } else { "" };
        format!("<a href=\"{}\"{}>{}</a>", href, class, label)
    };

    let content = format!(
        "<h1>{}</h1>\n<nav>{}{}{}</nav>\n<hr>\n{}",
        escape(&state.title),
        link(View::List, "/", "List"),
        link(View::Write, "/write", "Write"),
        link(View::Manage, "/manage", "Manage"),
        body
    );
    page(&state.title, &content)
}

fn post_form(action: &str, values: &PostForm, submit: &str) -> String {
    format!(
        r#"<form method="post" action="{}">
<label>Title<input type="text" name="title" value="{}"></label>
<label>Content<textarea name="content">{}</textarea></label>
<label>Author<input type="text" name="author" value="{}"></label>
<button type="submit">{}</button>
</form>
"#,
        escape(action),
        escape(&values.title),
        escape(&values.content),
        escape(&values.author),
        escape(submit)
    )
}

fn post_selector(posts: &[Post], selected: Option<i64>) -> String {
    let mut out = String::from(
        "<form method=\"get\" action=\"/manage\">\n<label>Select a post<select name=\"id\">\n",
    );
    for post in posts {
        let marker = if Some(post.id) == selected {
            " selected"
        } else {
            ""
        };
        out.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            post.id,
            marker,
            escape(&post.label())
        ));
    }
    out.push_str("</select></label>\n<button type=\"submit\">Select</button>\n</form>\n");
    out
}

fn edit_forms(post: &Post, values: &PostForm) -> String {
    format!(
        "<h2>Edit post</h2>\n{}<form method=\"post\" action=\"/posts/{}/delete\">\
         <button type=\"submit\">Delete</button></form>\n",
        post_form(&format!("/posts/{}", post.id), values, "Update"),
        post.id
    )
}
