//! Server-rendered HTML pages for the local variant (/, /upload, /watch/*)

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use std::sync::Arc;

use super::local::UploadFields;
use super::videos::SearchQuery;
use crate::LocalState;
use crate::models::{LocalVideo, SearchTerm};
use crate::services::error::ApiError;

pub fn routes() -> Router<Arc<LocalState>> {
    Router::new()
        .route("/", get(index))
        .route("/upload", get(upload_form).post(upload_submit))
        .route("/watch/{id}", get(watch))
}

/// GET / - all videos, optionally filtered
async fn index(
    State(state): State<Arc<LocalState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, ApiError> {
    let search = SearchTerm::parse(query.search.as_deref());
    let videos = state.store.list(search.as_ref()).await?;
    Ok(Html(render_index(&videos, query.search.as_deref().unwrap_or(""))))
}

/// GET /upload - form for adding a video by URL
async fn upload_form() -> Html<String> {
    Html(render_upload_form(None))
}

/// POST /upload - add the video and go to its watch page
async fn upload_submit(
    State(state): State<Arc<LocalState>>,
    Form(fields): Form<UploadFields>,
) -> Result<Response, ApiError> {
    let video = match fields.into_video() {
        Ok(video) => video,
        Err(ApiError::BadRequest(message)) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Html(render_upload_form(Some(&message))),
            )
                .into_response());
        }
        Err(e) => return Err(e),
    };

    let video = state.store.insert(video).await?;
    tracing::info!(video_id = %video.id, title = %video.title, "video added");

    Ok(Redirect::to(&format!("/watch/{}", video.id)).into_response())
}

/// GET /watch/:id - player page; every visit counts a view
async fn watch(
    State(state): State<Arc<LocalState>>,
    Path(video_id): Path<String>,
) -> Result<Response, ApiError> {
    match state.store.record_view(&video_id).await? {
        Some(video) => Ok(Html(render_watch(&video)).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Html(layout("Not found", "<p>Video not found.</p>")),
        )
            .into_response()),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
    <head>
        <meta charset="utf-8">
        <title>{} - ClipTube</title>
    </head>
    <body>
        <nav><a href="/">ClipTube</a> | <a href="/upload">Upload</a></nav>
        {}
    </body>
</html>
"#,
        escape_html(title),
        body
    )
}

fn render_index(videos: &[LocalVideo], search: &str) -> String {
    let items = if videos.is_empty() {
        "<p>No videos yet.</p>".to_string()
    } else {
        let list = videos
            .iter()
            .map(|v| {
                format!(
                    r#"<li><a href="/watch/{}">{}</a> <small>{} &middot; {} views</small></li>"#,
                    escape_html(&v.id),
                    escape_html(&v.title),
                    escape_html(&v.duration),
                    v.views
                )
            })
            .collect::<String>();
        format!("<ul>{}</ul>", list)
    };

    let body = format!(
        r#"<h1>Videos</h1>
        <form action="/" method="get">
            <input type="search" name="search" value="{}" placeholder="Search">
            <input type="submit" value="Search">
        </form>
        {}"#,
        escape_html(search),
        items
    );
    layout("Videos", &body)
}

fn render_upload_form(error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape_html(e)))
        .unwrap_or_default();

    let body = format!(
        r#"<h1>Add a video</h1>
        {}
        <form action="/upload" method="post">
            <div><label>Title <input type="text" name="title" required></label></div>
            <div><label>Video URL <input type="url" name="video_url" required></label></div>
            <div><label>Thumbnail URL <input type="url" name="thumbnail_url"></label></div>
            <div><label>Description <textarea name="description"></textarea></label></div>
            <div><input type="submit" value="Upload"></div>
        </form>"#,
        error
    );
    layout("Upload", &body)
}

fn render_watch(video: &LocalVideo) -> String {
    let poster = if video.thumbnail_url.is_empty() {
        String::new()
    } else {
        format!(r#" poster="{}""#, escape_html(&video.thumbnail_url))
    };

    let body = format!(
        r#"<h1>{}</h1>
        <video src="{}"{} controls width="640"></video>
        <p>{} views &middot; uploaded {}</p>
        <p>{}</p>"#,
        escape_html(&video.title),
        escape_html(&video.video_url),
        poster,
        video.views,
        video.upload_date.format("%Y-%m-%d"),
        escape_html(&video.description)
    );
    layout(&video.title, &body)
}
