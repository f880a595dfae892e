pub mod local;
pub mod pages;
pub mod videos;

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{AppState, LocalState};

async fn health() -> &'static str {
    "ok"
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build all routes for the Postgres + Cloudinary API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .merge(videos::routes())
}

/// Build all routes for the JSON-file deployment
pub fn build_local_routes() -> Router<Arc<LocalState>> {
    Router::new()
        .route("/health", get(health))
        .merge(local::routes())
        .merge(pages::routes())
}

pub fn cloud_app(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    build_routes()
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn local_app(state: Arc<LocalState>, max_upload_bytes: usize) -> Router {
    build_local_routes()
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use axum::response::Response;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    use crate::models::{LocalVideoResponse, VideoResponse};
    use crate::services::error::MessageBody;
    use crate::services::json_store::JsonVideoStore;
    use crate::services::testing::{FakeMedia, InMemoryRepository};
    use super::local::LocalUploadResponse;
    use super::videos::UploadResponse;

    const BOUNDARY: &str = "cliptube-test-boundary";
    const LIMIT: usize = 10 * 1024 * 1024;

    struct CloudHarness {
        app: Router,
        repo: Arc<InMemoryRepository>,
        media: Arc<FakeMedia>,
    }

    fn cloud_harness() -> CloudHarness {
        let repo = Arc::new(InMemoryRepository::default());
        let media = Arc::new(FakeMedia::default());
        let state = Arc::new(AppState {
            videos: repo.clone(),
            media: media.clone(),
            public_base_url: None,
        });
        CloudHarness {
            app: cloud_app(state, LIMIT),
            repo,
            media,
        }
    }

    /// (name, filename, value)
    fn multipart_body(fields: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, value) in fields {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: video/mp4\r\n\r\n",
                    name, file_name
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    fn multipart_request(uri: &str, fields: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::HOST, "clips.test")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(fields)))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn json<T: DeserializeOwned>(response: Response) -> T {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    async fn upload(app: &Router, title: &str, description: &str) -> UploadResponse {
        let response = send(
            app,
            multipart_request(
                "/api/upload",
                &[
                    ("title", None, title),
                    ("description", None, description),
                    ("video", Some("clip.mp4"), "fake video bytes"),
                ],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json(response).await
    }

    fn path_of(link: &str) -> &str {
        link.strip_prefix("http://clips.test").unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let h = cloud_harness();
        let response = send(&h.app, get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_upload_requires_title_and_file() {
        let h = cloud_harness();

        let response = send(
            &h.app,
            multipart_request("/api/upload", &[("video", Some("clip.mp4"), "bytes")]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: MessageBody = json(response).await;
        assert_eq!(body.message, "Video title is required.");

        let response = send(
            &h.app,
            multipart_request("/api/upload", &[("title", None, "No file")]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: MessageBody = json(response).await;
        assert_eq!(body.message, "No video file provided for upload.");

        assert!(h.media.uploaded().is_empty());
        let list: Vec<VideoResponse> = json(send(&h.app, get("/api/videos")).await).await;
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_upload_is_listed_and_fetchable_without_token() {
        let h = cloud_harness();
        let uploaded = upload(&h.app, "Mountain Hike", "Up the ridge").await;
        assert_eq!(
            uploaded.message,
            "Video successfully uploaded and is being processed!"
        );
        let id = uploaded.video.video.id.clone();
        let token = h.repo.stored_token(&id).unwrap();
        assert!(uploaded.video.delete_link.starts_with("http://clips.test/api/videos/"));
        assert!(uploaded.video.delete_link.contains("cliptube_videos%2Ffake0"));
        assert!(uploaded.video.delete_link.ends_with(&format!("?token={}", token)));

        let response = send(&h.app, get("/api/videos")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        assert!(!text.contains(&token));
        let list: Vec<VideoResponse> = serde_json::from_str(&text).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, id);

        let response = send(&h.app, get("/api/videos/cliptube_videos%2Ffake0")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        assert!(!text.contains(&token));
        let video: VideoResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(video.title, "Mountain Hike");
        assert_eq!(video.description, "Up the ridge");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_on_title_or_description() {
        let h = cloud_harness();
        upload(&h.app, "Mountain Hike", "").await;
        upload(&h.app, "Beach day", "sand and sun").await;
        upload(&h.app, "Evening", "a short HIKE at dusk").await;

        for term in ["mountain", "MOUNTAIN", "hike"] {
            let list: Vec<VideoResponse> =
                json(send(&h.app, get(&format!("/api/videos?search={}", term))).await).await;
            assert!(list.iter().any(|v| v.title == "Mountain Hike"), "term {}", term);
            assert!(list.iter().all(|v| v.title != "Beach day"));
        }

        let list: Vec<VideoResponse> = json(send(&h.app, get("/api/videos?search=hike")).await).await;
        assert_eq!(list.len(), 2);

        let list: Vec<VideoResponse> = json(send(&h.app, get("/api/videos?search=")).await).await;
        assert_eq!(list.len(), 3);
    }

    #[tokio::test]
    async fn test_get_unknown_video_is_404() {
        let h = cloud_harness();
        let response = send(&h.app, get("/api/videos/missing")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: MessageBody = json(response).await;
        assert_eq!(body.message, "Video not found.");
    }

    #[tokio::test]
    async fn test_delete_flow() {
        let h = cloud_harness();
        let uploaded = upload(&h.app, "Clip", "").await;
        let link = uploaded.video.delete_link.clone();
        let video_path = "/api/videos/cliptube_videos%2Ffake0";

        let response = send(&h.app, delete("/api/videos/cliptube_videos%2Ffake0/delete?token=nope")).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(&h.app, delete("/api/videos/cliptube_videos%2Ffake0/delete")).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(&h.app, delete("/api/videos/unknown/delete?token=nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert_eq!(send(&h.app, get(video_path)).await.status(), StatusCode::OK);
        assert!(h.media.destroyed().is_empty());

        let response = send(&h.app, delete(path_of(&link))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: MessageBody = json(response).await;
        assert_eq!(body.message, "Video successfully deleted.");

        assert_eq!(send(&h.app, get(video_path)).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(h.media.destroyed(), vec!["cliptube_videos/fake0".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_insert_returns_500_and_cleans_up() {
        let h = cloud_harness();
        h.repo.fail_inserts();

        let response = send(
            &h.app,
            multipart_request(
                "/api/upload",
                &[("title", None, "Clip"), ("video", Some("clip.mp4"), "bytes")],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: MessageBody = json(response).await;
        assert!(body.message.starts_with("Server error:"));
        assert_eq!(h.media.destroyed(), h.media.uploaded());
    }

    fn local_harness() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(LocalState {
            store: JsonVideoStore::new(dir.path().join("videos.json")),
        });
        (local_app(state, LIMIT), dir)
    }

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_api_upload_and_views() {
        let (app, _dir) = local_harness();

        let response = send(
            &app,
            form_request(
                "/api/upload",
                "title=Mountain+Hike&video_url=https%3A%2F%2Fcdn.example.com%2Fa.mp4",
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: LocalUploadResponse = json(response).await;
        assert_eq!(created.video.views, 0);
        assert_eq!(created.video.duration, "0:00");
        let id = created.video.id;

        for expected in 1..=3u64 {
            let video: LocalVideoResponse =
                json(send(&app, get(&format!("/api/video/{}", id))).await).await;
            assert_eq!(video.views, expected);
        }

        let list: Vec<LocalVideoResponse> = json(send(&app, get("/api/videos?search=HIKE")).await).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].views, 3);

        assert_eq!(
            send(&app, get("/api/video/unknown")).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_local_api_accepts_multipart_and_validates() {
        let (app, _dir) = local_harness();

        let response = send(
            &app,
            multipart_request("/api/upload", &[("title", None, "No URL")]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: MessageBody = json(response).await;
        assert_eq!(body.message, "Video URL is required.");

        let response = send(
            &app,
            multipart_request(
                "/api/upload",
                &[("video_url", None, "https://cdn.example.com/a.mp4")],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let list: Vec<LocalVideoResponse> = json(send(&app, get("/api/videos")).await).await;
        assert!(list.is_empty());

        let response = send(
            &app,
            multipart_request(
                "/api/upload",
                &[
                    ("title", None, "Clip"),
                    ("video_url", None, "https://cdn.example.com/a.mp4"),
                ],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_local_pages() {
        let (app, _dir) = local_harness();

        let response = send(&app, get("/upload")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"name="video_url""#));

        let response = send(&app, form_request("/upload", "title=&video_url=x")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Video title is required."));

        let response = send(
            &app,
            form_request("/upload", "title=Clip&video_url=https%3A%2F%2Fcdn.example.com%2Fa.mp4"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(location.starts_with("/watch/"));

        let response = send(&app, get(&location)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("https://cdn.example.com/a.mp4"));
        assert!(html.contains("1 views"));

        let response = send(&app, get("/")).await;
        assert!(body_text(response).await.contains(&location));

        assert_eq!(
            send(&app, get("/watch/unknown")).await.status(),
            StatusCode::NOT_FOUND
        );
    }
}
