#![allow(dead_code)]

use axum::extract::{Multipart, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Multipart upload as the test server saw it
#[derive(Debug, Default, Clone)]
pub struct ReceivedUpload {
    pub name: String,
    pub type_id: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub photo_len: usize,
}

pub struct ServerState {
    pub pages: Vec<Value>,
    pub malformed: bool,
    pub page_hits: AtomicUsize,
    pub upload_status: StatusCode,
    pub upload_body_len: usize,
    /// Answer uploads with an empty gzip-encoded body instead
    pub upload_gzip: bool,
    pub uploads: Mutex<Vec<ReceivedUpload>>,
    pub photo_type_status: StatusCode,
    pub photo_types: Mutex<Vec<Value>>,
}

impl ServerState {
    pub fn with_pages(pages: Vec<Value>) -> Self {
        Self {
            pages,
            malformed: false,
            page_hits: AtomicUsize::new(0),
            upload_status: StatusCode::OK,
            upload_body_len: 2,
            upload_gzip: false,
            uploads: Mutex::new(Vec::new()),
            photo_type_status: StatusCode::OK,
            photo_types: Mutex::new(Vec::new()),
        }
    }

    pub fn page_hits(&self) -> usize {
        self.page_hits.load(Ordering::SeqCst)
    }
}

/// Gzip stream of zero bytes of payload
pub const EMPTY_GZIP: [u8; 20] = [
    0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x03, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00,
];

pub struct TestServer {
    pub base_url: String,
    pub state: Arc<ServerState>,
}

impl TestServer {
    pub async fn start(state: ServerState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/api/v2/photo/type", get(list_types).post(create_type))
            .route("/api/v2/photo", post(upload_photo))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/", addr),
            state,
        }
    }
}

/// Server JSON for a catalog split into pages of the given sizes
pub fn catalog_pages(sizes: &[usize]) -> Vec<Value> {
    let total: usize = sizes.iter().sum();
    let mut next_id = 1;
    sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| {
            let content: Vec<Value> = (0..size)
                .map(|_| {
                    let id = next_id;
                    next_id += 1;
                    let image = if id % 2 == 0 {
                        Value::Null
                    } else {
                        json!(format!("https://img.test/{}.png", id))
                    };
                    json!({
                        "id": id,
                        "name": format!("type-{}", id),
                        "image": image
                    })
                })
                .collect();
            json!({
                "page": i + 1,
                "pageSize": 20,
                "totalPages": sizes.len(),
                "totalElements": total,
                "content": content
            })
        })
        .collect()
}

async fn list_types(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.page_hits.fetch_add(1, Ordering::SeqCst);
    if state.malformed {
        return (StatusCode::OK, "{\"page\": ").into_response();
    }

    let page = params
        .get("page")
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(0);
    match page.checked_sub(1).and_then(|i| state.pages.get(i)) {
        Some(body) => Json(body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn create_type(State(state): State<Arc<ServerState>>, Json(body): Json<Value>) -> StatusCode {
    state.photo_types.lock().unwrap().push(body);
    state.photo_type_status
}

async fn upload_photo(State(state): State<Arc<ServerState>>, mut multipart: Multipart) -> Response {
    let mut received = ReceivedUpload::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "name" => received.name = field.text().await.unwrap(),
            "typeId" => received.type_id = field.text().await.unwrap(),
            "photo" => {
                received.file_name = field.file_name().map(str::to_string);
                received.content_type = field.content_type().map(str::to_string);
                received.photo_len = field.bytes().await.unwrap().len();
            }
            _ => {}
        }
    }
    state.uploads.lock().unwrap().push(received);

    if state.upload_gzip {
        return (
            state.upload_status,
            [(header::CONTENT_ENCODING, "gzip")],
            EMPTY_GZIP.to_vec(),
        )
            .into_response();
    }
    (state.upload_status, "x".repeat(state.upload_body_len)).into_response()
}
