use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response as AxumResponse},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use shared::domain::ProductField;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
struct ReceivedPart {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone, Default)]
struct ServerState {
    parts: Arc<Mutex<Vec<ReceivedPart>>>,
    reject_with: Option<(StatusCode, &'static str)>,
}

async fn handle_create_product(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AxumResponse {
    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        parts.push(ReceivedPart {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
    *state.parts.lock().await = parts;

    if let Some((status, body)) = state.reject_with {
        return (status, [(header::CONTENT_TYPE, "application/json")], body).into_response();
    }
    Json(json!({"id": 31, "name": "Phone", "imageName": "photo.jpg"})).into_response()
}

async fn handle_generate_description(
    Query(params): Query<HashMap<String, String>>,
) -> AxumResponse {
    let name = params.get("name").cloned().unwrap_or_default();
    let category = params.get("category").cloned().unwrap_or_default();
    if name == "fail" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "model offline"})),
        )
            .into_response();
    }
    format!("{name} for the {category} aisle").into_response()
}

async fn handle_generate_image(Query(params): Query<HashMap<String, String>>) -> AxumResponse {
    if params.get("name").map(String::as_str) == Some("fail") {
        return (StatusCode::BAD_GATEWAY, "quota exceeded").into_response();
    }
    let description = params.get("description").cloned().unwrap_or_default();
    let mut bytes = vec![0xFF, 0xD8, 0xFF];
    bytes.extend_from_slice(description.as_bytes());
    ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response()
}

async fn handle_generate_product(Query(params): Query<HashMap<String, String>>) -> AxumResponse {
    let query = params.get("query").cloned().unwrap_or_default();
    Json(json!({
        "name": format!("Generated: {query}"),
        "brand": "Zenith",
        "price": 999.5,
        "category": "Laptop",
        "stockQuantity": 3,
        "releaseDate": "2025-02-01",
        "productAvailable": true,
    }))
    .into_response()
}

async fn handle_ask(Query(params): Query<HashMap<String, String>>) -> AxumResponse {
    let message = params.get("message").cloned().unwrap_or_default();
    if message == "fail" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "bot unavailable"}})),
        )
            .into_response();
    }
    Json(json!({"response": format!("echo: {message}")})).into_response()
}

async fn spawn_storefront_server(state: ServerState) -> String {
    let app = Router::new()
        .route("/api/product", post(handle_create_product))
        .route(
            "/api/product/generate-description",
            post(handle_generate_description),
        )
        .route("/api/product/generate-image", post(handle_generate_image))
        .route("/api/product/generate-product", post(handle_generate_product))
        .route("/api/chat/ask", get(handle_ask))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn api_for(base_url: String) -> HttpStorefrontApi {
    HttpStorefrontApi::new(&ClientSettings {
        base_url,
        ..ClientSettings::default()
    })
    .expect("http client")
}

fn phone() -> ProductDraft {
    ProductDraft {
        name: "Phone".into(),
        brand: "Acme".into(),
        description: String::new(),
        price: "299.99".into(),
        category: "Mobile".into(),
        stock_quantity: "10".into(),
        release_date: "2024-01-01".into(),
        product_available: false,
    }
}

#[test]
fn base_url_trailing_slash_is_dropped() {
    let api = api_for("http://127.0.0.1:8080/".into());
    assert_eq!(api.base_url(), "http://127.0.0.1:8080");
    assert_eq!(
        api.endpoint("/api/chat/ask"),
        "http://127.0.0.1:8080/api/chat/ask"
    );
}

#[tokio::test]
async fn create_product_sends_image_part_then_json_product_part() {
    let state = ServerState::default();
    let api = api_for(spawn_storefront_server(state.clone()).await);

    let created = api
        .create_product(ProductSubmission {
            image: Some(ImagePart {
                filename: "photo.jpg".into(),
                mime_type: "image/jpeg".into(),
                bytes: vec![1, 2, 3],
            }),
            product: phone(),
        })
        .await
        .expect("create product");

    assert_eq!(created.id, Some(31));
    assert_eq!(created.extra.get("imageName"), Some(&json!("photo.jpg")));

    let parts = state.parts.lock().await.clone();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].name, IMAGE_PART);
    assert_eq!(parts[0].file_name.as_deref(), Some("photo.jpg"));
    assert_eq!(parts[0].content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(parts[0].bytes, vec![1, 2, 3]);
    assert_eq!(parts[1].name, PRODUCT_PART);
    assert_eq!(parts[1].content_type.as_deref(), Some("application/json"));
    let product: ProductDraft = serde_json::from_slice(&parts[1].bytes).expect("product json");
    assert_eq!(product, phone());
}

#[tokio::test]
async fn create_product_without_image_sends_only_the_product() {
    let state = ServerState::default();
    let api = api_for(spawn_storefront_server(state.clone()).await);

    api.create_product(ProductSubmission {
        image: None,
        product: phone(),
    })
    .await
    .expect("create product");

    let parts = state.parts.lock().await.clone();
    assert_eq!(
        parts.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        vec![PRODUCT_PART]
    );
}

#[tokio::test]
async fn rejected_product_keeps_status_and_body() {
    let state = ServerState {
        reject_with: Some((StatusCode::BAD_REQUEST, r#"{"price":"must be positive"}"#)),
        ..ServerState::default()
    };
    let api = api_for(spawn_storefront_server(state).await);

    let err = api
        .create_product(ProductSubmission {
            image: None,
            product: phone(),
        })
        .await
        .expect_err("must be rejected");

    assert_eq!(err.status_code(), Some(400));
    let errors = err.field_errors().expect("field errors");
    assert_eq!(errors.get(ProductField::Price), Some("must be positive"));
}

#[tokio::test]
async fn description_is_requested_with_name_and_category() {
    let api = api_for(spawn_storefront_server(ServerState::default()).await);

    let description = api
        .generate_description("Noise Buds & Co", "Headphone")
        .await
        .expect("description");
    assert_eq!(description, "Noise Buds & Co for the Headphone aisle");

    let err = api
        .generate_description("fail", "Headphone")
        .await
        .expect_err("must fail");
    assert_eq!(err.server_message().as_deref(), Some("model offline"));
}

#[tokio::test]
async fn image_bytes_are_returned_verbatim() {
    let api = api_for(spawn_storefront_server(ServerState::default()).await);

    let bytes = api
        .generate_image("Phone", "Mobile", "ok")
        .await
        .expect("image");
    assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF, b'o', b'k']);

    let err = api
        .generate_image("fail", "Mobile", "ok")
        .await
        .expect_err("must fail");
    assert_eq!(err.status_code(), Some(502));
    assert_eq!(err.body_text().as_deref(), Some("quota exceeded"));
}

#[tokio::test]
async fn generated_product_is_parsed_leniently() {
    let api = api_for(spawn_storefront_server(ServerState::default()).await);

    let draft = api
        .generate_product("gaming laptop, 32GB RAM")
        .await
        .expect("generated product")
        .into_draft();

    assert_eq!(draft.name, "Generated: gaming laptop, 32GB RAM");
    assert_eq!(draft.price, "999.5");
    assert_eq!(draft.stock_quantity, "3");
    assert!(draft.product_available);
}

#[tokio::test]
async fn ask_returns_reply_or_error_envelope() {
    let api = api_for(spawn_storefront_server(ServerState::default()).await);

    assert_eq!(
        api.ask("what is in stock?").await.expect("reply"),
        "echo: what is in stock?"
    );

    let err = api.ask("fail").await.expect_err("must fail");
    assert_eq!(err.chat_error_message().as_deref(), Some("bot unavailable"));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let api = api_for(format!("http://{addr}"));
    let err = api.ask("hello").await.expect_err("must fail");
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn form_submission_round_trips_through_http() {
    let state = ServerState {
        reject_with: Some((StatusCode::BAD_REQUEST, r#"{"price":"must be positive"}"#)),
        ..ServerState::default()
    };
    let api = api_for(spawn_storefront_server(state).await);
    let mut form = FormController::new();
    form.update_field(ProductField::Name, "Phone");
    form.update_field(ProductField::Brand, "Acme");
    form.update_field(ProductField::Price, "299.99");
    form.update_field(ProductField::Category, "Mobile");
    form.update_field(ProductField::StockQuantity, "10");
    form.update_field(ProductField::ReleaseDate, "2024-01-01");

    assert_eq!(form.submit(&api).await, SubmitOutcome::Failed);
    assert_eq!(
        form.errors().get(ProductField::Price),
        Some("must be positive")
    );
    assert_eq!(form.draft(), &phone());
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn chat_session_talks_to_http_backend() {
    let api = api_for(spawn_storefront_server(ServerState::default()).await);
    let mut session = ChatSession::new();

    assert_eq!(session.send(&api, "hello").await, SendOutcome::Replied);
    assert_eq!(session.send(&api, "fail").await, SendOutcome::Failed);

    let texts: Vec<&str> = session
        .transcript()
        .iter()
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(texts, vec![chat::GREETING, "hello", "echo: hello", "fail"]);
    assert_eq!(session.error(), Some("bot unavailable"));
}
