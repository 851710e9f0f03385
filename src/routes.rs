use axum::{Json, Router, extract::{State, rejection::JsonRejection}, response::{IntoResponse, Response}, routing::{get, post}};
use std::sync::Arc;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::{Any, CorsLayer}, trace::TraceLayer};
use tracing::{Instrument, info_span};
use uuid::Uuid;

use crate::{
    config::{Config, ImageMode, DALLE_CREDENTIAL, TEXT_CREDENTIAL},
    error::ApiError,
    gemini::GeminiClient,
    models::{ImageDraft, ProductDraft},
    openai::DalleClient,
    pipeline,
    placeholder::PlaceholderImages,
    provider::{ImageGenerator, ProviderSlot, TextGenerator},
};

pub const CONTENT_SOURCE_HEADER: &str = "x-content-source";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AppState {
    pub text: ProviderSlot<dyn TextGenerator>,
    pub image: ProviderSlot<dyn ImageGenerator>,
}

impl AppState {
    /// Builds the provider clients once. A missing credential leaves its slot
    /// empty so the endpoint can report it per request.
    pub fn from_config(config: &Config) -> Self {
        let gemini = config.google_api_key.clone()
            .map(|key| Arc::new(GeminiClient::new(key, &config.gemini)));

        let text: ProviderSlot<dyn TextGenerator> = match &gemini {
            Some(client) => ProviderSlot::Ready(client.clone()),
            None => ProviderSlot::Missing(TEXT_CREDENTIAL),
        };

        let image: ProviderSlot<dyn ImageGenerator> = match config.image_mode {
            ImageMode::Placeholder => ProviderSlot::Ready(Arc::new(PlaceholderImages)),
            ImageMode::Gemini => match gemini {
                Some(client) => ProviderSlot::Ready(client),
                None => ProviderSlot::Missing(TEXT_CREDENTIAL),
            },
            ImageMode::Dalle => match &config.openai_api_key {
                Some(key) => ProviderSlot::Ready(Arc::new(DalleClient::new(key.clone(), &config.openai))),
                None => ProviderSlot::Missing(DALLE_CREDENTIAL),
            },
        };

        AppState { text, image }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate_content))
        .route("/api/image", post(generate_image))
        .route("/api/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any)
                )
        )
        .with_state(state)
}

/// Turns a handler panic into the usual error envelope instead of a dropped connection.
fn panic_response(payload: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let details = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::Unknown(details).into_response()
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[axum::debug_handler]
pub async fn generate_content(
    State(state): State<AppState>,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();
    async move {
        let Json(draft) = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
        let generated = pipeline::generate_content_pack(&state.text, draft).await?;
        let request_id = request_id.to_string();
        Ok::<_, ApiError>((
            [(CONTENT_SOURCE_HEADER, generated.source.as_str()), (REQUEST_ID_HEADER, request_id.as_str())],
            Json(generated.pack),
        ).into_response())
    }
    .instrument(info_span!("generate_content", %request_id))
    .await
}

#[axum::debug_handler]
pub async fn generate_image(
    State(state): State<AppState>,
    body: Result<Json<ImageDraft>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();
    async move {
        let Json(draft) = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
        let result = pipeline::generate_image(&state.image, draft).await?;
        Ok::<_, ApiError>(([(REQUEST_ID_HEADER, request_id.to_string())], Json(result)).into_response())
    }
    .instrument(info_span!("generate_image", %request_id))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use crate::models::ImageResult;
    use crate::pipeline::tests::{MockProvider, bozza_reply};

    fn state_with(text: &Arc<MockProvider>, image: &Arc<MockProvider>) -> AppState {
        AppState {
            text: ProviderSlot::Ready(text.clone() as Arc<dyn TextGenerator>),
            image: ProviderSlot::Ready(image.clone() as Arc<dyn ImageGenerator>),
        }
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, Response) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        (response.status(), response)
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn bozza_body() -> serde_json::Value {
        json!({
            "newItemName": "Bozza",
            "itemDescription": "Italian doughnut-pizza fusion",
            "price": "RM22.90",
            "strategicInput": "Classic Margherita"
        })
    }

    #[tokio::test]
    async fn content_pack_from_fenced_provider_reply() {
        let text = MockProvider::replying(&bozza_reply());
        let image = MockProvider::with_image(ImageResult::ImageUrl("u".into()));
        let (status, response) = post_json(router(state_with(&text, &image)), "/api/generate", bozza_body()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_SOURCE_HEADER], "provider");
        let body = json_body(response).await;
        assert_eq!(body["launchPromotion"]["content"], "Bundle Bozza with Margherita");
        assert_eq!(body.as_object().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn truncated_reply_still_returns_200_fallback() {
        let text = MockProvider::replying("```json\n{\"launchPromotion\": {\"title\": \"Act");
        let image = MockProvider::with_image(ImageResult::ImageUrl("u".into()));
        let (status, response) = post_json(router(state_with(&text, &image)), "/api/generate", bozza_body()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_SOURCE_HEADER], "fallback");
        let body = json_body(response).await;
        let content = body["launchPromotion"]["content"].as_str().unwrap();
        assert!(content.contains("Bozza") && content.contains("Classic Margherita"));
        let caption = body["instagramPost"]["caption"].as_str().unwrap();
        assert!(caption.contains("RM22.90") && caption.contains("Italian doughnut-pizza fusion"));
        for section in ["instagramPost", "facebookPost", "upsellPost"] {
            for leaf in ["title", "caption", "hashtags", "imagePrompt"] {
                assert!(body[section][leaf].is_string(), "{section}.{leaf}");
            }
        }
    }

    #[tokio::test]
    async fn each_missing_field_is_a_400_without_provider_call() {
        for field in ["newItemName", "itemDescription", "price", "strategicInput"] {
            let text = MockProvider::replying(&bozza_reply());
            let image = MockProvider::with_image(ImageResult::ImageUrl("u".into()));
            let mut body = bozza_body();
            body.as_object_mut().unwrap().remove(field);

            let (status, response) = post_json(router(state_with(&text, &image)), "/api/generate", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let body = json_body(response).await;
            assert!(body["error"].as_str().unwrap().contains("Incomplete request"));
            assert!(body["details"].as_str().unwrap().contains(field));
            assert_eq!(text.calls(), 0);
        }
    }

    #[tokio::test]
    async fn missing_credential_is_a_500() {
        let state = AppState {
            text: ProviderSlot::Missing("GOOGLE_API_KEY"),
            image: ProviderSlot::Missing("OPENAI_API_KEY"),
        };
        let (status, response) = post_json(router(state), "/api/generate", bozza_body()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["details"].as_str().unwrap().contains("GOOGLE_API_KEY"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_400_envelope() {
        let text = MockProvider::replying(&bozza_reply());
        let image = MockProvider::with_image(ImageResult::ImageUrl("u".into()));
        let request = Request::builder()
            .method("POST")
            .uri("/api/generate")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = router(state_with(&text, &image)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid request body.");
        assert_eq!(text.calls(), 0);
    }

    #[tokio::test]
    async fn image_endpoint_returns_url() {
        let text = MockProvider::replying("");
        let image = MockProvider::with_image(ImageResult::ImageUrl("https://img/bozza.png".into()));
        let (status, response) = post_json(router(state_with(&text, &image)), "/api/image", json!({ "prompt": "Bozza" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "imageUrl": "https://img/bozza.png" }));
    }

    #[tokio::test]
    async fn image_rate_limit_maps_to_429() {
        let text = MockProvider::replying("");
        let image = MockProvider::failing(429);
        let (status, response) = post_json(router(state_with(&text, &image)), "/api/image", json!({ "prompt": "Bozza" })).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to generate image.");
        assert!(body["raw"].as_str().unwrap().contains("mock failure"));
    }

    #[tokio::test]
    async fn placeholder_mode_returns_base64() {
        let text = MockProvider::replying("");
        let state = AppState {
            text: ProviderSlot::Ready(text as Arc<dyn TextGenerator>),
            image: ProviderSlot::Ready(Arc::new(PlaceholderImages)),
        };
        let (status, response) = post_json(router(state), "/api/image", json!({ "prompt": "Bozza" })).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["imageBase64"].as_str().unwrap().starts_with("PHN2Zy"));
        assert!(body.get("imageUrl").is_none());
    }

    struct PanickingText;

    #[async_trait::async_trait]
    impl TextGenerator for PanickingText {
        async fn generate_text(&self, _prompt: &str) -> Result<String, crate::provider::ProviderError> {
            panic!("provider exploded")
        }
    }

    #[tokio::test]
    async fn panics_become_unknown_error_envelopes() {
        let state = AppState {
            text: ProviderSlot::Ready(Arc::new(PanickingText)),
            image: ProviderSlot::Missing("OPENAI_API_KEY"),
        };
        let (status, response) = post_json(router(state), "/api/generate", bozza_body()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "An unknown server error occurred.");
        assert_eq!(body["details"], "provider exploded");
    }

    fn config(google: Option<&str>, openai: Option<&str>, image_mode: ImageMode) -> Config {
        Config {
            google_api_key: google.map(str::to_string),
            openai_api_key: openai.map(str::to_string),
            gemini: crate::config::GeminiConfig {
                base_url: "http://127.0.0.1:9".into(),
                text_model: "t".into(),
                image_model: "i".into(),
                project_id: None,
            },
            openai: crate::config::OpenAiConfig { base_url: "http://127.0.0.1:9".into(), image_model: "dall-e-3".into() },
            image_mode,
            port: 0,
            defer_credential_check: true,
        }
    }

    #[test]
    fn state_slots_follow_credentials_and_mode() {
        let state = AppState::from_config(&config(None, None, ImageMode::Dalle));
        assert!(matches!(state.text, ProviderSlot::Missing("GOOGLE_API_KEY")));
        assert!(matches!(state.image, ProviderSlot::Missing("OPENAI_API_KEY")));

        let state = AppState::from_config(&config(Some("g"), None, ImageMode::Gemini));
        assert!(matches!(state.text, ProviderSlot::Ready(_)));
        assert!(matches!(state.image, ProviderSlot::Ready(_)));

        let state = AppState::from_config(&config(None, None, ImageMode::Placeholder));
        assert!(matches!(state.image, ProviderSlot::Ready(_)));
    }

    #[tokio::test]
    async fn missing_image_credential_is_a_500_naming_it() {
        let state = AppState::from_config(&config(Some("g"), None, ImageMode::Dalle));
        let (status, response) = post_json(router(state), "/api/image", json!({ "prompt": "Bozza" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to generate image.");
        assert_eq!(body["details"], "OPENAI_API_KEY is not configured in environment variables.");
    }

    #[tokio::test]
    async fn cors_preflight_is_answered() {
        let state = AppState {
            text: ProviderSlot::Missing("GOOGLE_API_KEY"),
            image: ProviderSlot::Missing("OPENAI_API_KEY"),
        };
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/generate")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn health_is_ok() {
        let state = AppState {
            text: ProviderSlot::Missing("GOOGLE_API_KEY"),
            image: ProviderSlot::Missing("OPENAI_API_KEY"),
        };
        let response = router(state)
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    }
}
