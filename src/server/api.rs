use crate::agent::{ AgentConfiguration, AgentError, Delegate };
use crate::models::chat::{ ChatRequest, ChatResponse, HealthResponse, RequestError };
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    body::Bytes,
    extract::{ Request, State },
    middleware::{ self, Next },
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use serde_json::Value;
use tower_http::cors::{ Any, CorsLayer };
use thiserror::Error;
use log::{ info, error, debug };

pub const PROCESSING_FAILED: &str = "Failed to process request";

#[derive(Clone)]
pub struct AppState {
    pub delegate: Arc<dyn Delegate>,
    pub service_name: String,
}

/// Failure of a single `/chat` request, mapped to the wire shape in `into_response`.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Invalid(#[from] RequestError),
    #[error(transparent)]
    Delegate(#[from] AgentError),
}

impl RelayError {
    fn status(&self) -> StatusCode {
        match self {
            RelayError::Invalid(_) => StatusCode::BAD_REQUEST,
            RelayError::Delegate(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            RelayError::Invalid(e) =>
                ChatResponse::Failure {
                    error: e.to_string(),
                    details: None,
                },
            RelayError::Delegate(e) =>
                ChatResponse::Failure {
                    error: PROCESSING_FAILED.to_string(),
                    details: Some(e.to_string()),
                },
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .layer(middleware::from_fn(log_request_info))
        .layer(cors)
        .with_state(state)
}

async fn log_request_info(req: Request, next: Next) -> Response {
    debug!("{} {} Headers: {:?}", req.method(), req.uri(), req.headers());
    next.run(req).await
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse::healthy(&state.service_name))
}

async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Response {
    info!("Received chat request");
    debug!("Body: {}", String::from_utf8_lossy(&body));

    match process_chat(state.delegate.as_ref(), &body).await {
        Ok(response) => {
            info!("Successfully generated AI response");
            (StatusCode::OK, Json(ChatResponse::Success { response })).into_response()
        }
        Err(e) => {
            match &e {
                RelayError::Invalid(reason) => error!("Rejected chat request: {}", reason),
                RelayError::Delegate(cause) => error!("Error in chat endpoint: {:?}", cause),
            }
            e.into_response()
        }
    }
}

/// validate -> normalize -> delegate. Nothing reaches the delegate unless the
/// body passes validation.
pub async fn process_chat(delegate: &dyn Delegate, body: &[u8]) -> Result<String, RelayError> {
    let data: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(body).map_err(|_| RequestError::NoData)?
    };
    let request = ChatRequest::from_json(&data)?;
    debug!("Processing request with data: {:?}", request);

    let config = AgentConfiguration::from(&request);
    Ok(delegate.respond(&config).await?)
}
