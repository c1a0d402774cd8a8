use crate::{
    config::{ApiVariant, Config},
    error::GatewayError,
    gateway::{GenerationOutcome, ImageGateway},
    imaging::PNG_MIME_TYPE,
    models::{ErrorResponse, GenerationRequest, HealthResponse, ResponsePayload},
};
use actix_cors::Cors;
use actix_web::{
    http::StatusCode, middleware, web, App, HttpResponse, HttpServer, Responder,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct AppState {
    pub gateway: Arc<ImageGateway>,
}

impl AppState {
    pub fn new(gateway: ImageGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}

/// Routes are registered without a trailing slash; [`middleware::NormalizePath`]
/// maps `/generate-image/` onto them.
pub fn normalize_path() -> middleware::NormalizePath {
    middleware::NormalizePath::trim()
}

/// Every origin, method and header is allowed, with credentials. Local and
/// development use only; restrict before exposing publicly.
pub fn cors() -> Cors {
    Cors::permissive()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/generate-image", web::post().to(generate_image))
        .route("/generate-image/file", web::post().to(generate_image_file))
        .route("/health", web::get().to(health));
}

pub async fn run(config: &Config, state: AppState) -> std::io::Result<()> {
    let state = web::Data::new(state);
    let address = config.bind_address();

    HttpServer::new(move || {
        App::new()
            .wrap(normalize_path())
            .wrap(cors())
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(&address)?
    .run()
    .await
}

/// Renders a failure in the configured variant's error shape.
pub fn error_response(variant: ApiVariant, err: &GatewayError) -> HttpResponse {
    match variant {
        ApiVariant::Simple => {
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            HttpResponse::build(status).json(ErrorResponse {
                error: err.to_string(),
            })
        }
        ApiVariant::Parameterized => {
            let status = if err.is_client_error() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            HttpResponse::build(status)
                .content_type("text/plain; charset=utf-8")
                .body(err.detail())
        }
    }
}

fn parse_body(body: &[u8]) -> Result<GenerationRequest, GatewayError> {
    serde_json::from_slice(body).map_err(|e| GatewayError::InvalidRequest(e.to_string()))
}

async fn run_pipeline(state: &AppState, body: &[u8]) -> Result<GenerationOutcome, GatewayError> {
    let request_id = Uuid::new_v4();
    log::info!("Request received [req:{}]", request_id);

    let result = match parse_body(body) {
        Ok(request) => state.gateway.handle(request).await,
        Err(e) => Err(e),
    };

    match &result {
        Ok(outcome) => log::info!(
            "Request completed [req:{}] enhanced={}",
            request_id,
            outcome.enhanced
        ),
        Err(e) if e.is_client_error() => {
            log::warn!("Request rejected [req:{}]: {}", request_id, e)
        }
        Err(e) => log::error!("Request failed [req:{}]: {}", request_id, e),
    }
    result
}

async fn generate_image(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let variant = state.gateway.variant();
    match run_pipeline(&state, &body).await {
        Ok(outcome) => HttpResponse::Ok().json(ResponsePayload::from_outcome(variant, &outcome)),
        Err(e) => error_response(variant, &e),
    }
}

async fn generate_image_file(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let variant = state.gateway.variant();
    match run_pipeline(&state, &body).await {
        Ok(outcome) => HttpResponse::Ok()
            .content_type(PNG_MIME_TYPE)
            .body(outcome.image.png),
        Err(e) => error_response(variant, &e),
    }
}

async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        variant: state.gateway.variant().as_str(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
