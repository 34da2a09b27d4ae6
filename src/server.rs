use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::{header, StatusCode},
    web, App, HttpRequest, HttpResponse, HttpServer, ResponseError,
};

pub use crate::config::TRY_ON_PATH;

use crate::{
    config::ServerConfig,
    error::TryOnError,
    gemini::GeminiClient,
    models::{ErrorBody, GenerationRequest, TryOnRequest, TryOnResponse},
};

impl ResponseError for TryOnError {
    fn status_code(&self) -> StatusCode {
        match self {
            TryOnError::ValidationError(_) => StatusCode::BAD_REQUEST,
            TryOnError::UpstreamError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            TryOnError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            TryOnError::ValidationError(msg) => ErrorBody {
                error: msg.clone(),
                details: None,
            },
            TryOnError::ConfigError(msg) => ErrorBody {
                error: msg.clone(),
                details: None,
            },
            TryOnError::UpstreamError { details, .. } => ErrorBody {
                error: "Gemini request failed".to_string(),
                details: Some(details.clone()),
            },
            TryOnError::EmptyResult => ErrorBody {
                error: "No image returned from Gemini response.".to_string(),
                details: None,
            },
            TryOnError::Timeout(_) => ErrorBody {
                error: "Image generation timed out.".to_string(),
                details: None,
            },
            _ => ErrorBody {
                error: "Failed to generate image.".to_string(),
                details: None,
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

async fn try_on(
    client: web::Data<GeminiClient>,
    body: web::Json<TryOnRequest>,
) -> Result<HttpResponse, TryOnError> {
    let request = GenerationRequest::from_wire(body.into_inner()).map_err(|e| {
        log::warn!("Rejected try-on request: {}", e);
        e
    })?;

    match client.generate(request).await {
        Ok(image) => Ok(HttpResponse::Ok().json(TryOnResponse {
            output_image: image.data,
        })),
        Err(e) => {
            log::error!("Try-on generation failed: {}", e);
            Err(e)
        }
    }
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, "POST"))
        .json(ErrorBody {
            error: "Method not allowed".to_string(),
            details: None,
        })
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = match &err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            HttpResponse::PayloadTooLarge().json(ErrorBody {
                error: "Request body too large.".to_string(),
                details: None,
            })
        }
        other => HttpResponse::BadRequest().json(ErrorBody {
            error: "Invalid request body.".to_string(),
            details: Some(other.to_string()),
        }),
    };
    InternalError::from_response(err, response).into()
}

/// Registers the proxy routes; shared by the binary and the tests.
pub fn configure(
    client: GeminiClient,
    body_limit_bytes: usize,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(client))
            .app_data(
                web::JsonConfig::default()
                    .limit(body_limit_bytes)
                    .error_handler(json_error),
            )
            .service(
                web::resource(TRY_ON_PATH)
                    .route(web::post().to(try_on))
                    .default_service(web::route().to(method_not_allowed)),
            )
            .route("/health", web::get().to(health));
    }
}

pub async fn serve(config: &ServerConfig, client: GeminiClient) -> std::io::Result<()> {
    let body_limit = config.body_limit_bytes;
    HttpServer::new(move || App::new().configure(configure(client.clone(), body_limit)))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
