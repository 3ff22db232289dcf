// src/server.rs
// HTTP control surface. Handlers hold only an AnimationHandle: every read and write goes
// through the animation loop's command channel.

use crate::animation::AnimationHandle;
use crate::error::{FormError, ImageRefError, LoopClosed, RenderError};
use crate::form::FieldId;
use crate::playback::{PlaybackState, ToggleOutcome};
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Closed(#[from] LoopClosed),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("trajectory image unavailable: {0}")]
    TrajectoryImage(#[from] ImageRefError),

    #[error("no trajectory image yet")]
    NoTrajectoryImage,

    #[error("worker pool error: {0}")]
    Blocking(#[from] BlockingError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Form(FormError::UnknownField(_)) => StatusCode::NOT_FOUND,
            ApiError::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NoTrajectoryImage => StatusCode::NOT_FOUND,
            ApiError::TrajectoryImage(_) => StatusCode::BAD_GATEWAY,
            ApiError::Closed(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Render(_) | ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
pub struct ChainLengthBody {
    n: usize, // Number of links
}

#[derive(Deserialize)]
pub struct FieldBody {
    value: f64,
}

#[derive(Deserialize)]
pub struct ResizeBody {
    width: u32, // Container width in pixels
}

#[derive(Serialize)]
struct RunStarted {
    generation: u64,
}

#[derive(Serialize)]
struct ToggleBody {
    state: PlaybackState,
    run_requested: bool,
}

type Handle = web::Data<AnimationHandle>;

/// Registers every control-surface route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/state", web::get().to(state_handler))
        .route("/chain-length", web::put().to(chain_length_handler))
        .route("/fields/{id}", web::put().to(field_handler))
        .route("/run", web::post().to(run_handler))
        .route("/toggle", web::post().to(toggle_handler))
        .route("/reset", web::post().to(reset_handler))
        .route("/resize", web::post().to(resize_handler))
        .route("/frame.png", web::get().to(frame_handler))
        .route("/trajectory.png", web::get().to(trajectory_handler));
}

pub async fn state_handler(handle: Handle) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(handle.snapshot().await?))
}

pub async fn chain_length_handler(
    handle: Handle,
    body: web::Json<ChainLengthBody>,
) -> Result<HttpResponse, ApiError> {
    let fields = handle.set_chain_length(body.n).await??;
    Ok(HttpResponse::Ok().json(fields))
}

pub async fn field_handler(
    handle: Handle,
    path: web::Path<String>,
    body: web::Json<FieldBody>,
) -> Result<HttpResponse, ApiError> {
    let id: FieldId = path.into_inner().parse()?;
    handle.set_field(id, body.value).await??;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn run_handler(handle: Handle) -> Result<HttpResponse, ApiError> {
    let generation = handle.run().await??;
    Ok(HttpResponse::Accepted().json(RunStarted { generation }))
}

pub async fn toggle_handler(handle: Handle) -> Result<HttpResponse, ApiError> {
    let body = match handle.toggle_play_pause().await? {
        ToggleOutcome::Switched(state) => ToggleBody {
            state,
            run_requested: false,
        },
        ToggleOutcome::RunRequested => ToggleBody {
            state: PlaybackState::Idle,
            run_requested: true,
        },
    };
    Ok(HttpResponse::Ok().json(body))
}

pub async fn reset_handler(handle: Handle) -> Result<HttpResponse, ApiError> {
    handle.reset()?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn resize_handler(
    handle: Handle,
    body: web::Json<ResizeBody>,
) -> Result<HttpResponse, ApiError> {
    handle.resize(body.width)?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn frame_handler(handle: Handle) -> Result<HttpResponse, ApiError> {
    let surface = handle.frame().await?;
    let png = web::block(move || surface.encode_png()).await??;
    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}

pub async fn trajectory_handler(handle: Handle) -> Result<HttpResponse, ApiError> {
    let image = handle
        .trajectory_image()
        .await?
        .ok_or(ApiError::NoTrajectoryImage)?;
    let decoded = image.decode()?;
    Ok(HttpResponse::Ok()
        .content_type(decoded.format.to_mime_type())
        .body(decoded.bytes))
}
