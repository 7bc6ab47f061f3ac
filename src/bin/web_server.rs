//! Web server for the image export API

use axum::{
    extract::{multipart::Multipart, DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use clap::Parser;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use stego_container::common::config::{FormatConfig, StegoConfig};
use stego_container::common::logging::init_logger;
use stego_container::processing::{
    decode, embed_in_canvas, encode, load_carrier, to_data_url, to_png_bytes, CanvasConfig,
    CapacityReport, ContainerFormat, FormatVariant, RasterImage, StegoError,
};

/// Command-line arguments for the web server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (TOML format)
    #[arg(short, long, default_value = "config/stego.toml")]
    config: String,
}

#[derive(Serialize)]
struct EncodeResponse {
    success: bool,
    message: String,
    width: u32,
    height: u32,
    image_base64: String,
}

#[derive(Serialize)]
struct DecodeResponse {
    success: bool,
    /// Payload as text (invalid UTF-8 replaced)
    payload: String,
    payload_base64: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

struct AppState {
    format: FormatConfig,
    canvas: CanvasConfig,
}

/// Fields collected from a multipart request.
#[derive(Default)]
struct Upload {
    payload: Option<Vec<u8>>,
    carrier: Option<Vec<u8>>,
    icon: Option<Vec<u8>>,
    image: Option<Vec<u8>>,
    format: Option<FormatVariant>,
    payload_len: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();

    info!("🚀 Initializing web server...");

    let config = StegoConfig::load_or_default(Some(args.config.as_str()))?;
    info!("Default container format: {}", config.format.to_format()?);
    let state = Arc::new(AppState {
        format: config.format.clone(),
        canvas: config.canvas.clone(),
    });

    let app = Router::new()
        .route("/api/encode", post(encode_handler))
        .route("/api/decode", post(decode_handler))
        .route("/api/capacity", post(capacity_handler))
        .route("/api/health", get(health_check))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = config.server.address.as_str();
    info!("🌐 Web server running on http://{}", addr);
    info!("📡 API endpoints: /api/encode, /api/decode, /api/capacity");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "stego-container",
        "formats": ["rgb_lsb", "alpha_magic"]
    }))
}

fn bad_request(message: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
}

/// Map codec failures to HTTP status codes.
fn codec_error(e: StegoError) -> ApiError {
    let status = match &e {
        StegoError::CarrierLoad(_) => StatusCode::BAD_REQUEST,
        StegoError::CapacityExceeded { .. }
        | StegoError::FormatMismatch(_)
        | StegoError::TruncatedPayload { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        StegoError::ImageWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!("❌ Request failed: {}", e);
    (status, Json(ErrorResponse { error: e.to_string() }))
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut upload = Upload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("Failed to read field '{}': {}", name, e)))?;

        match name.as_str() {
            "payload" => upload.payload = Some(data.to_vec()),
            "carrier" => upload.carrier = Some(data.to_vec()),
            "icon" => upload.icon = Some(data.to_vec()),
            "image" => upload.image = Some(data.to_vec()),
            "format" => {
                let text = String::from_utf8_lossy(&data);
                upload.format = Some(text.parse().map_err(bad_request)?);
            }
            "payload_len" => {
                let text = String::from_utf8_lossy(&data);
                upload.payload_len = Some(
                    text.trim()
                        .parse()
                        .map_err(|e| bad_request(format!("Invalid payload_len: {}", e)))?,
                );
            }
            other => warn!("Ignoring unknown field '{}'", other),
        }
    }

    Ok(upload)
}

/// Requested layout; the configured magic is kept for alpha_magic.
fn requested_format(
    state: &AppState,
    variant: Option<FormatVariant>,
) -> Result<ContainerFormat, ApiError> {
    state
        .format
        .resolve(variant)
        .map_err(|e| bad_request(format!("Invalid container format: {}", e)))
}

async fn encode_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let upload = read_upload(multipart).await?;
    let format = requested_format(&state, upload.format)?;

    let payload = upload
        .payload
        .ok_or_else(|| bad_request("No payload provided".to_string()))?;

    info!("📤 Received payload: {} bytes ({})", payload.len(), format);

    let stego: RasterImage = match upload.carrier {
        Some(bytes) => {
            let carrier = load_carrier(&bytes).map_err(codec_error)?;
            encode(carrier, &payload, &format).map_err(codec_error)?
        }
        None => {
            let icon = upload
                .icon
                .map(|bytes| load_carrier(&bytes))
                .transpose()
                .map_err(codec_error)?;
            embed_in_canvas(icon.as_ref(), &payload, &format, &state.canvas)
                .map_err(codec_error)?
        }
    };

    let png = to_png_bytes(&stego).map_err(|e| {
        error!("❌ PNG encoding failed: {}", e);
        codec_error(e)
    })?;

    info!("✅ Payload hidden, PNG size: {} bytes", png.len());

    Ok((
        StatusCode::OK,
        Json(EncodeResponse {
            success: true,
            message: format!("Hid {} bytes ({})", payload.len(), format),
            width: stego.width(),
            height: stego.height(),
            image_base64: to_data_url(&png),
        }),
    ))
}

async fn decode_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let upload = read_upload(multipart).await?;
    let format = requested_format(&state, upload.format)?;

    let bytes = upload
        .image
        .ok_or_else(|| bad_request("No image provided".to_string()))?;
    let image = load_carrier(&bytes).map_err(codec_error)?;
    let payload = decode(&image, &format).map_err(codec_error)?;

    info!("✅ Recovered {} bytes ({})", payload.len(), format);

    Ok(Json(DecodeResponse {
        success: true,
        payload: String::from_utf8_lossy(&payload).into_owned(),
        payload_base64: general_purpose::STANDARD.encode(&payload),
    }))
}

async fn capacity_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let upload = read_upload(multipart).await?;
    let format = requested_format(&state, upload.format)?;

    let report = match upload.carrier.or(upload.image) {
        Some(bytes) => {
            let image = load_carrier(&bytes).map_err(codec_error)?;
            CapacityReport::for_image(&image, &format, upload.payload_len)
        }
        None => CapacityReport::new(state.canvas.size, state.canvas.size, &format, upload.payload_len),
    };

    Ok(Json(report))
}
