use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use application::DeviceUpdate;
use domain::device::{DeviceConfiguration, Location};
use domain::installation::{InstallationProcessState, InstallationState};
use domain::{DomainError, IntervalRules};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::protocols::{BootNotificationResponse, iot16, iot20};
use crate::state::AppState;

pub const INTERVAL_RULES_PATH: &str = "/configs/IntervalRules";

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/installations", get(find_installations))
        .route(
            "/installations/{order_id}",
            get(get_installation).patch(patch_installation),
        )
        .route("/devices", get(find_devices))
        .route("/devices/{device_id}", get(get_device).patch(patch_device))
        .route("/devices/{device_id}/details", get(get_device_details))
        .route(
            INTERVAL_RULES_PATH,
            get(get_interval_rules).put(put_interval_rules),
        )
        .route("/protocols/iot16/{device_id}/boot", post(iot16_boot))
        .route("/protocols/iot16/{device_id}/status", post(iot16_status))
        .route("/protocols/iot20/{device_id}/boot", post(iot20_boot))
        .route("/protocols/iot20/{device_id}/status", post(iot20_status))
        .layer(cors)
        .with_state(state)
}

/// Domain failure rendered as a JSON error body
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::InvalidTransition { .. }
            | DomainError::AlreadyExists(_)
            | DomainError::VersionConflict { .. } => StatusCode::CONFLICT,
            DomainError::MalformedMessage(_) | DomainError::InvalidConfiguration(_) => {
                StatusCode::BAD_REQUEST
            }
            DomainError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self.0 {
            // Storage details stay in the log
            DomainError::Repository(e) => {
                error!(error = %e, "Request failed on storage");
                "Internal server error".to_string()
            }
            e => e.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
struct StateFilter {
    /// Comma separated, e.g. `PENDING,BOOTED`
    state: Option<String>,
}

fn parse_states(filter: Option<&str>) -> Result<Vec<InstallationState>, DomainError> {
    filter
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<InstallationState>())
        .collect()
}

async fn find_installations(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<StateFilter>,
) -> ApiResult<Vec<InstallationProcessState>> {
    let states = parse_states(filter.state.as_deref())?;
    Ok(Json(state.installations.find_by_states(&states).await?))
}

async fn get_installation(
    Path(order_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<InstallationProcessState> {
    Ok(Json(state.installations.get_by_order_id(&order_id).await?))
}

/// One installer action per request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationCommand {
    #[serde(default)]
    pub assign_device: Option<String>,
    #[serde(default)]
    pub assign_location: Option<Location>,
    #[serde(default)]
    pub confirm_boot: bool,
    #[serde(default)]
    pub complete: bool,
}

impl InstallationCommand {
    fn count(&self) -> usize {
        [
            self.assign_device.is_some(),
            self.assign_location.is_some(),
            self.confirm_boot,
            self.complete,
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

async fn patch_installation(
    Path(order_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(command): Json<InstallationCommand>,
) -> ApiResult<InstallationProcessState> {
    if command.count() != 1 {
        return Err(DomainError::MalformedMessage(
            "Exactly one of assignDevice, assignLocation, confirmBoot, complete is required"
                .to_string(),
        )
        .into());
    }

    let installations = &state.installations;
    let view = if let Some(device_id) = command.assign_device {
        installations.assign_device(&order_id, &device_id).await?
    } else if let Some(location) = command.assign_location {
        installations.assign_location(&order_id, location).await?
    } else if command.confirm_boot {
        installations.confirm_boot_data(&order_id).await?
    } else {
        installations.complete(&order_id).await?;
        installations.get_by_order_id(&order_id).await?
    };
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
struct OperatorFilter {
    operator: Option<String>,
}

async fn find_devices(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<OperatorFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let operator = filter
        .operator
        .filter(|o| !o.trim().is_empty())
        .ok_or_else(|| DomainError::MalformedMessage("operator is required".to_string()))?;
    Ok(Json(state.devices_read_model.query_by_operator(&operator)))
}

async fn get_device(
    Path(device_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<DeviceConfiguration> {
    Ok(Json(state.devices.get(&device_id).await?))
}

async fn patch_device(
    Path(device_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<DeviceUpdate>,
) -> ApiResult<DeviceConfiguration> {
    Ok(Json(state.devices.update(&device_id, update).await?))
}

async fn get_device_details(
    Path(device_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .devices_read_model
        .query_details(&device_id)
        .map(Json)
        .ok_or_else(|| DomainError::NotFound(device_id).into())
}

async fn get_interval_rules(State(state): State<Arc<AppState>>) -> Json<IntervalRules> {
    Json(state.intervals.get().await)
}

async fn put_interval_rules(
    State(state): State<Arc<AppState>>,
    Json(rules): Json<IntervalRules>,
) -> ApiResult<IntervalRules> {
    let snapshot = state.intervals.replace(rules).await?;
    Ok(Json(snapshot.rules.as_ref().clone()))
}

async fn iot16_boot(
    Path(device_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<iot16::BootNotificationRequest>,
) -> Json<BootNotificationResponse> {
    let response = state
        .communication
        .handle_boot(request.to_boot(&device_id))
        .await;
    Json(response.into())
}

async fn iot16_status(
    Path(device_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<iot16::StatusNotificationRequest>,
) -> StatusCode {
    state
        .communication
        .handle_status(request.to_statuses(&device_id))
        .await;
    StatusCode::OK
}

async fn iot20_boot(
    Path(device_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<iot20::BootNotificationRequest>,
) -> Json<BootNotificationResponse> {
    let response = state
        .communication
        .handle_boot(request.to_boot(&device_id))
        .await;
    Json(response.into())
}

async fn iot20_status(
    Path(device_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<iot20::StatusNotificationRequest>,
) -> StatusCode {
    state
        .communication
        .handle_status(request.to_statuses(&device_id))
        .await;
    StatusCode::OK
}
