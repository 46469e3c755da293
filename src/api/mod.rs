use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse, Json, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::{Stream, stream};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    RoadwatchError,
    error::LocationError,
    hotspots::HotspotPanel,
    location::LocationReporter,
    models::Coordinate,
    session::{SessionHandle, SessionView},
};

#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
    /// Present only when the position comes from the page
    pub location: Option<Arc<LocationReporter>>,
}

#[derive(Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Serialize, Deserialize)]
pub struct ZoomRequest {
    pub zoom: u8,
}

/// What the page learned from the browser's geolocation API
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationReport {
    Position { latitude: f64, longitude: f64 },
    Failure { error: LocationError },
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Conflict(String),
    Unavailable(String),
}

impl From<RoadwatchError> for ApiError {
    fn from(error: RoadwatchError) -> Self {
        match error {
            RoadwatchError::Validation { .. } => Self::BadRequest(error.user_message()),
            _ => Self::Unavailable(error.user_message()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Conflict(message) => (StatusCode::CONFLICT, message),
            Self::Unavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/session", post(mount_page))
        .route("/view", get(get_view))
        .route("/events", get(view_events))
        .route("/search", post(submit_search))
        .route("/location", post(report_location))
        .route("/zoom", post(set_zoom))
        .route("/hotspots", get(get_hotspots))
        .with_state(state)
}

/// Called by every page load. Resets the shared session and accepts a new
/// location report.
async fn mount_page(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    if let Some(reporter) = &state.location {
        reporter.rearm();
    }
    state.session.mount().await?;
    info!("Page mounted");
    Ok(StatusCode::ACCEPTED)
}

async fn get_view(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.current_view())
}

/// Stream the current view immediately, then one event per change
async fn view_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    debug!("View subscriber connected");
    let receiver = state.session.subscribe();

    let views = stream::unfold((receiver, true), |(mut receiver, first)| async move {
        if !first && receiver.changed().await.is_err() {
            return None;
        }
        let view = receiver.borrow_and_update().clone();
        let event = Event::default().event("view").json_data(&view);
        Some((event, (receiver, false)))
    });

    Sse::new(views).keep_alive(KeepAlive::default())
}

async fn submit_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<StatusCode, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Please enter a location to search for".to_string(),
        ));
    }

    state.session.search(request.query).await?;
    Ok(StatusCode::ACCEPTED)
}

async fn report_location(
    State(state): State<AppState>,
    Json(report): Json<LocationReport>,
) -> Result<StatusCode, ApiError> {
    let Some(reporter) = &state.location else {
        return Err(ApiError::Conflict(
            "Location is fixed by the server configuration".to_string(),
        ));
    };

    let outcome = match report {
        LocationReport::Position {
            latitude,
            longitude,
        } => Ok(Coordinate::new(latitude, longitude)?),
        LocationReport::Failure { error } => Err(error),
    };

    if reporter.report(outcome) {
        info!("Browser location reported");
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(ApiError::Conflict(
            "Location was already reported for this page load".to_string(),
        ))
    }
}

async fn set_zoom(
    State(state): State<AppState>,
    Json(request): Json<ZoomRequest>,
) -> Result<StatusCode, ApiError> {
    state.session.set_zoom(request.zoom).await?;
    Ok(StatusCode::ACCEPTED)
}

async fn get_hotspots(State(state): State<AppState>) -> Json<HotspotPanel> {
    Json(state.session.current_view().hotspots)
}
