//! HTTP surface: the page shell, the consolidated dataset and the
//! interaction endpoint.

use std::sync::Arc;

use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use timeline_types::TimelineData;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::Settings;
use crate::view::{Interaction, TimelineController, Update, View};

const INDEX_HTML: &str = include_str!("../assets/index.html");

pub struct AppState {
    pub data: Arc<TimelineData>,
    /// One shared view; interactions are applied one at a time.
    pub controller: Mutex<TimelineController>,
}

impl AppState {
    pub fn new(data: TimelineData) -> Self {
        let data = Arc::new(data);
        let controller = Mutex::new(TimelineController::new(Arc::clone(&data)));
        AppState { data, controller }
    }
}

pub async fn serve(settings: &Settings, data: TimelineData) -> anyhow::Result<()> {
    let addr = settings.socket_addr()?;
    let app = build_router(Arc::new(AppState::new(data)));

    info!(%addr, "timeline server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/data/timeline_data.json", get(dataset))
        .route("/api/view", get(view))
        .route("/api/interact", post(interact))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn dataset(State(state): State<Arc<AppState>>) -> Json<TimelineData> {
    Json(TimelineData::clone(&state.data))
}

async fn view(State(state): State<Arc<AppState>>) -> Json<View> {
    Json(state.controller.lock().await.render())
}

async fn interact(
    State(state): State<Arc<AppState>>,
    Json(interaction): Json<Interaction>,
) -> Json<Update> {
    debug!(?interaction, "interaction");
    Json(state.controller.lock().await.dispatch(interaction))
}
