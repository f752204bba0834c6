//! Anvil planner Web API
//!
//! Serves a single planning session over REST, plus named recipes
//! persisted in SQLite. The same session logic runs in the browser
//! through the `wasm` feature of anvil-core; this service is for clients
//! that want a shared session or server-side recipe storage.

mod config;
mod error;
mod recipes;

use std::fs;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use anvil_core::session::slot_from_index;
use anvil_core::{
    extract, in_range, AnvilError, Constraint, Move, RuleClass, Session, Snapshot, Validation,
};

use config::ApiConfig;
use error::ApiError;
use recipes::{RecipeStore, Rename};

// =============================================================================
// Shared State
// =============================================================================

struct AppStateInner {
    session: Mutex<Session>,
    recipes: RecipeStore,
}

impl AppStateInner {
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

type AppState = Arc<AppStateInner>;

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Serialize)]
struct RuleModel {
    class: RuleClass,
    constraint: Constraint,
    label: String,
}

#[derive(Serialize)]
struct SessionModel {
    start: i32,
    target: i32,
    done: bool,
    /// Indexed by slot (0 = last); null for empty slots
    rules: Vec<Option<RuleModel>>,
    validation: Validation,
    /// Last three performed moves, oldest first
    recent: Vec<Move>,
    /// Next move first; null when no plan exists
    hints: Option<Vec<Move>>,
}

#[derive(Deserialize)]
struct MoveRequest {
    #[serde(rename = "move")]
    name: String,
}

#[derive(Deserialize)]
struct ProgressRequest {
    start: Option<i32>,
    target: Option<i32>,
}

#[derive(Deserialize)]
struct ScreenshotRequest {
    width: usize,
    height: usize,
    /// Tightly packed RGBA8, row-major
    pixels: Vec<u8>,
}

#[derive(Serialize)]
struct RecipeListModel {
    recipes: Vec<String>,
}

#[derive(Serialize)]
struct RecipeModel {
    name: String,
    snapshot: Snapshot,
}

#[derive(Deserialize)]
struct RenameRequest {
    name: String,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
}

// =============================================================================
// Conversion Functions
// =============================================================================

fn session_to_model(session: &Session) -> SessionModel {
    let rules = session
        .rules()
        .0
        .iter()
        .map(|rule| {
            rule.map(|r| RuleModel {
                class: r.class,
                constraint: r.constraint,
                label: r.label(),
            })
        })
        .collect();

    SessionModel {
        start: session.start(),
        target: session.target(),
        done: session.is_done(),
        rules,
        validation: session.validation().clone(),
        recent: session.recent().to_vec(),
        hints: session.hints().map(|h| h.plan()),
    }
}

fn recipe_name(raw: &str) -> Result<&str, ApiError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Recipe name is empty".to_string()));
    }
    Ok(name)
}

fn check_progress(progress: Option<i32>) -> Result<(), ApiError> {
    match progress {
        Some(p) if !in_range(p) => Err(AnvilError::ProgressOutOfRange(p).into()),
        _ => Ok(()),
    }
}

// =============================================================================
// Session Endpoints
// =============================================================================

async fn get_session(State(state): State<AppState>) -> Json<SessionModel> {
    Json(session_to_model(&state.session()))
}

async fn perform_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<SessionModel>, ApiError> {
    let mut session = state.session();
    if !session.perform_named(&req.name)? {
        info!(mov = %req.name, "move left the range; history cleared");
    }
    Ok(Json(session_to_model(&session)))
}

async fn reset_session(State(state): State<AppState>) -> Json<SessionModel> {
    let mut session = state.session();
    session.reset();
    Json(session_to_model(&session))
}

async fn set_progress(
    State(state): State<AppState>,
    Json(req): Json<ProgressRequest>,
) -> Result<Json<SessionModel>, ApiError> {
    check_progress(req.start)?;
    check_progress(req.target)?;

    let mut session = state.session();
    if let Some(start) = req.start {
        session.set_start(start);
    }
    if let Some(target) = req.target {
        session.set_target(target);
    }
    Ok(Json(session_to_model(&session)))
}

async fn cycle_rule_class(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
) -> Result<Json<SessionModel>, ApiError> {
    let slot = slot_from_index(slot)?;
    let mut session = state.session();
    session.cycle_rule_class(slot);
    Ok(Json(session_to_model(&session)))
}

async fn cycle_rule_constraint(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
) -> Result<Json<SessionModel>, ApiError> {
    let slot = slot_from_index(slot)?;
    let mut session = state.session();
    session.cycle_rule_constraint(slot);
    Ok(Json(session_to_model(&session)))
}

async fn clear_rule(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
) -> Result<Json<SessionModel>, ApiError> {
    let slot = slot_from_index(slot)?;
    let mut session = state.session();
    session.clear_rule(slot);
    Ok(Json(session_to_model(&session)))
}

async fn read_screenshot(
    State(state): State<AppState>,
    Json(req): Json<ScreenshotRequest>,
) -> Result<Json<SessionModel>, ApiError> {
    let found = extract(&req.pixels, req.width, req.height).ok_or_else(|| {
        ApiError::Unprocessable("No progress markers found in screenshot".to_string())
    })?;

    let mut session = state.session();
    session.apply_extracted(found);
    Ok(Json(session_to_model(&session)))
}

// =============================================================================
// Recipe Endpoints
// =============================================================================

async fn list_recipes(State(state): State<AppState>) -> Result<Json<RecipeListModel>, ApiError> {
    Ok(Json(RecipeListModel {
        recipes: state.recipes.list()?,
    }))
}

async fn save_recipe(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RecipeModel>, ApiError> {
    let name = recipe_name(&name)?;
    let snapshot = state.session().snapshot();
    state.recipes.save(name, &snapshot.to_json()?)?;
    info!(recipe = name, "recipe saved");
    Ok(Json(RecipeModel {
        name: name.to_string(),
        snapshot,
    }))
}

async fn load_recipe(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SessionModel>, ApiError> {
    let name = recipe_name(&name)?;
    let stored = state
        .recipes
        .load(name)?
        .ok_or_else(|| ApiError::NotFound(format!("No recipe named {}", name)))?;

    let snapshot = Snapshot::from_json(&stored).map_err(|e| {
        warn!(recipe = name, error = %e, "stored recipe is unreadable");
        ApiError::Unprocessable(format!("Recipe {} is unreadable: {}", name, e))
    })?;

    let mut session = state.session();
    session.restore(&snapshot)?;
    Ok(Json(session_to_model(&session)))
}

async fn rename_recipe(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<RecipeListModel>, ApiError> {
    let from = recipe_name(&name)?;
    let to = recipe_name(&req.name)?;

    match state.recipes.rename(from, to)? {
        Rename::Renamed => info!(from, to, "recipe renamed"),
        Rename::Missing => return Err(ApiError::NotFound(format!("No recipe named {}", from))),
        Rename::Taken => return Err(ApiError::BadRequest(format!("Recipe {} already exists", to))),
    }

    Ok(Json(RecipeListModel {
        recipes: state.recipes.list()?,
    }))
}

async fn delete_recipe(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let name = recipe_name(&name)?;
    if !state.recipes.delete(name)? {
        return Err(ApiError::NotFound(format!("No recipe named {}", name)));
    }
    info!(recipe = name, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

// =============================================================================
// Main
// =============================================================================

fn router(state: AppState, cors_any: bool) -> Router {
    let cors = if cors_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/session", get(get_session))
        .route("/move", post(perform_move))
        .route("/reset", post(reset_session))
        .route("/progress", post(set_progress))
        .route("/rules/{slot}/class", post(cycle_rule_class))
        .route("/rules/{slot}/constraint", post(cycle_rule_constraint))
        .route("/rules/{slot}", delete(clear_rule))
        .route("/screenshot", post(read_screenshot))
        .route("/recipes", get(list_recipes))
        .route("/recipes/{name}", put(save_recipe).delete(delete_recipe))
        .route("/recipes/{name}/load", post(load_recipe))
        .route("/recipes/{name}/rename", post(rename_recipe))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::locate()?;
    info!(?config, "configuration loaded");

    if let Some(dir) = config.database.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let recipes = RecipeStore::open(&config.database)?;
    info!(path = ?config.database, "recipe store opened");

    let state: AppState = Arc::new(AppStateInner {
        session: Mutex::new(Session::new()),
        recipes,
    });

    let app = router(state, config.cors_any);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!(addr = %config.bind, "anvil API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
