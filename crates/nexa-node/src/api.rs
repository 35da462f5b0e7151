//! HTTP API for the node.

use crate::node::NodeState;
use crate::record::StoredProfile;
use crate::sessions::SessionRegistry;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use nexa_profile::{
    BlockId, BlockState, FormSnapshot, ProfileForm, ProfileId, Progress, Skill, SpecializationLabel,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

type AppState = Arc<RwLock<NodeState>>;

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    // CORS layer for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/health", get(health))
        // Form sessions
        .route("/api/v1/profile-forms", post(create_form))
        .route("/api/v1/profile-forms/:id", get(get_form).delete(delete_form))
        .route("/api/v1/profile-forms/:id/fields", axum::routing::patch(update_field))
        .route("/api/v1/profile-forms/:id/blocks/:number/errors", get(block_errors))
        .route("/api/v1/profile-forms/:id/blocks/:number/complete", post(complete_block))
        .route("/api/v1/profile-forms/:id/reset", post(reset_form))
        .route("/api/v1/profile-forms/:id/submit", post(submit_form))
        .route("/api/v1/profile-forms/:id/edit/:profile_id", post(edit_profile))
        // Profiles
        .route("/api/v1/profiles", get(list_profiles))
        .route("/api/v1/profiles/:id", get(get_profile))
        // Lookups
        .route("/api/v1/skills", get(list_skills))
        .route("/api/v1/specializations", get(list_specializations))
        .route("/api/v1/uploads/check", post(check_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// --- Errors ---

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ValidationError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing: Vec<BlockId>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
            errors: Vec::new(),
            missing: Vec::new(),
        }),
    )
}

fn storage_error(e: crate::error::Error) -> ApiError {
    tracing::error!("storage error: {}", e);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable")
}

fn profile_error(e: nexa_profile::Error) -> ApiError {
    let message = e.to_string();
    match e {
        nexa_profile::Error::UnknownField { .. } | nexa_profile::Error::InvalidValue { .. } => {
            api_error(StatusCode::BAD_REQUEST, message)
        }
        nexa_profile::Error::NotSubmittable { missing } => (
            StatusCode::CONFLICT,
            Json(ErrorBody {
                error: message,
                errors: Vec::new(),
                missing,
            }),
        ),
        nexa_profile::Error::Rejected { errors } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody {
                error: message,
                errors,
                missing: Vec::new(),
            }),
        ),
        nexa_profile::Error::Submission(_) => api_error(StatusCode::SERVICE_UNAVAILABLE, message),
    }
}

fn session<'a>(sessions: &'a SessionRegistry, id: &str) -> Result<&'a ProfileForm, ApiError> {
    sessions
        .get(id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("no form session {id}")))
}

fn session_mut<'a>(sessions: &'a mut SessionRegistry, id: &str) -> Result<&'a mut ProfileForm, ApiError> {
    sessions
        .get_mut(id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("no form session {id}")))
}

fn block_number(number: u32) -> Result<BlockId, ApiError> {
    BlockId::from_number(number)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("no block {number}")))
}

// --- Health endpoints ---

async fn health() -> &'static str {
    "OK"
}

// --- Form session endpoints ---

#[derive(Debug, Serialize)]
struct BlockView {
    block: BlockId,
    number: u32,
    required: bool,
    state: BlockState,
}

#[derive(Debug, Serialize)]
struct FormView {
    session_id: String,
    profile_id: Option<ProfileId>,
    snapshot: FormSnapshot,
    progress: Progress,
    blocks: Vec<BlockView>,
    server_errors: Vec<ValidationError>,
}

fn form_view(id: &str, form: &ProfileForm) -> FormView {
    FormView {
        session_id: id.to_string(),
        profile_id: form.profile_id().cloned(),
        snapshot: form.snapshot().clone(),
        progress: form.progress(),
        blocks: BlockId::ALL
            .into_iter()
            .map(|block| BlockView {
                block,
                number: block.number(),
                required: block.is_required(),
                state: form.block_state(block),
            })
            .collect(),
        server_errors: form.server_errors().to_vec(),
    }
}

async fn create_form(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<FormView>), ApiError> {
    let mut state = state.write().await;
    let id = state.sessions.create().ok_or_else(|| {
        api_error(StatusCode::SERVICE_UNAVAILABLE, "too many open form sessions")
    })?;
    let form = session(&state.sessions, &id)?;
    Ok((StatusCode::CREATED, Json(form_view(&id, form))))
}

async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FormView>, ApiError> {
    let state = state.read().await;
    let form = session(&state.sessions, &id)?;
    Ok(Json(form_view(&id, form)))
}

async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> StatusCode {
    let mut state = state.write().await;
    if state.sessions.remove(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

#[derive(Debug, Deserialize)]
struct UpdateFieldRequest {
    block: BlockId,
    field: String,
    value: serde_json::Value,
}

async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateFieldRequest>,
) -> Result<Json<FormView>, ApiError> {
    let mut state = state.write().await;
    let form = session_mut(&mut state.sessions, &id)?;
    form.update_field(req.block, &req.field, req.value)
        .map_err(profile_error)?;
    Ok(Json(form_view(&id, form)))
}

async fn block_errors(
    State(state): State<AppState>,
    Path((id, number)): Path<(String, u32)>,
) -> Result<Json<Vec<ValidationError>>, ApiError> {
    let state = state.read().await;
    let form = session(&state.sessions, &id)?;
    Ok(Json(form.validate_block_number(number)))
}

async fn complete_block(
    State(state): State<AppState>,
    Path((id, number)): Path<(String, u32)>,
) -> Result<Json<Progress>, ApiError> {
    let block = block_number(number)?;
    let mut state = state.write().await;
    let form = session_mut(&mut state.sessions, &id)?;
    form.complete_block(block);
    Ok(Json(form.progress()))
}

async fn reset_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FormView>, ApiError> {
    let mut state = state.write().await;
    let form = session_mut(&mut state.sessions, &id)?;
    form.reset();
    Ok(Json(form_view(&id, form)))
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    profile_id: ProfileId,
}

async fn submit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let mut state = state.write().await;
    let storage = Arc::clone(&state.storage);
    let form = session_mut(&mut state.sessions, &id)?;
    let profile_id = form.submit(storage.as_ref()).map_err(profile_error)?;
    Ok(Json(SubmitResponse { profile_id }))
}

async fn edit_profile(
    State(state): State<AppState>,
    Path((id, profile_id)): Path<(String, String)>,
) -> Result<Json<FormView>, ApiError> {
    let mut state = state.write().await;
    let profile = state
        .storage
        .get_profile(&profile_id)
        .map_err(storage_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("no profile {profile_id}")))?;

    let form = session_mut(&mut state.sessions, &id)?;
    form.load_profile(profile.profile_id(), profile.snapshot, profile.completed);
    Ok(Json(form_view(&id, form)))
}

// --- Profile endpoints ---

#[derive(Debug, Serialize)]
struct ProfileResponse {
    #[serde(flatten)]
    profile: StoredProfile,
    specialization_labels: Vec<String>,
    ability_labels: Vec<String>,
}

async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredProfile>>, ApiError> {
    let state = state.read().await;
    let profiles = state.storage.list_profiles().map_err(storage_error)?;
    Ok(Json(profiles))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let state = state.read().await;
    let profile = state
        .storage
        .get_profile(&id)
        .map_err(storage_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("no profile {id}")))?;

    let specialization_labels = state
        .catalog
        .specialization_labels(&profile.snapshot.specializations)
        .into_iter()
        .map(str::to_string)
        .collect();
    let ability_labels = state
        .catalog
        .labels(&profile.snapshot.abilities)
        .map(str::to_string)
        .collect();
    Ok(Json(ProfileResponse {
        profile,
        specialization_labels,
        ability_labels,
    }))
}

// --- Lookup endpoints ---

async fn list_skills(State(state): State<AppState>) -> Json<Vec<Skill>> {
    let state = state.read().await;
    Json(state.catalog.skills())
}

async fn list_specializations(State(state): State<AppState>) -> Json<Vec<SpecializationLabel>> {
    let state = state.read().await;
    Json(state.catalog.specializations())
}

#[derive(Debug, Deserialize)]
struct UploadCheckRequest {
    mime_type: String,
    size: u64,
}

async fn check_upload(
    State(state): State<AppState>,
    Json(req): Json<UploadCheckRequest>,
) -> Result<StatusCode, ApiError> {
    let state = state.read().await;
    state
        .upload_policy
        .check(&req.mime_type, req.size)
        .map_err(|rejection| api_error(StatusCode::UNPROCESSABLE_ENTITY, rejection.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}
