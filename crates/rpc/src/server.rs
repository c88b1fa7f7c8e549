use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use medassist_accounts::{AccountError, CredentialStore};
use medassist_catalog::{Catalog, DiseaseRecord};
use medassist_diagnosis::{DiagnosisModel, SessionError};
use medassist_risk::{assess_checked, RiskAssessment, RiskReport};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::sessions::{RegistryError, SessionRegistry, SessionView};

pub const WELCOME_MESSAGE: &str = "Welcome to the Healthcare Chatbot API";

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    /// Diagnosis routes answer 503 without a model
    pub model: Option<Arc<DiagnosisModel>>,
    pub model_hash: Option<String>,
    pub sessions: Arc<SessionRegistry>,
    pub accounts: Arc<Mutex<CredentialStore>>,
    /// Empty or `*` allows any origin
    pub allowed_origins: Vec<String>,
    pub start_time: Instant,
    pub req_count: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(
        catalog: Catalog,
        model: Option<DiagnosisModel>,
        accounts: CredentialStore,
    ) -> Result<Self> {
        let model_hash = model
            .as_ref()
            .map(DiagnosisModel::hash_hex)
            .transpose()
            .context("failed to hash diagnosis model")?;

        Ok(Self {
            catalog: Arc::new(catalog),
            model: model.map(Arc::new),
            model_hash,
            sessions: Arc::new(SessionRegistry::new()),
            accounts: Arc::new(Mutex::new(accounts)),
            allowed_origins: Vec::new(),
            start_time: Instant::now(),
            req_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    fn record_request(&self) -> u64 {
        self.req_count.fetch_add(1, Ordering::Relaxed) as u64 + 1
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    fn model(&self) -> Result<Arc<DiagnosisModel>, ApiError> {
        self.model
            .clone()
            .ok_or_else(|| ApiError::service_unavailable("no diagnosis model is loaded"))
    }
}

type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
struct WelcomeResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    diseases: usize,
    model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_hash: Option<String>,
    active_sessions: usize,
    req_total: u64,
}

#[derive(Debug, Deserialize)]
pub struct DiseaseRequest {
    pub disease: String,
}

/// Body of `/get_disease_info`: the record without its key.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DiseaseResponse {
    pub description: String,
    pub symptoms: Vec<String>,
    pub treatment: String,
    pub exercise: String,
    pub sleep_hours: String,
    pub diet: String,
}

impl From<&DiseaseRecord> for DiseaseResponse {
    fn from(record: &DiseaseRecord) -> Self {
        Self {
            description: record.description.clone(),
            symptoms: record.symptoms.clone(),
            treatment: record.treatment.clone(),
            exercise: record.exercise.clone(),
            sleep_hours: record.sleep_hours.clone(),
            diet: record.diet.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DiseaseListResponse {
    diseases: Vec<String>,
    total: usize,
}

#[derive(Debug, Serialize)]
struct SymptomListResponse {
    symptoms: Vec<String>,
    total: usize,
}

#[derive(Debug, Serialize)]
struct RelatedDiseasesResponse {
    symptom: String,
    diseases: Vec<DiseaseRecord>,
}

#[derive(Debug, Serialize)]
struct HealthTipResponse {
    disease: String,
    tip: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: bool,
}

#[derive(Debug, Serialize)]
struct DeleteSessionResponse {
    session_id: Uuid,
    discarded: bool,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    username: String,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownSession(_) => ApiError::not_found(err.to_string()),
            RegistryError::Session(SessionError::AlreadyTerminal) => {
                ApiError::conflict(err.to_string())
            }
            RegistryError::Session(_) => ApiError::internal(err.to_string()),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::PasswordMismatch | AccountError::EmptyUsername => {
                ApiError::bad_request(err.to_string())
            }
            AccountError::DuplicateUser(_) => ApiError::conflict(err.to_string()),
            AccountError::Io(_) | AccountError::Csv(_) => {
                warn!("Credential store failure: {}", err);
                ApiError::internal("failed to update credential store")
            }
        }
    }
}

pub async fn start_server(state: AppState, addr: &str) -> Result<()> {
    let shared = Arc::new(state);
    let app = build_router(shared);
    let listener = bind_listener(addr).await?;
    info!("RPC server listening on {}", addr);
    axum::serve(listener, app)
        .await
        .context("RPC server terminated unexpectedly")
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind RPC listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind RPC listener on {addr}"))
    }
}

pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/get_disease_info", post(handle_get_disease_info))
        .route("/diseases", get(handle_list_diseases))
        .route("/diseases/:name/tip", get(handle_health_tip))
        .route("/symptoms", get(handle_list_symptoms))
        .route("/symptoms/:symptom/diseases", get(handle_related_diseases))
        .route("/risk/assess", post(handle_risk_assess))
        .route("/diagnosis/sessions", post(handle_create_session))
        .route(
            "/diagnosis/sessions/:id",
            get(handle_get_session).delete(handle_delete_session),
        )
        .route("/diagnosis/sessions/:id/answer", post(handle_answer))
        .route("/auth/signup", post(handle_signup))
        .route("/auth/login", post(handle_login))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("Ignoring invalid CORS origin {:?}: {}", origin, err);
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(AllowOrigin::list(allowed))
}

async fn handle_root(State(state): State<SharedState>) -> Json<WelcomeResponse> {
    state.record_request();
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE,
    })
}

async fn handle_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let req_total = state.record_request();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime_seconds(),
        diseases: state.catalog.len(),
        model_loaded: state.model.is_some(),
        model_hash: state.model_hash.clone(),
        active_sessions: state.sessions.len(),
        req_total,
    })
}

async fn handle_get_disease_info(
    State(state): State<SharedState>,
    Json(request): Json<DiseaseRequest>,
) -> Json<DiseaseResponse> {
    state.record_request();
    let record = state.catalog.lookup(&request.disease);
    debug!(
        "Disease lookup {:?} -> {}",
        request.disease,
        if record.is_not_found() { "miss" } else { "hit" }
    );
    Json(DiseaseResponse::from(record))
}

async fn handle_list_diseases(State(state): State<SharedState>) -> Json<DiseaseListResponse> {
    state.record_request();
    let diseases: Vec<String> = state.catalog.names().into_iter().map(String::from).collect();
    Json(DiseaseListResponse {
        total: diseases.len(),
        diseases,
    })
}

async fn handle_list_symptoms(State(state): State<SharedState>) -> Json<SymptomListResponse> {
    state.record_request();
    let symptoms: Vec<String> = state
        .catalog
        .all_symptoms()
        .into_iter()
        .map(String::from)
        .collect();
    Json(SymptomListResponse {
        total: symptoms.len(),
        symptoms,
    })
}

async fn handle_related_diseases(
    State(state): State<SharedState>,
    AxumPath(symptom): AxumPath<String>,
) -> Json<RelatedDiseasesResponse> {
    state.record_request();
    let diseases = state
        .catalog
        .diseases_with_symptom(&symptom)
        .into_iter()
        .cloned()
        .collect();
    Json(RelatedDiseasesResponse { symptom, diseases })
}

async fn handle_health_tip(
    State(state): State<SharedState>,
    AxumPath(name): AxumPath<String>,
) -> Json<HealthTipResponse> {
    state.record_request();
    let tip = state.catalog.health_tip(&name).to_string();
    Json(HealthTipResponse { disease: name, tip })
}

async fn handle_risk_assess(
    State(state): State<SharedState>,
    Json(assessment): Json<RiskAssessment>,
) -> Result<Json<RiskReport>, ApiError> {
    state.record_request();
    assess_checked(&assessment)
        .map(Json)
        .map_err(|err| ApiError::bad_request(err.to_string()))
}

async fn handle_create_session(
    State(state): State<SharedState>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    state.record_request();
    let model = state.model()?;
    let view = state.sessions.create(model)?;
    debug!("Opened diagnosis session {}", view.session_id);
    Ok((StatusCode::CREATED, Json(view)))
}

async fn handle_get_session(
    State(state): State<SharedState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<SessionView>, ApiError> {
    state.record_request();
    let id = parse_session_id(&id)?;
    Ok(Json(state.sessions.view(id)?))
}

async fn handle_answer(
    State(state): State<SharedState>,
    AxumPath(id): AxumPath<String>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SessionView>, ApiError> {
    state.record_request();
    let id = parse_session_id(&id)?;
    Ok(Json(state.sessions.answer(id, request.answer)?))
}

async fn handle_delete_session(
    State(state): State<SharedState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<DeleteSessionResponse>, ApiError> {
    state.record_request();
    let id = parse_session_id(&id)?;
    if !state.sessions.remove(id) {
        return Err(ApiError::not_found(format!("unknown diagnosis session {id}")));
    }
    Ok(Json(DeleteSessionResponse {
        session_id: id,
        discarded: true,
    }))
}

async fn handle_signup(
    State(state): State<SharedState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    state.record_request();
    let accounts = state.accounts.clone();
    let username = request.username.trim().to_string();
    tokio::task::spawn_blocking(move || {
        accounts.lock().register(
            &request.username,
            &request.password,
            &request.confirm_password,
        )
    })
    .await
    .map_err(|err| {
        warn!("Signup task failed: {}", err);
        ApiError::internal("failed to update credential store")
    })??;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            username,
            message: "Account created successfully! You can now log in.",
        }),
    ))
}

async fn handle_login(
    State(state): State<SharedState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    state.record_request();
    if !state
        .accounts
        .lock()
        .authenticate(&request.username, &request.password)
    {
        return Err(ApiError::unauthorized("Incorrect username or password."));
    }

    Ok(Json(AuthResponse {
        username: request.username.trim().to_string(),
        message: "Login successful!",
    }))
}

fn parse_session_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request(format!("invalid session id: {id}")))
}

impl ApiError {
    fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    fn not_found<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn conflict<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    fn service_unavailable<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}
