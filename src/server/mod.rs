//! HTTP surface for the paper chat backend.
//!
//! Routes map 1:1 to core operations:
//!
//! - `POST /chat` — relay a chat exchange about a paper
//! - `GET /arxiv-results?topic=` — arXiv search
//! - `GET /scholar-results?topic=` — Scholar search
//! - `POST /download-arxiv-pdf` — shell out to the PDF download tool
//! - `POST /recommend-papers` — TF-IDF similarity ranking
//! - `GET /health` — liveness probe
//!
//! CORS is wide open, matching the browser frontend this backend serves.
//! Validation failures surface before any external call is attempted;
//! degraded chat replies keep their failure status code rather than being
//! coerced to success.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::chat::{ChatError, ChatService, SessionMemory};
use crate::download::download_arxiv_pdf;
use crate::generation::GenerationProvider;
use crate::memory::MemoryStore;
use crate::models::{ChatTurn, Paper, RankedPaper};
use crate::ranker::{self, DEFAULT_TOP_N};
use crate::search::SearchProvider;

/// Shared state behind every handler.
pub struct AppState<G, M>
where
    G: GenerationProvider,
    M: MemoryStore,
{
    /// Conversation relay
    pub chat: ChatService<G, M>,

    /// arXiv search provider
    pub arxiv: Arc<dyn SearchProvider>,

    /// Scholar search provider; `None` disables the route
    pub scholar: Option<Arc<dyn SearchProvider>>,

    /// Destination directory for PDF downloads
    pub download_dir: PathBuf,

    /// Per-paper session memories, keyed by paper title. Each session has
    /// its own lock so one paper's exchange never blocks another's; the map
    /// lock is only held long enough to clone the entry out.
    sessions: Mutex<HashMap<String, Arc<Mutex<SessionMemory>>>>,
}

impl<G, M> AppState<G, M>
where
    G: GenerationProvider,
    M: MemoryStore,
{
    pub fn new(
        chat: ChatService<G, M>,
        arxiv: Arc<dyn SearchProvider>,
        scholar: Option<Arc<dyn SearchProvider>>,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            chat,
            arxiv,
            scholar,
            download_dir,
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

/// Build the router with permissive CORS.
pub fn build_router<G, M>(state: Arc<AppState<G, M>>) -> Router
where
    G: GenerationProvider + 'static,
    M: MemoryStore + 'static,
{
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/arxiv-results", get(arxiv_results_handler))
        .route("/scholar-results", get(scholar_results_handler))
        .route("/download-arxiv-pdf", post(download_pdf_handler))
        .route("/recommend-papers", post(recommend_handler))
        .route("/health", get(health_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// JSON error body shared by all routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Paper identity sent with a chat request.
#[derive(Debug, Deserialize)]
pub struct PaperInfo {
    pub title: String,
    pub summary: String,
}

/// Request payload for `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The paper being discussed
    #[serde(rename = "paperInfo")]
    pub paper_info: PaperInfo,

    /// The conversation so far; the final entry must be the new user turn
    #[serde(rename = "chatHistory")]
    pub chat_history: Vec<ChatTurn>,
}

async fn chat_handler<G, M>(
    State(state): State<Arc<AppState<G, M>>>,
    Json(request): Json<ChatRequest>,
) -> Response
where
    G: GenerationProvider,
    M: MemoryStore,
{
    if request.paper_info.title.trim().is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "paperInfo.title must not be empty",
        );
    }
    if crate::chat::latest_user_turn(&request.chat_history).is_err() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "chatHistory must end with a user message",
        );
    }

    let paper = Paper::new(request.paper_info.title, request.paper_info.summary);

    // clone this paper's session handle out under a short map lock, then
    // hold only that session's lock across the exchange; chats about the
    // same paper serialize, chats about different papers do not
    let session = {
        let mut sessions = state.sessions.lock().await;
        Arc::clone(sessions.entry(paper.title.clone()).or_default())
    };
    let mut session = session.lock().await;

    match state.chat.chat(&paper, &request.chat_history, &mut session).await {
        Ok(outcome) => {
            let status = if outcome.is_failure() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::OK
            };
            (status, Json(outcome.turn().clone())).into_response()
        }
        Err(ChatError::MissingUserTurn) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "chatHistory must end with a user message",
        ),
    }
}

/// Query parameters for the search routes.
#[derive(Debug, Deserialize)]
pub struct TopicQuery {
    pub topic: String,
}

async fn arxiv_results_handler<G, M>(
    State(state): State<Arc<AppState<G, M>>>,
    Query(query): Query<TopicQuery>,
) -> Response
where
    G: GenerationProvider,
    M: MemoryStore,
{
    run_search(state.arxiv.as_ref(), &query.topic).await
}

async fn scholar_results_handler<G, M>(
    State(state): State<Arc<AppState<G, M>>>,
    Query(query): Query<TopicQuery>,
) -> Response
where
    G: GenerationProvider,
    M: MemoryStore,
{
    match &state.scholar {
        Some(provider) => run_search(provider.as_ref(), &query.topic).await,
        None => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "scholar search is not configured",
        ),
    }
}

async fn run_search(provider: &dyn SearchProvider, topic: &str) -> Response {
    if topic.trim().is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "topic must not be empty");
    }
    match provider.search(topic).await {
        Ok(papers) => Json(papers).into_response(),
        Err(e) => {
            error!(provider = provider.name(), %e, "paper search failed");
            error_response(
                StatusCode::BAD_GATEWAY,
                format!("Error fetching data from {}", provider.name()),
            )
        }
    }
}

/// Request payload for `POST /download-arxiv-pdf`.
///
/// Field names match the frontend's casing.
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(rename = "arXiv_id")]
    pub arxiv_id: Option<String>,

    #[serde(rename = "paper_title")]
    pub paper_title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub message: String,
}

async fn download_pdf_handler<G, M>(
    State(state): State<Arc<AppState<G, M>>>,
    Json(request): Json<DownloadRequest>,
) -> Response
where
    G: GenerationProvider,
    M: MemoryStore,
{
    let (arxiv_id, paper_title) = match (request.arxiv_id, request.paper_title) {
        (Some(id), Some(title)) if !id.trim().is_empty() => (id, title),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Missing required parameters: arXiv_id or paper_title",
            )
        }
    };

    match download_arxiv_pdf(&arxiv_id, &state.download_dir).await {
        Ok(dir) => {
            info!(%arxiv_id, title = %paper_title, "PDF downloaded");
            Json(DownloadResponse {
                message: format!(
                    "PDF downloaded successfully to {}",
                    dir.join(format!("{paper_title}.pdf")).display()
                ),
            })
            .into_response()
        }
        Err(e) => {
            error!(%arxiv_id, %e, "PDF download failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error occurred while downloading the PDF.",
            )
        }
    }
}

/// Request payload for `POST /recommend-papers`.
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// Paper the user is currently reading
    pub target: Paper,

    /// Candidate pool to rank
    pub candidates: Vec<Paper>,

    /// Number of recommendations to return (default 5)
    #[serde(default)]
    pub top_n: Option<usize>,
}

async fn recommend_handler<G, M>(
    State(_state): State<Arc<AppState<G, M>>>,
    Json(request): Json<RecommendRequest>,
) -> Json<Vec<RankedPaper>>
where
    G: GenerationProvider,
    M: MemoryStore,
{
    let top_n = request.top_n.unwrap_or(DEFAULT_TOP_N);
    Json(ranker::rank(&request.target, &request.candidates, top_n))
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

async fn health_handler() -> Json<Health> {
    Json(Health { status: "ok" })
}
