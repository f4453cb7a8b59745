//! Route handler functions for all API endpoints.
//!
//! Each handler extracts path/body parameters via axum extractors, drives
//! the services in [`AppState`], and answers with the JSON envelopes the
//! widget and agent dashboard consume. Failures render through
//! [`ApiError`].

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use frontdesk_core::{Confidence, EscalateOutcome, FaqEntry, Session, summarize_conversation};
use frontdesk_store::StoredMessage;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request parameter types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EscalateRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FaqParams {
    pub category: Option<String>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionResponse {
    pub success: bool,
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub source: String,
    pub session_id: String,
    pub escalated: bool,
    pub confidence: Confidence,
    pub faq_matched: bool,
    pub faq_id: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub escalated: bool,
    pub escalation_reason: Option<String>,
    pub message_count: usize,
    pub conversation_history: Vec<StoredMessage>,
}

#[derive(Debug, Serialize)]
pub struct SessionDetailResponse {
    pub success: bool,
    pub session: SessionDetail,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalatedSession {
    pub id: String,
    pub escalated: bool,
    pub escalation_reason: Option<String>,
    pub escalation_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalateResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_escalated: Option<bool>,
    pub session: EscalatedSession,
}

#[derive(Debug, Serialize)]
pub struct FaqsResponse {
    pub success: bool,
    pub faqs: Vec<FaqEntry>,
    pub categories: Vec<String>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub escalated: bool,
    pub message_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub success: bool,
    pub sessions: Vec<SessionSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: u64,
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET / - API index for anyone poking the service by hand.
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Frontdesk Customer Support API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /api/chat": "Send a message and get a reply",
            "GET /api/session/{sessionId}": "Get session details",
            "DELETE /api/session/{sessionId}": "End a session",
            "POST /api/session/{sessionId}/escalate": "Manually escalate a session",
            "GET /api/faqs": "Get all FAQs",
            "GET /api/sessions": "Get all active sessions",
            "POST /api/session/new": "Create a new session",
            "GET /api/health": "Service health"
        }
    }))
}

/// POST /api/session/new - register a fresh session id.
pub async fn new_session(State(state): State<AppState>) -> Json<NewSessionResponse> {
    let session = state.registry.create(&Uuid::new_v4().to_string());
    debug!("session created (id={})", session.id);
    Json(NewSessionResponse {
        success: true,
        session_id: session.id,
        message: "New session created".to_string(),
    })
}

/// POST /api/chat - record the user turn, resolve it, record the reply,
/// and escalate the session when the resolution calls for it.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session_id = request
        .session_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingField("sessionId"))?;
    let message = request
        .message
        .as_deref()
        .filter(|message| !message.is_empty())
        .ok_or(ApiError::MissingField("message"))?;

    state.registry.get_or_create(session_id);
    state.history.append(session_id, "user", message).await;

    let resolution = state.resolver.resolve(session_id, message).await;
    state
        .history
        .append(session_id, "assistant", &resolution.response)
        .await;

    let mut escalated = false;
    if resolution.needs_escalation && !state.registry.is_escalated(session_id) {
        let reason = if resolution.confidence == Confidence::Low {
            "Bot unable to answer query confidently"
        } else {
            "User query requires human assistance"
        };
        escalated = matches!(
            state.registry.escalate(session_id, reason),
            Ok(EscalateOutcome::Escalated(_))
        );
    }

    debug!(
        "chat resolved (session_id={}, source={}, confidence={}, escalated={})",
        session_id,
        resolution.source.as_str(),
        resolution.confidence.as_str(),
        escalated
    );

    let source = resolution.source.as_str().to_string();
    let faq_matched = resolution.source.is_faq();
    Ok(Json(ChatResponse {
        success: true,
        response: resolution.response,
        source,
        session_id: session_id.to_string(),
        escalated,
        confidence: resolution.confidence,
        faq_matched,
        faq_id: resolution.matched_faq_id,
    }))
}

/// GET /api/session/{session_id} - session metadata joined with its
/// stored conversation.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDetailResponse>, ApiError> {
    let session = state
        .registry
        .get(&session_id)
        .ok_or(ApiError::SessionNotFound)?;
    let conversation_history = state.history.history(&session_id).await;

    Ok(Json(SessionDetailResponse {
        success: true,
        session: SessionDetail {
            id: session.id,
            created_at: session.created_at,
            last_activity: session.last_activity,
            escalated: session.escalated,
            escalation_reason: session.escalation_reason,
            message_count: conversation_history.len(),
            conversation_history,
        },
    }))
}

/// DELETE /api/session/{session_id} - drop the session and its history.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    if !state.registry.delete(&session_id).await {
        return Err(ApiError::SessionNotFound);
    }
    info!("session ended (id={})", session_id);
    Ok(Json(ActionResponse {
        success: true,
        message: "Session ended successfully".to_string(),
    }))
}

/// POST /api/session/{session_id}/escalate - hand the session to a human
/// agent. Escalating twice reports the original hand-off untouched.
pub async fn escalate_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Option<Json<EscalateRequest>>,
) -> Result<Json<EscalateResponse>, ApiError> {
    let reason = body
        .and_then(|Json(request)| request.reason)
        .filter(|reason| !reason.is_empty())
        .unwrap_or_else(|| "User requested human assistance".to_string());

    match state.registry.escalate(&session_id, &reason)? {
        EscalateOutcome::Escalated(session) => {
            let history = state.history.history(&session_id).await;
            debug!(
                "escalation context (id={}): {}",
                session_id,
                summarize_conversation(&history)
            );
            Ok(Json(EscalateResponse {
                success: true,
                message: "Session escalated successfully".to_string(),
                already_escalated: None,
                session: escalated_session(session),
            }))
        }
        EscalateOutcome::AlreadyEscalated(session) => Ok(Json(EscalateResponse {
            success: true,
            message: "Session already escalated".to_string(),
            already_escalated: Some(true),
            session: escalated_session(session),
        })),
    }
}

fn escalated_session(session: Session) -> EscalatedSession {
    EscalatedSession {
        id: session.id,
        escalated: session.escalated,
        escalation_reason: session.escalation_reason,
        escalation_time: session.escalation_time,
    }
}

/// GET /api/faqs - the FAQ catalogue, optionally filtered by category.
/// Categories always describe the full catalogue so filters stay navigable.
pub async fn list_faqs(
    State(state): State<AppState>,
    Query(params): Query<FaqParams>,
) -> Json<FaqsResponse> {
    let faqs: Vec<FaqEntry> = match params.category.as_deref() {
        Some(category) => state.faq.by_category(category).into_iter().cloned().collect(),
        None => state.faq.all().to_vec(),
    };
    let categories = state
        .faq
        .categories()
        .into_iter()
        .map(str::to_string)
        .collect();

    let total = faqs.len();
    Json(FaqsResponse {
        success: true,
        faqs,
        categories,
        total,
    })
}

/// GET /api/sessions - summaries of every registered session.
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionsResponse> {
    let sessions: Vec<SessionSummary> = state
        .registry
        .list_active()
        .await
        .into_iter()
        .map(|active| SessionSummary {
            id: active.session.id,
            created_at: active.session.created_at,
            last_activity: active.session.last_activity,
            escalated: active.session.escalated,
            message_count: active.messages.len(),
        })
        .collect();

    let total = sessions.len();
    Json(SessionsResponse {
        success: true,
        sessions,
        total,
    })
}

/// GET /api/health - liveness probe.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
