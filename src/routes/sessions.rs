use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::operations::{lists, users, words};
use crate::db::DbError;
use crate::response::{created, message, ok, AppError, JsonBody};
use crate::services::study_session::{
    Answer, SessionSnapshot, StepOutcome, StepResult, StudyMode, StudySession,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/lists/:id/sessions", post(start_session))
        .route("/api/sessions/:id", get(get_session).delete(abandon_session))
        .route("/api/sessions/:id/reveal", post(reveal))
        .route("/api/sessions/:id/answer", post(answer))
        .route("/api/sessions/:id/summary", get(summary))
        .route("/api/sessions/:id/restart", post(restart))
}

#[derive(Debug, Deserialize)]
struct StartSessionRequest {
    mode: StudyMode,
}

#[derive(Serialize)]
struct AnswerResponse {
    outcome: StepOutcome,
    session: SessionSnapshot,
}

fn session_not_found() -> AppError {
    AppError::not_found("Session not found")
}

async fn start_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(list_id): Path<String>,
    JsonBody(payload): JsonBody<StartSessionRequest>,
) -> Result<Response, AppError> {
    if lists::get_list(state.db(), &user.id, &list_id).await?.is_none() {
        return Err(AppError::not_found("List not found"));
    }
    let pool = words::words_in_list(state.db(), &user.id, &list_id).await?;

    let config = state.config();
    let session = {
        let mut rng = rand::rng();
        StudySession::new(
            Uuid::new_v4().to_string(),
            user.id.clone(),
            list_id,
            payload.mode,
            pool,
            config.quiz_size,
            config.recognition_success_rate,
            &mut rng,
        )?
    };

    let snapshot = session.snapshot();
    state.sessions().insert(session);
    tracing::debug!(session_id = %snapshot.id, mode = ?snapshot.mode, total = snapshot.total, "study session started");

    Ok(created(snapshot))
}

async fn get_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let snapshot = state
        .sessions()
        .with_session(&id, &user.id, |session| session.snapshot())
        .ok_or_else(session_not_found)?;
    Ok(ok(snapshot))
}

async fn reveal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let snapshot = state
        .sessions()
        .with_session(&id, &user.id, |session| {
            session.reveal().map(|()| session.snapshot())
        })
        .ok_or_else(session_not_found)??;
    Ok(ok(snapshot))
}

async fn answer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(submitted): JsonBody<Answer>,
) -> Result<Response, AppError> {
    let (step, snapshot, previous) = state
        .sessions()
        .with_session(&id, &user.id, |session| {
            let previous = session.clone();
            let mut rng = rand::rng();
            session
                .answer(submitted, &mut rng)
                .map(|step| (step, session.snapshot(), previous))
        })
        .ok_or_else(session_not_found)??;

    if let Err(err) = persist_step(&state, &user.id, &previous, &step).await {
        // Put the session back so the same answer can be retried.
        state.sessions().with_session(&id, &user.id, |session| {
            if session.index() == snapshot.index {
                *session = previous;
            }
        });
        return Err(err);
    }

    if step.completed_now {
        tracing::debug!(session_id = %id, mode = ?snapshot.mode, score = snapshot.score, "study session completed");
    }

    Ok(ok(AnswerResponse {
        outcome: step.outcome,
        session: snapshot,
    }))
}

async fn persist_step(
    state: &AppState,
    user_id: &str,
    session: &StudySession,
    step: &StepResult,
) -> Result<(), AppError> {
    if let Some((word_id, outcome)) = &step.review {
        match words::record_review(state.db(), word_id, *outcome).await {
            Ok(()) => {}
            // The word was deleted while the session was running.
            Err(DbError::NotFound(_)) => {
                tracing::debug!(word_id = %word_id, "review skipped for missing word");
            }
            Err(err) => return Err(err.into()),
        }
    }

    if step.completed_now {
        match session.mode {
            StudyMode::Learning => lists::mark_studied(state.db(), &session.list_id, true).await?,
            StudyMode::Quiz => lists::mark_studied(state.db(), &session.list_id, false).await?,
            StudyMode::Voice | StudyMode::Ar => {}
        }
        users::record_activity(state.db(), user_id, Utc::now()).await?;
    }
    Ok(())
}

async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let summary = state
        .sessions()
        .with_session(&id, &user.id, |session| session.summary())
        .ok_or_else(session_not_found)??;
    Ok(ok(summary))
}

async fn restart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let snapshot = state
        .sessions()
        .with_session(&id, &user.id, |session| {
            let mut rng = rand::rng();
            session.restart(&mut rng);
            session.snapshot()
        })
        .ok_or_else(session_not_found)?;
    Ok(ok(snapshot))
}

async fn abandon_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    if !state.sessions().remove(&id, &user.id) {
        return Err(session_not_found());
    }
    Ok(message("Session abandoned"))
}
