//! Thread and streaming endpoints — the coach's primary interface.
//!
//! - `POST /v1/thread`                     — mint a fresh thread id
//! - `POST /v1/threads/:thread_id/stream`  — run one turn, stream SSE events

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json};
use futures_util::stream::Stream;
use serde::Deserialize;
use uuid::Uuid;

use crate::runtime::{run_turn, TurnInput};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request shape
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct StreamRequest {
    /// Raw user message text.
    pub message: String,
    /// Whose quit data frames the turn.
    pub user_id: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/thread
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn create_thread() -> impl IntoResponse {
    Json(serde_json::json!({ "thread_id": Uuid::new_v4().to_string() }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/threads/:thread_id/stream (SSE)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn stream_turn(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Json(body): Json<StreamRequest>,
) -> impl IntoResponse {
    if body.message.trim().is_empty() {
        return (
            axum::http::StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "message must not be empty" })),
        )
            .into_response();
    }

    let input = TurnInput {
        thread_id,
        user_id: body.user_id,
        message: body.message,
    };
    let rx = run_turn(state, input);

    Sse::new(make_sse_stream(rx))
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// Each event becomes one `data:` frame of JSON with a mandatory `event`
/// key; the stream always closes with `event: end` / `data: [DONE]`.
fn make_sse_stream(
    mut rx: tokio::sync::mpsc::Receiver<qc_domain::event::OutputEvent>,
) -> impl Stream<Item = Result<Event, std::convert::Infallible>> {
    async_stream::stream! {
        while let Some(event) = rx.recv().await {
            let data = serde_json::to_string(&event).unwrap_or_default();
            yield Ok(Event::default().data(data));
        }
        yield Ok(Event::default().event("end").data("[DONE]"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use qc_domain::event::OutputEvent;

    #[tokio::test]
    async fn sse_stream_ends_with_done_terminator() {
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        tx.send(OutputEvent::Token { text: "hi".into() }).await.unwrap();
        drop(tx);

        let frames: Vec<_> = make_sse_stream(rx).collect().await;
        assert_eq!(frames.len(), 2);
    }

    #[tokio::test]
    async fn empty_run_still_emits_terminator() {
        let (tx, rx) = tokio::sync::mpsc::channel::<OutputEvent>(1);
        drop(tx);
        let frames: Vec<_> = make_sse_stream(rx).collect().await;
        assert_eq!(frames.len(), 1);
    }
}
