//! WebSocket progress stream for a single job.
//!
//! Buffered events are replayed on connect, then live events follow. Client
//! frames are read only to notice disconnects. The socket is closed after
//! the job's terminal event.

use crate::pipeline::{StageEvent, Step};
use crate::progress::ProgressHub;
use crate::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;

pub async fn job_status(
    ws: WebSocketUpgrade,
    Path(job_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let hub = state.progress.clone();
    ws.on_upgrade(move |socket| stream_progress(socket, hub, job_id))
}

fn encode(event: &StageEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(text) => Some(Message::Text(text.into())),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode progress event");
            None
        }
    }
}

async fn stream_progress(socket: WebSocket, hub: Arc<ProgressHub>, job_id: String) {
    let (mut sender, mut receiver) = socket.split();

    let Some(mut subscription) = hub.attach(&job_id) else {
        tracing::debug!(job_id = %job_id, "Status requested for unknown job");
        let event = StageEvent::failed(&job_id, Step::Error, "Unknown or expired job");
        if let Some(msg) = encode(&event) {
            let _ = sender.send(msg).await;
        }
        let _ = sender.send(Message::Close(None)).await;
        return;
    };

    tracing::info!(job_id = %job_id, "Progress client connected");

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else {
                    // Job finished or another client took over.
                    break;
                };
                let Some(msg) = encode(&event) else { continue };
                if sender.send(msg).await.is_err() {
                    tracing::debug!(job_id = %job_id, "Progress client went away");
                    break;
                }
            }
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!(job_id = %job_id, error = %e, "Progress socket receive error");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = sender.send(Message::Close(None)).await;
    tracing::info!(job_id = %job_id, "Progress client disconnected");
}
