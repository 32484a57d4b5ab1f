// SPDX-License-Identifier: MIT

//! Public channel lookup routes (API-key authenticated upstream).

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/channel/{handle}", get(channel_overview))
}

/// Resolve a handle and return channel metadata plus per-video
/// aggregates.
///
/// An unknown handle is a 404; failures in the metadata or video
/// sub-lookups degrade to `null`/empty values while keeping both
/// top-level keys present.
async fn channel_overview(
    State(state): State<Arc<AppState>>,
    Path(handle): Path<String>,
) -> Result<Json<Value>> {
    let channel_id = state
        .youtube
        .resolve_handle(&handle)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no channel for handle {handle}")))?;

    tracing::info!(channel_id = %channel_id, handle = %handle, "Resolved channel handle");

    let channel_info = match state.youtube.channel_details(&channel_id).await {
        Ok(Some(summary)) => serde_json::to_value(summary)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("serialize failure: {}", e)))?,
        Ok(None) => Value::Null,
        Err(err) => {
            tracing::warn!(error = %err, "Channel details lookup failed");
            Value::Null
        }
    };

    let video_ids = match state.youtube.list_video_ids(&channel_id).await {
        Ok(ids) => ids,
        Err(err) => {
            tracing::warn!(error = %err, "Video listing failed");
            Vec::new()
        }
    };

    let analytics = if video_ids.is_empty() {
        json!({})
    } else {
        match state.youtube.video_totals(&video_ids).await {
            Ok(totals) => serde_json::to_value(totals.aggregate())
                .map_err(|e| AppError::Internal(anyhow::anyhow!("serialize failure: {}", e)))?,
            Err(err) => {
                tracing::warn!(error = %err, "Video detail lookup failed");
                json!({})
            }
        }
    };

    Ok(Json(json!({
        "channel_info": channel_info,
        "analytics": analytics,
    })))
}
