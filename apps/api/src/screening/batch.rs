//! Batch Orchestrator: runs the per-file processor over every upload in a
//! request and returns the rows in upload order.
//!
//! All files of one request are driven concurrently on the request's own
//! task; suspension only happens inside the gateway call. Rows come back in
//! input order no matter which call finishes first.

use std::time::Duration;

use futures::{future::join_all, stream, StreamExt};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::llm_client::ModelGateway;
use crate::models::candidate::ResultRow;
use crate::models::upload::{Requirement, UploadedFile};
use crate::screening::processor::process_file;

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Maximum files in flight at once. `None` launches every file together.
    pub max_concurrency: Option<usize>,
    /// Per-file gateway timeout. `None` waits indefinitely.
    pub call_timeout: Option<Duration>,
}

/// Processes every file and returns one row per file, in input order.
/// A failing file never affects its siblings. An empty input yields no rows.
pub async fn process_batch(
    files: Vec<UploadedFile>,
    requirement: &Requirement,
    gateway: &dyn ModelGateway,
    options: BatchOptions,
) -> Vec<ResultRow> {
    let batch_id = Uuid::new_v4();
    let total = files.len();
    info!(%batch_id, files = total, "Processing resume batch");

    let BatchOptions {
        max_concurrency,
        call_timeout,
    } = options;
    let tasks = files
        .into_iter()
        .map(move |file| process_file(file, requirement, gateway, call_timeout));

    // Both combinators yield results in the order the futures were supplied.
    let run = async move {
        match max_concurrency {
            Some(limit) => {
                stream::iter(tasks)
                    .buffered(limit.max(1))
                    .collect::<Vec<_>>()
                    .await
            }
            None => join_all(tasks).await,
        }
    };
    let rows: Vec<ResultRow> = run.instrument(info_span!("batch", %batch_id)).await;

    let failed = rows.iter().filter(|row| row.error().is_some()).count();
    info!(%batch_id, total, failed, "Resume batch complete");

    rows
}
