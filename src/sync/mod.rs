//! Upload of pending entries and reconciliation of the collector's acknowledgment.
//!
//! Only ids echoed back in `acceptedIds` are marked synced. Any failure
//! leaves the pending set untouched, so the next `sync_now` resends the
//! same batch.

pub mod background;
pub mod endpoint;
pub mod payload;
pub mod transport;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::store::EntryStore;
use endpoint::Endpoint;
use std::time::Duration;
use tracing::{debug, info, warn};
use transport::{HttpTransport, Transport};

/// Result of a successful sync round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub uploaded: usize,
}

pub struct SyncEngine<T: Transport> {
    endpoint: Endpoint,
    transport: T,
}

impl SyncEngine<HttpTransport> {
    /// Engine posting over HTTP to the endpoint configured in `cfg`.
    pub fn from_config(cfg: &Config) -> AppResult<Self> {
        let transport = HttpTransport::new(Duration::from_secs(cfg.sync_timeout_secs.max(1)))?;
        Ok(Self::new(Endpoint::from_config(cfg), transport))
    }
}

impl<T: Transport> SyncEngine<T> {
    pub fn new(endpoint: Endpoint, transport: T) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    /// Upload every pending entry in one batch and mark the acknowledged ones synced.
    pub fn sync_now(&mut self, store: &mut EntryStore) -> AppResult<SyncOutcome> {
        let url = self.endpoint.resolve()?.to_string();

        let pending = store.list_pending()?;
        if pending.is_empty() {
            debug!("nothing pending, skipping upload");
            return Ok(SyncOutcome { uploaded: 0 });
        }

        let batch = payload::build_batch(&pending);
        let body = payload::encode_form_body(&batch)?;
        debug!(entries = batch.len(), bytes = body.len(), "sync batch ready");

        let response = self.transport.post_form(&url, body)?;
        if !response.is_success() {
            warn!(status = response.status, "collector rejected sync batch");
            return Err(AppError::transport(
                Some(response.status),
                payload::preview(&response.body),
            ));
        }

        let accepted = payload::parse_ack(&response.body)?;
        store.mark_synced(&accepted)?;

        info!(sent = batch.len(), accepted = accepted.len(), "sync completed");
        Ok(SyncOutcome {
            uploaded: accepted.len(),
        })
    }
}
