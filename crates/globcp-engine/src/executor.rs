//! Per-file copy execution
//!
//! [`PairExecutor`] turns one [`CopyPair`] into one [`CopyOutcome`]. It never
//! returns an error: anything that goes wrong with a single file is captured
//! in the outcome so the batch can continue.

use globcp_types::{CopyOutcome, CopyPair, Error, RemoteSession, Result};
use tracing::{error, info};

/// Copies single files over a [`RemoteSession`]
#[derive(Debug, Clone, Copy)]
pub struct PairExecutor {
    overwrite: bool,
    dry_run: bool,
}

impl PairExecutor {
    /// Create an executor
    pub fn new(overwrite: bool, dry_run: bool) -> Self {
        Self { overwrite, dry_run }
    }

    /// Copy one pair and report what happened
    pub async fn execute<S>(&self, session: &mut S, pair: CopyPair) -> CopyOutcome
    where
        S: RemoteSession + ?Sized,
    {
        if self.dry_run {
            info!(
                "Dry run: would copy '{}' to '{}'",
                pair.source.display(),
                pair.remote
            );
            return CopyOutcome::planned(pair);
        }

        match self.copy(session, &pair).await {
            Ok(()) => {
                info!("Copied '{}' to '{}'", pair.source.display(), pair.remote);
                CopyOutcome::copied(pair)
            }
            Err(e) => {
                error!("Failed to copy '{}': {}", pair.source.display(), e);
                CopyOutcome::failed(pair, e)
            }
        }
    }

    async fn copy<S>(&self, session: &mut S, pair: &CopyPair) -> Result<()>
    where
        S: RemoteSession + ?Sized,
    {
        if !self.overwrite {
            let exists = session
                .exists(&pair.remote)
                .await
                .map_err(|e| per_file(e, pair))?;
            if exists {
                return Err(Error::ExistsConflict {
                    remote: pair.remote.clone(),
                });
            }
        }

        session
            .transfer(&pair.source, &pair.remote)
            .await
            .map_err(|e| per_file(e, pair))
    }
}

/// Errors raised while handling one file never end the run
fn per_file(error: Error, pair: &CopyPair) -> Error {
    if error.is_fatal() {
        Error::transfer(&pair.source, &pair.remote, error.to_string())
    } else {
        error
    }
}
