//! Copy orchestrator
//!
//! A run moves through the [`RunPhase`]s in order:
//!
//! ```text
//! Init -> Connected -> [Cleaned] -> Selecting -> Copying -> Disconnected -> Reported
//! ```
//!
//! Fatal errors skip straight to `Disconnected`. An established session is
//! closed exactly once whichever phase the run stopped in.

use crate::{
    cleanup::cleanup_command,
    executor::PairExecutor,
    options::CopyOptions,
    target::TargetResolver,
};
use globcp_select::{validate_source_root, SelectionEngine, SelectionResult};
use globcp_types::{Error, RemoteSession, Result, RunPhase, RunReport, SessionConnector};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Logs every phase change of a run
#[derive(Debug)]
struct PhaseLog {
    current: RunPhase,
}

impl PhaseLog {
    fn new() -> Self {
        debug!("Run phase: {}", RunPhase::Init);
        Self {
            current: RunPhase::Init,
        }
    }

    fn advance(&mut self, next: RunPhase) {
        debug!("Run phase: {} -> {}", self.current, next);
        self.current = next;
    }
}

/// Drives a complete copy run against one remote session
#[derive(Debug)]
pub struct CopyOrchestrator<C> {
    options: CopyOptions,
    connector: C,
    selection: SelectionEngine,
}

impl<C: SessionConnector> CopyOrchestrator<C> {
    /// Create an orchestrator
    pub fn new(options: CopyOptions, connector: C) -> Self {
        let selection = SelectionEngine::with_options(options.match_options);
        Self {
            options,
            connector,
            selection,
        }
    }

    /// Execute the run.
    ///
    /// Returns `Err` for fatal errors (invalid source, connection, cleanup,
    /// empty selection when configured fatal). Per-file failures are counted
    /// in the returned [`RunReport`] instead.
    pub async fn run(&self) -> Result<RunReport> {
        let mut phases = PhaseLog::new();

        let source_root = validate_source_root(&self.options.source_root).map_err(|e| {
            error!("{}", e);
            phases.advance(RunPhase::Reported);
            e
        })?;

        let mut session = match self.connector.connect().await {
            Ok(session) => session,
            Err(e) => {
                error!("{}", e);
                phases.advance(RunPhase::Disconnected);
                phases.advance(RunPhase::Reported);
                return Err(e);
            }
        };
        phases.advance(RunPhase::Connected);

        let outcome = self
            .run_connected(&mut session, &source_root, &mut phases)
            .await;

        session.close().await;
        phases.advance(RunPhase::Disconnected);

        match &outcome {
            Ok(report) if report.is_success() => info!("{}", report.summary()),
            Ok(report) => error!("{}", report.summary()),
            Err(e) => error!("Run aborted: {}", e),
        }
        phases.advance(RunPhase::Reported);

        outcome
    }

    async fn run_connected(
        &self,
        session: &mut C::Session,
        source_root: &Path,
        phases: &mut PhaseLog,
    ) -> Result<RunReport> {
        if self.options.clean {
            self.clean_target(session, phases).await?;
        }

        phases.advance(RunPhase::Selecting);
        let selection = self.select(source_root.to_path_buf()).await?;
        if selection.is_empty() {
            let empty = Error::EmptySelection {
                root: source_root.to_path_buf(),
            };
            if self.options.fail_on_empty {
                return Err(empty);
            }
            warn!("{}", empty);
            return Ok(RunReport::new().with_warning(empty.to_string()));
        }

        phases.advance(RunPhase::Copying);
        let resolver = TargetResolver::new(
            selection.root(),
            &self.options.target_root,
            self.options.flatten,
        );
        let executor = PairExecutor::new(self.options.overwrite, self.options.dry_run);

        let mut outcomes = Vec::with_capacity(selection.len());
        for source in selection.into_files() {
            let pair = resolver.pair(source);
            outcomes.push(executor.execute(session, pair).await);
        }

        Ok(RunReport::from_outcomes(outcomes))
    }

    async fn clean_target(&self, session: &mut C::Session, phases: &mut PhaseLog) -> Result<()> {
        let resolver = TargetResolver::new(Path::new(""), &self.options.target_root, false);
        let target_root = resolver.target_root();

        if self.options.dry_run {
            info!("Dry run: skipping cleanup of '{}'", target_root);
            return Ok(());
        }

        let command = cleanup_command(target_root, self.options.remote_os);
        info!("Cleaning remote folder '{}'", target_root);
        debug!("Cleanup command: {}", command);
        session.execute(&command).await?;
        phases.advance(RunPhase::Cleaned);
        Ok(())
    }

    /// Enumerate and match on the blocking pool
    async fn select(&self, source_root: PathBuf) -> Result<SelectionResult> {
        let engine = self.selection.clone();
        let patterns = self.options.patterns.clone();

        tokio::task::spawn_blocking(move || engine.select_from(&source_root, patterns.as_slice()))
            .await
            .map_err(|e| Error::Io {
                message: format!("Selection task failed: {}", e),
            })?
    }
}
