//! Background execution of long-running pipeline steps.
//!
//! A scan over a large tree, or a batch of `pip freeze` runs, can take
//! minutes. [`Task`] runs such a step on
//! its own thread and hands the result back over a channel, so the caller's
//! thread stays free to redraw progress or accept input. The worker never
//! touches caller state directly.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use crate::logging::Logger;
use crate::manifest::{ManifestGenerator, ManifestTarget};
use crate::remove::remove_batch_logged;
use crate::report::BatchReport;
use crate::scan::{Entry, Scanner};

/// Handle to a job running on a worker thread.
#[derive(Debug)]
pub struct Task<T> {
    name: String,
    rx: Receiver<Result<T>>,
}

impl<T: Send + 'static> Task<T> {
    /// Start `job` on a new thread named `name`.
    pub fn spawn<F>(name: impl Into<String>, job: F) -> Result<Self>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let name = name.into();
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                // The receiver may be gone if the caller gave up; nothing to do then.
                let _ = tx.send(job());
            })
            .map_err(|err| SweepError::Worker(format!("could not start {name}: {err}")))?;

        Ok(Self { name, rx })
    }

    /// The result if the job has finished, without blocking.
    pub fn try_result(&self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(self.died())),
        }
    }

    /// Wait up to `timeout` for the result.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(self.died())),
        }
    }

    /// Block until the job finishes.
    pub fn wait(self) -> Result<T> {
        self.rx.recv().unwrap_or_else(|_| Err(self.died()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn died(&self) -> SweepError {
        SweepError::Worker(format!("{} stopped without a result", self.name))
    }
}

/// Run the scan described by `config` on a worker thread.
pub fn spawn_scan(config: &SweepConfig, log: Logger) -> Result<Task<Vec<Entry>>> {
    let root = config.root().to_path_buf();
    let thresholds = config.thresholds();

    Task::spawn("venv-scan", move || {
        Scanner::new().logger(log).scan(&root, thresholds)
    })
}

/// Export a manifest for every target on a worker thread.
pub fn spawn_manifests(
    generator: ManifestGenerator,
    targets: Vec<ManifestTarget>,
    overwrite: bool,
) -> Result<Task<BatchReport>> {
    Task::spawn("venv-manifests", move || {
        Ok(generator.generate_batch(&targets, overwrite))
    })
}

/// Remove `environment_paths` on a worker thread.
pub fn spawn_removal(
    environment_paths: Vec<PathBuf>,
    dry_run: bool,
    log: Logger,
) -> Result<Task<BatchReport>> {
    Task::spawn("venv-remove", move || {
        remove_batch_logged(&environment_paths, dry_run, &log)
    })
}
