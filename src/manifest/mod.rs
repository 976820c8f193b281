//! Dependency manifests exported from virtual environments.
//!
//! Before an environment is deleted its installed packages can be captured
//! with `pip freeze` into a `requirements.txt` next to it, in the owning
//! project directory. The file holds the command's output exactly as
//! emitted.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//!
//! use venv_sweep::manifest::ManifestGenerator;
//!
//! let generator = ManifestGenerator::new().timeout(Duration::from_secs(10));
//! let outcome = generator.generate(
//!     Path::new("projects/api/venv"),
//!     Path::new("projects/api/requirements.txt"),
//!     false,
//! )?;
//! println!("{}", outcome.message);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, ensure_not_blank};
use crate::logging::Logger;
use crate::remove::DRY_RUN_MARKER;
use crate::report::{BatchReport, Outcome};
use crate::scan::Entry;

mod freeze;
#[cfg(test)]
mod tests;

use freeze::{FreezeRun, run_freeze};

/// File written into the owner directory.
pub const MANIFEST_FILE_NAME: &str = "requirements.txt";
/// Hard limit on a single `pip freeze` run.
pub const DEFAULT_FREEZE_TIMEOUT: Duration = Duration::from_secs(30);

/// Interpreter locations inside an environment, in lookup order.
const INTERPRETER_LAYOUTS: [&[&str]; 2] = [&["Scripts", "python.exe"], &["bin", "python"]];

/// Where the interpreter of `environment_path` lives, if anywhere.
///
/// The Windows layout is checked before the POSIX one. Only existence as a
/// file is checked, not whether it actually runs.
pub fn locate_interpreter(environment_path: &Path) -> Option<PathBuf> {
    INTERPRETER_LAYOUTS
        .iter()
        .map(|parts| parts.iter().fold(environment_path.to_path_buf(), |p, part| p.join(part)))
        .find(|candidate| candidate.is_file())
}

/// [`ManifestGenerator::generate`] with the default timeout.
pub fn generate(environment_path: &Path, output_path: &Path, overwrite: bool) -> Result<Outcome> {
    ManifestGenerator::new().generate(environment_path, output_path, overwrite)
}

/// [`ManifestGenerator::generate_batch`] with the default timeout.
pub fn generate_batch(targets: &[ManifestTarget], overwrite: bool) -> BatchReport {
    ManifestGenerator::new().generate_batch(targets, overwrite)
}

/// One item of a manifest batch.
///
/// Both paths are optional so that incomplete records coming from a front
/// end are reported as failures instead of being rejected wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestTarget {
    pub environment_path: Option<PathBuf>,
    /// Directory that receives the manifest
    pub owner_path: Option<PathBuf>,
}

impl ManifestTarget {
    pub fn new(environment_path: impl Into<PathBuf>, owner_path: impl Into<PathBuf>) -> Self {
        Self {
            environment_path: Some(environment_path.into()),
            owner_path: Some(owner_path.into()),
        }
    }
}

impl From<&Entry> for ManifestTarget {
    fn from(entry: &Entry) -> Self {
        Self::new(&entry.environment_path, &entry.owner_path)
    }
}

/// Runs `pip freeze` inside environments and stores the result.
#[derive(Debug, Clone, Copy)]
pub struct ManifestGenerator {
    timeout: Duration,
    dry_run: bool,
    log: Logger,
}

impl Default for ManifestGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestGenerator {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_FREEZE_TIMEOUT,
            dry_run: false,
            log: Logger::silent(),
        }
    }

    /// Set the limit for one `pip freeze` run
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check every precondition but neither run `pip` nor write anything
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn logger(mut self, log: Logger) -> Self {
        self.log = log;
        self
    }

    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    /// Write the package list of `environment_path` to `output_path`.
    ///
    /// Returns `Err` only for blank arguments. Everything that can go wrong
    /// at run time (missing environment, existing output without
    /// `overwrite`, missing interpreter, failing or hanging `pip`, write
    /// errors) comes back as a failed [`Outcome`]. In a dry run the checks
    /// up to locating the interpreter still apply and nothing is written.
    pub fn generate(
        &self,
        environment_path: &Path,
        output_path: &Path,
        overwrite: bool,
    ) -> Result<Outcome> {
        ensure_not_blank(environment_path, "environment_path")?;
        ensure_not_blank(output_path, "output_path")?;

        if !environment_path.exists() {
            return Ok(Outcome::failed(format!(
                "Environment path does not exist: {}",
                environment_path.display()
            )));
        }
        if !environment_path.is_dir() {
            return Ok(Outcome::failed(format!(
                "Environment path is not a directory: {}",
                environment_path.display()
            )));
        }
        if output_path.exists() && !overwrite {
            return Ok(Outcome::failed(format!(
                "Requirements file already exists: {}",
                output_path.display()
            )));
        }

        let Some(interpreter) = locate_interpreter(environment_path) else {
            return Ok(Outcome::failed(format!(
                "Could not find Python executable in environment: {}",
                environment_path.display()
            )));
        };

        if self.dry_run {
            return Ok(Outcome::succeeded(format!(
                "{DRY_RUN_MARKER} Would write: {}",
                output_path.display()
            )));
        }

        self.log.verbose(2, format!("  Running {} -m pip freeze", interpreter.display()));

        let stdout = match run_freeze(&interpreter, self.timeout) {
            Ok(FreezeRun::Completed { stdout }) => stdout,
            Ok(FreezeRun::Failed { status, stderr }) => {
                return Ok(Outcome::failed(format!(
                    "pip freeze failed ({status}): {stderr}"
                )));
            }
            Ok(FreezeRun::TimedOut) => {
                return Ok(Outcome::failed(format!(
                    "pip freeze timed out after {}s",
                    self.timeout.as_secs_f64()
                )));
            }
            Err(err) => {
                return Ok(Outcome::failed(format!(
                    "Error generating requirements: {err}"
                )));
            }
        };

        if let Err(err) = fs::write(output_path, &stdout) {
            return Ok(Outcome::failed(format!(
                "Error generating requirements: could not write {}: {err}",
                output_path.display()
            )));
        }

        let packages = count_packages(&String::from_utf8_lossy(&stdout));
        Ok(Outcome::succeeded(format!(
            "Successfully created {} with {packages} packages",
            output_path.display()
        )))
    }

    /// Generate a manifest for every target, in order.
    ///
    /// The manifest goes to `<owner_path>/requirements.txt`. Targets missing
    /// either path fail without running anything; no failure stops the batch.
    pub fn generate_batch(&self, targets: &[ManifestTarget], overwrite: bool) -> BatchReport {
        let mut report = BatchReport::new();

        for target in targets {
            let environment = target.environment_path.as_deref().filter(|p| !is_blank(p));
            let owner = target.owner_path.as_deref().filter(|p| !is_blank(p));

            let (Some(environment), Some(owner)) = (environment, owner) else {
                report.record(
                    target.environment_path.clone().unwrap_or_default(),
                    Outcome::failed("Missing environment path or owner path"),
                );
                continue;
            };

            let output_path = owner.join(MANIFEST_FILE_NAME);
            // Both paths were checked for blankness above.
            let outcome = self
                .generate(environment, &output_path, overwrite)
                .unwrap_or_else(|err| Outcome::failed(err.to_string()));
            self.log.verbose(1, format!("  {}", outcome.message));
            report.record(environment, outcome);
        }

        report
    }
}

/// Lines that name a package: not blank and not a `#` comment.
fn count_packages(freeze_output: &str) -> usize {
    freeze_output
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .count()
}

fn is_blank(path: &Path) -> bool {
    ensure_not_blank(path, "path").is_err()
}
