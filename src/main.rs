//! # venv-sweep CLI
//!
//! Finds stale Python virtual environments and reclaims their disk space.
//!
//! ## Commands
//!
//! - **scan**: List every `venv` folder with its age and size
//! - **sweep**: Export requirements.txt, then delete qualifying environments
//!   (a dry run unless `--no-dry-run` is given)
//! - **freeze**: Export requirements.txt only
//!
//! ## Quick Start
//!
//! ```bash
//! # What is there?
//! venv-sweep --root ~/code scan
//!
//! # Preview, then actually reclaim space
//! venv-sweep --root ~/code sweep
//! venv-sweep --root ~/code sweep --no-dry-run
//! ```
//!
//! ## Environment Variables
//!
//! - `VENV_SWEEP_ROOT`: Directory to scan (default: .)
//! - `VENV_SWEEP_AGE_THRESHOLD_DAYS`: Minimum age in days (default: 60)
//! - `VENV_SWEEP_SIZE_THRESHOLD_MB`: Minimum size in MiB (default: 200)
//! - `VENV_SWEEP_VERBOSE`: Enable verbose output
//! - `VENV_SWEEP_QUIET`: Silence all output except errors
//!
//! See individual commands for more environment variables.

use std::io::IsTerminal;

use venv_sweep::cli::Cli;

fn main() -> miette::Result<()> {
    miette::set_panic_hook();

    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))?;
    } else {
        // Plain output for logs and pipes
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))?;
    }

    let cli = Cli::parse_args();

    venv_sweep::commands::execute(&cli).map_err(Into::into)
}
