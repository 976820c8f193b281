use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How a `pip freeze` invocation ended.
#[derive(Debug)]
pub(crate) enum FreezeRun {
    /// Exit status zero; `stdout` is the captured output, byte for byte.
    Completed { stdout: Vec<u8> },
    /// Non-zero exit or death by signal.
    Failed { status: ExitStatus, stderr: String },
    /// The deadline passed before the child exited and closed its output.
    TimedOut,
}

/// Run `<interpreter> -m pip freeze`, giving up once `timeout` elapses.
///
/// The deadline covers both the child's exit and reading its output to the
/// end, so a descendant that keeps the pipes open cannot stretch it.
pub(crate) fn run_freeze(interpreter: &Path, timeout: Duration) -> io::Result<FreezeRun> {
    let deadline = Instant::now() + timeout;
    let mut child = Command::new(interpreter)
        .args(["-m", "pip", "freeze"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    // Reader threads left behind on timeout finish once the pipes close.
    let Some(status) = wait_with_deadline(&mut child, deadline)? else {
        return Ok(FreezeRun::TimedOut);
    };
    let Some(stdout) = collect(stdout, deadline)? else {
        return Ok(FreezeRun::TimedOut);
    };
    let Some(stderr) = collect(stderr, deadline)? else {
        return Ok(FreezeRun::TimedOut);
    };

    if status.success() {
        Ok(FreezeRun::Completed { stdout })
    } else {
        Ok(FreezeRun::Failed {
            status,
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        })
    }
}

/// Poll the child until it exits or `deadline` passes. `None` means it was
/// killed.
fn wait_with_deadline(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        let now = Instant::now();
        if now >= deadline {
            // kill() fails if the child exited in the meantime; either way
            // it must be reaped.
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }

        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

/// Read `pipe` to the end on a helper thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<io::Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = tx.send(pipe.read_to_end(&mut buf).map(|_| buf));
    });
    rx
}

/// The drained output, or `None` if it is not complete by `deadline`.
fn collect(
    output: Option<Receiver<io::Result<Vec<u8>>>>,
    deadline: Instant,
) -> io::Result<Option<Vec<u8>>> {
    let Some(rx) = output else {
        return Ok(Some(Vec::new()));
    };

    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(result) => result.map(Some),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => Err(io::Error::other("output reader thread panicked")),
    }
}
