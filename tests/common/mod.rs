#![allow(dead_code)]

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};
use std::{env, fs};

use assert_fs::TempDir;
use filetime::FileTime;

pub const DAY: Duration = Duration::from_secs(86_400);
pub const MIB: u64 = 1024 * 1024;

/// Global mutex to ensure only one test manipulates HOME at a time.
static HOME_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// RAII guard that points HOME at a temporary directory.
pub struct TempHomeGuard {
    _lock: MutexGuard<'static, ()>,
    temp_home: TempDir,
    prev_home: Option<OsString>,
}

impl TempHomeGuard {
    pub fn new() -> Self {
        let lock = HOME_MUTEX
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let temp_home = TempDir::new().expect("failed to create temporary HOME");
        let prev_home = env::var_os("HOME");

        // SAFETY: we hold HOME_MUTEX, so no other test thread touches the
        // environment while HOME is redirected.
        unsafe {
            env::set_var("HOME", temp_home.path());
        }

        Self {
            _lock: lock,
            temp_home,
            prev_home,
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_home.path()
    }
}

impl Drop for TempHomeGuard {
    fn drop(&mut self) {
        // SAFETY: the mutex is still held until `_lock` drops after this.
        unsafe {
            match self.prev_home.take() {
                Some(value) => env::set_var("HOME", value),
                None => env::remove_var("HOME"),
            }
        }
    }
}

/// A directory tree of projects, some with a `venv` inside.
pub struct ProjectTree {
    dir: TempDir,
}

impl ProjectTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create `<root>/<project>/venv` with `mb` MiB of sparse data, last
    /// modified `days_old` days ago.
    pub fn env(&self, project: &str, mb: u64, days_old: u64) -> PathBuf {
        let env = self.root().join(project).join("venv");
        fs::create_dir_all(env.join("lib")).unwrap();
        fs::write(env.join("pyvenv.cfg"), "home = /usr/bin\n").unwrap();
        if mb > 0 {
            let blob = fs::File::create(env.join("lib").join("blob")).unwrap();
            blob.set_len(mb * MIB).unwrap();
        }
        age(&env, days_old);
        env
    }

    /// Like [`ProjectTree::env`], with a fake interpreter that prints
    /// `freeze_output` when asked for `-m pip freeze`.
    #[cfg(unix)]
    pub fn env_with_pip(&self, project: &str, mb: u64, days_old: u64, freeze_output: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let env = self.env(project, mb, days_old);
        let bin = env.join("bin");
        fs::create_dir_all(&bin).unwrap();
        let python = bin.join("python");
        fs::write(
            &python,
            format!("#!/bin/sh\ncat <<'EOF'\n{freeze_output}EOF\n"),
        )
        .unwrap();
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();
        age(&env, days_old);
        env
    }
}

impl std::ops::Deref for ProjectTree {
    type Target = TempDir;

    fn deref(&self) -> &Self::Target {
        &self.dir
    }
}

/// Set the mtime of `path` to `days_old` days ago.
pub fn age(path: &Path, days_old: u64) {
    let mtime = SystemTime::now() - DAY * days_old as u32;
    filetime::set_file_mtime(path, FileTime::from_system_time(mtime)).unwrap();
}
