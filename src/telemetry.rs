//! Tracing setup.
//!
//! - `KANJIQUIZ_LOG` controls the filter (e.g. "debug" or "info,kanjiquiz::session=debug").
//! - Logs go to a file because the terminal belongs to the quiz.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "kanjiquiz.log";

/// MARK:ログファイルのパスを取得する
pub fn default_log_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("jp", "kanjiquiz", "KANJI_QUIZ") {
        let data_dir = proj_dirs.data_local_dir();
        if fs::create_dir_all(data_dir).is_ok() {
            return data_dir.join(LOG_FILE);
        }
    }

    // 取得できなかったらカレントディレクトリに
    PathBuf::from(LOG_FILE)
}

pub fn init_tracing(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("KANJIQUIZ_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install tracing subscriber")?;

    Ok(())
}
