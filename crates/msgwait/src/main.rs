use std::{path::Path, sync::Arc};

use msgwait_core::config::Config;

fn main() -> Result<(), msgwait_core::Error> {
    // Mutates the process environment, so it runs before any worker thread exists.
    load_env_file(Path::new(".env"));

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run())
}

/// Apply `KEY=VALUE` pairs from `path`. Variables already set win; a missing file is fine.
fn load_env_file(path: &Path) {
    dotenvy::from_path(path).ok();
}

async fn run() -> Result<(), msgwait_core::Error> {
    msgwait_core::logging::init("msgwait")?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!("config load failed: {e}");
            return Err(e);
        }
    };

    msgwait_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| msgwait_core::Error::External(format!("telegram listener failed: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs, path::PathBuf};

    #[test]
    fn env_file_fills_gaps_without_overriding() {
        let path = PathBuf::from(format!("/tmp/msgwait-env-{}", std::process::id()));
        fs::write(
            &path,
            "# comment\nMSGWAIT_TEST_FROM_FILE=file-value\nMSGWAIT_TEST_PRESET=\"file-value\"\n",
        )
        .unwrap();
        env::set_var("MSGWAIT_TEST_PRESET", "shell-value");

        load_env_file(&path);

        assert_eq!(env::var("MSGWAIT_TEST_FROM_FILE").unwrap(), "file-value");
        assert_eq!(env::var("MSGWAIT_TEST_PRESET").unwrap(), "shell-value");

        load_env_file(Path::new("/tmp/msgwait-no-such-env-file"));
        let _ = fs::remove_file(&path);
    }
}
