//! Database URL resolution for the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

const DB_ENV: &str = "EXAM_DB_URL";
const DEFAULT_DB: &str = "exam.sqlite3";

/// Pick the database URL from the flag, then `EXAM_DB_URL`, then the default
/// file in the working directory.
pub fn resolve_url(flag: Option<String>) -> Result<String> {
    let raw = flag
        .or_else(|| std::env::var(DB_ENV).ok())
        .unwrap_or_else(|| DEFAULT_DB.to_owned());
    if raw.trim().is_empty() {
        bail!("invalid --db value: {raw:?}");
    }
    Ok(normalize_sqlite_url(&raw))
}

/// Turn a bare or relative path into an absolute `sqlite://` URL. Memory and
/// already-absolute URLs pass through.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:"
        || trimmed.starts_with("sqlite://")
        || trimmed.starts_with("sqlite:file:")
    {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file (and its directory) so `SQLite` can open it.
pub fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_and_absolute_urls_pass_through() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/exam.db"),
            "sqlite:///tmp/exam.db"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:file:t?mode=memory&cache=shared"),
            "sqlite:file:t?mode=memory&cache=shared"
        );
    }

    #[test]
    fn bare_paths_become_absolute_urls() {
        assert_eq!(normalize_sqlite_url("/var/exam.db"), "sqlite:///var/exam.db");
        assert_eq!(normalize_sqlite_url("sqlite:/var/exam.db"), "sqlite:///var/exam.db");

        let relative = normalize_sqlite_url("data/exam.db");
        assert!(relative.starts_with("sqlite:///"));
        assert!(relative.ends_with("data/exam.db"));
    }

    #[test]
    fn flag_wins_and_blank_is_rejected() {
        assert_eq!(
            resolve_url(Some("sqlite::memory:".into())).unwrap(),
            "sqlite::memory:"
        );
        assert!(resolve_url(Some("  ".into())).is_err());
    }

    #[test]
    fn memory_url_needs_no_file() {
        prepare_sqlite_file("sqlite::memory:").unwrap();
        assert!(prepare_sqlite_file("postgres://nope").is_err());
    }
}
