//! File-backed tracing setup.
//!
//! The TUI owns stdout, so logs go to a file under the argonaut home (or
//! wherever the config points).

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

/// Initializes the global tracing subscriber writing to `path`.
///
/// # Errors
/// Returns an error when the log file or its parent directory cannot be
/// created.
pub fn init(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("argonaut=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_parent_directories() {
        // Arrange
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("nested").join("argonaut.log");

        // Act: a second global init in the same process fails, so only the
        // filesystem effect is asserted.
        let _ = init(&path);

        // Assert
        assert!(path.parent().is_some_and(Path::exists));
    }
}
