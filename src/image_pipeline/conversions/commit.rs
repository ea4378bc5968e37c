use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::paths::PathPair;

/// Publishes the temporary artifact at its final path.
///
/// The rename replaces an existing final file in one step, so readers see
/// either the previous file or the new one. It is only atomic when both paths
/// live on the same filesystem. On failure the temporary file stays on disk.
pub fn commit(paths: &PathPair) -> Result<()> {
    std::fs::rename(&paths.temporary_path, &paths.final_path).map_err(|source| {
        ConversionError::Commit {
            from: paths.temporary_path.clone(),
            to: paths.final_path.clone(),
            source,
        }
    })?;
    debug!("Committed {}", paths.final_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn pair(dir: &std::path::Path) -> PathPair {
        PathPair::build(&dir.join("img.x3f"), None, ".dng").unwrap()
    }

    #[test]
    fn moves_temporary_to_final() {
        let dir = tempfile::tempdir().unwrap();
        let paths = pair(dir.path());
        fs::write(&paths.temporary_path, b"new").unwrap();

        commit(&paths).unwrap();

        assert_eq!(fs::read(&paths.final_path).unwrap(), b"new");
        assert!(!paths.temporary_path.exists());
    }

    #[test]
    fn replaces_existing_final() {
        let dir = tempfile::tempdir().unwrap();
        let paths = pair(dir.path());
        fs::write(&paths.final_path, b"previous").unwrap();
        fs::write(&paths.temporary_path, b"replacement").unwrap();

        commit(&paths).unwrap();

        assert_eq!(fs::read(&paths.final_path).unwrap(), b"replacement");
    }

    #[test]
    fn failure_keeps_temporary_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let paths = pair(dir.path());
        fs::create_dir(&paths.final_path).unwrap();
        fs::write(paths.final_path.join("occupied"), b"x").unwrap();
        fs::write(&paths.temporary_path, b"artifact").unwrap();

        let err = commit(&paths).unwrap_err();

        assert!(matches!(err, ConversionError::Commit { .. }));
        assert_eq!(fs::read(&paths.temporary_path).unwrap(), b"artifact");
    }

    #[test]
    fn missing_temporary_is_a_commit_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = commit(&pair(dir.path())).unwrap_err();

        assert!(matches!(err, ConversionError::Commit { .. }));
    }
}
