//! Output path construction.
//!
//! Paths are assembled piece by piece into buffers with a fixed capacity.
//! Every append is checked on its own so an oversized path is rejected as a
//! whole instead of being silently shortened.

use std::ffi::{OsStr, OsString};
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Capacity of the output base name (output dir + separator + input name).
pub const MAX_PATH: usize = 1000;
/// Room reserved for one extension.
pub const EXT_MAX: usize = 10;
/// Capacity of the final output path.
pub const MAX_OUT_PATH: usize = MAX_PATH + EXT_MAX;
/// Capacity of the temporary output path.
pub const MAX_TMP_PATH: usize = MAX_OUT_PATH + EXT_MAX;
/// Marker appended to the final path to name the temporary artifact.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Temporary and final location of one output artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPair {
    pub temporary_path: PathBuf,
    pub final_path: PathBuf,
}

impl PathPair {
    /// Derives the output paths for `input`.
    ///
    /// Without an output directory the input path itself is the base name;
    /// with one, the base name is `output_dir` + separator + the last segment
    /// of `input`. The final path is base name + `extension`, the temporary
    /// path is final path + [`TEMP_SUFFIX`].
    pub fn build(input: &Path, output_dir: Option<&Path>, extension: &str) -> Result<Self> {
        let mut base = BoundedPath::new("output base name", MAX_PATH);
        match output_dir {
            None => base.push(input.as_os_str())?,
            Some(dir) => {
                base.push(dir.as_os_str())?;
                base.push(OsStr::new(MAIN_SEPARATOR_STR))?;
                base.push(last_segment(input))?;
            }
        }

        let mut final_path = BoundedPath::new("output path", MAX_OUT_PATH);
        final_path.push(base.as_os_str())?;
        final_path.push(OsStr::new(extension))?;

        let mut temporary_path = BoundedPath::new("temporary path", MAX_TMP_PATH);
        temporary_path.push(final_path.as_os_str())?;
        temporary_path.push(OsStr::new(TEMP_SUFFIX))?;

        Ok(Self {
            temporary_path: temporary_path.into_path_buf(),
            final_path: final_path.into_path_buf(),
        })
    }
}

/// Text after the last separator of `input`, taken verbatim. `a/b/..` gives
/// `..` and `a/b/` gives an empty name.
fn last_segment(input: &Path) -> &OsStr {
    let bytes = input.as_os_str().as_encoded_bytes();
    match bytes
        .iter()
        .rposition(|&b| b.is_ascii() && std::path::is_separator(char::from(b)))
    {
        // SAFETY: the slice starts right after an ASCII separator, which is a
        // valid split point of the encoded bytes.
        Some(pos) => unsafe { OsStr::from_encoded_bytes_unchecked(&bytes[pos + 1..]) },
        None => input.as_os_str(),
    }
}

/// Path buffer that refuses to grow past `limit` bytes.
struct BoundedPath {
    buf: OsString,
    limit: usize,
    what: &'static str,
}

impl BoundedPath {
    fn new(what: &'static str, limit: usize) -> Self {
        Self {
            buf: OsString::with_capacity(limit),
            limit,
            what,
        }
    }

    fn push(&mut self, part: &OsStr) -> Result<()> {
        let len = self.buf.as_encoded_bytes().len() + part.as_encoded_bytes().len();
        if len > self.limit {
            return Err(ConversionError::PathTooLarge {
                what: self.what,
                limit: self.limit,
            });
        }
        self.buf.push(part);
        Ok(())
    }

    fn as_os_str(&self) -> &OsStr {
        &self.buf
    }

    fn into_path_buf(self) -> PathBuf {
        PathBuf::from(self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(parts: &[&str]) -> PathBuf {
        PathBuf::from(parts.join(MAIN_SEPARATOR_STR))
    }

    #[test]
    fn without_output_dir_appends_extension_to_input() {
        let input = joined(&["photos", "a.x3f"]);
        let pair = PathPair::build(&input, None, ".dng").unwrap();

        assert_eq!(pair.final_path, PathBuf::from(format!("{}.dng", input.display())));
        assert_eq!(
            pair.temporary_path,
            PathBuf::from(format!("{}.dng.tmp", input.display()))
        );
    }

    #[test]
    fn with_output_dir_uses_last_segment() {
        let input = joined(&["photos", "2024", "b.x3f"]);
        let out = PathBuf::from("out");
        let pair = PathPair::build(&input, Some(&out), ".tif").unwrap();

        assert_eq!(pair.final_path, joined(&["out", "b.x3f.tif"]));
        assert_eq!(pair.temporary_path, joined(&["out", "b.x3f.tif.tmp"]));
    }

    #[test]
    fn name_is_the_text_after_the_last_separator() {
        let out = PathBuf::from("out");

        let dotdot = joined(&["a", "b", ".."]);
        let pair = PathPair::build(&dotdot, Some(&out), ".dng").unwrap();
        assert_eq!(pair.final_path, joined(&["out", "...dng"]));

        let trailing = PathBuf::from(format!("a{MAIN_SEPARATOR_STR}b{MAIN_SEPARATOR_STR}"));
        let pair = PathPair::build(&trailing, Some(&out), ".dng").unwrap();
        assert_eq!(pair.final_path, joined(&["out", ".dng"]));
        assert_eq!(pair.temporary_path, joined(&["out", ".dng.tmp"]));
    }

    #[test]
    fn input_without_directory_goes_under_output_dir() {
        let out = PathBuf::from("out");
        let pair = PathPair::build(Path::new("c.x3f"), Some(&out), ".jpg").unwrap();

        assert_eq!(pair.final_path, joined(&["out", "c.x3f.jpg"]));
    }

    #[test]
    fn temporary_path_is_final_path_plus_marker() {
        let pair = PathPair::build(Path::new("d.x3f"), None, ".meta").unwrap();
        let mut expected = pair.final_path.clone().into_os_string();
        expected.push(TEMP_SUFFIX);

        assert_eq!(pair.temporary_path.as_os_str(), expected.as_os_str());
    }

    #[test]
    fn input_at_the_bound_is_accepted() {
        let input = "a".repeat(MAX_PATH);
        let pair = PathPair::build(Path::new(&input), None, ".dng").unwrap();

        assert_eq!(pair.final_path.as_os_str().len(), MAX_PATH + 4);
    }

    #[test]
    fn input_over_the_bound_fails() {
        let input = "a".repeat(MAX_PATH + 1);
        let err = PathPair::build(Path::new(&input), None, ".dng").unwrap_err();

        assert!(matches!(
            err,
            ConversionError::PathTooLarge { limit: MAX_PATH, .. }
        ));
    }

    #[test]
    fn output_dir_plus_name_over_the_bound_fails() {
        let dir = "d".repeat(MAX_PATH - 5);
        let err = PathPair::build(Path::new("image.x3f"), Some(Path::new(&dir)), ".dng")
            .unwrap_err();

        assert!(matches!(err, ConversionError::PathTooLarge { what: "output base name", .. }));
    }

    #[test]
    fn oversized_extension_fails_at_final_path() {
        let input = "a".repeat(MAX_PATH);
        let extension = format!(".{}", "x".repeat(EXT_MAX));
        let err = PathPair::build(Path::new(&input), None, &extension).unwrap_err();

        assert!(matches!(err, ConversionError::PathTooLarge { limit: MAX_OUT_PATH, .. }));
    }
}
