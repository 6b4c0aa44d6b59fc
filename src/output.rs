//! Moving a generated file to where the caller asked for it.
//!
//! The final path is only ever written by a single `rename` of the temporary
//! artifact, so anyone watching it sees either nothing or the complete file.
//! On Unix an existing file at that path is replaced atomically. When the
//! rename fails the artifact is deleted with the `TempPath` that owns it.

use crate::error::ExportError;
use std::path::{Component, Path, PathBuf};
use tempfile::TempPath;

/// Permissions for destination directories we create.
#[cfg(unix)]
const DIRECTORY_MODE: u32 = 0o755;

#[derive(Debug, Default, Clone, Copy)]
pub struct OutputPlacer;

impl OutputPlacer {
    pub fn new() -> OutputPlacer {
        OutputPlacer
    }

    /// Whether `base_name` names a file below the destination directory.
    ///
    /// `/` nests into subdirectories; roots, prefixes, `.` and `..` are refused.
    pub fn is_contained(base_name: &str) -> bool {
        let mut components = Path::new(base_name).components().peekable();
        components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
    }

    /// The path a file for `base_name` and `extension` ends up at.
    pub fn final_path(
        destination: &Path,
        base_name: &str,
        extension: &str,
    ) -> Result<PathBuf, ExportError> {
        if !Self::is_contained(base_name) {
            return Err(ExportError::InvalidArgument(format!(
                "The title '{base_name}' does not name a file inside {}.",
                destination.display()
            )));
        }
        Ok(destination.join(format!("{base_name}.{extension}")))
    }

    /// Move `temp` to `<destination>/<base_name>.<extension>`, creating the
    /// destination directory first if it is missing. A `base_name` that would
    /// escape `destination` is refused and `temp` is deleted.
    pub fn place(
        &self,
        temp: TempPath,
        destination: &Path,
        base_name: &str,
        extension: &str,
    ) -> Result<PathBuf, ExportError> {
        let output = Self::final_path(destination, base_name, extension)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                log::debug!("creating output directory {}", parent.display());
                create_dir_all(parent).map_err(|source| ExportError::Filesystem {
                    path: output.clone(),
                    source,
                })?;
            }
        }

        temp.persist(&output)
            .map_err(|e| {
                // dropping the returned TempPath removes the artifact
                let tempfile::PathPersistError { error, path } = e;
                log::debug!("removing {} after failed move", path.display());
                drop(path);
                ExportError::Filesystem {
                    path: output.clone(),
                    source: error,
                }
            })?;

        log::debug!("placed output at {}", output.display());
        Ok(output)
    }
}

#[cfg(unix)]
fn create_dir_all(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(DIRECTORY_MODE)
        .create(path)
}

#[cfg(not(unix))]
fn create_dir_all(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    fn artifact(dir: &Path, contents: &[u8]) -> TempPath {
        let mut file = tempfile::Builder::new()
            .prefix("ws-book-")
            .suffix(".epub")
            .tempfile_in(dir)
            .expect("can create temp file");
        file.write_all(contents).expect("can write temp file");
        file.into_temp_path()
    }

    #[test]
    fn composes_final_path() {
        assert_eq!(
            OutputPlacer::final_path(Path::new("./out"), "Hamlet", "epub").expect("is contained"),
            PathBuf::from("./out/Hamlet.epub")
        );
        assert_eq!(
            OutputPlacer::final_path(Path::new("out"), "Hamlet", "a4.pdf").expect("is contained"),
            PathBuf::from("out/Hamlet.a4.pdf")
        );
    }

    #[test]
    fn titles_cannot_leave_the_destination() {
        for title in ["/etc/evil", "../Hamlet", "Essays/../../Hamlet", "./Hamlet", ""] {
            let err = OutputPlacer::final_path(Path::new("/tmp/out"), title, "epub").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "title {title:?}");
        }
        assert!(OutputPlacer::is_contained("Essays/Book I"));
    }

    #[test]
    fn rooted_title_is_refused_and_artifact_removed() {
        let temp_dir = tempfile::tempdir().expect("can create temp dir");
        let out_dir = tempfile::tempdir().expect("can create out dir");
        let outside = tempfile::tempdir().expect("can create outside dir");
        let escape = outside.path().join("Hamlet");

        let temp = artifact(temp_dir.path(), b"book");
        let temp_location = temp.to_path_buf();
        let err = OutputPlacer::new()
            .place(temp, out_dir.path(), &escape.display().to_string(), "epub")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(!outside.path().join("Hamlet.epub").exists());
        assert!(!temp_location.exists());
    }

    #[test]
    fn moves_artifact_into_place() {
        let temp_dir = tempfile::tempdir().expect("can create temp dir");
        let out_dir = tempfile::tempdir().expect("can create out dir");
        let temp = artifact(temp_dir.path(), b"book");
        let temp_location = temp.to_path_buf();

        let output = OutputPlacer::new()
            .place(temp, out_dir.path(), "Hamlet", "epub")
            .expect("can place output");

        assert_eq!(output, out_dir.path().join("Hamlet.epub"));
        assert_eq!(std::fs::read(&output).expect("output exists"), b"book");
        assert!(!temp_location.exists());
    }

    #[test]
    fn creates_missing_directories() {
        let temp_dir = tempfile::tempdir().expect("can create temp dir");
        let root = tempfile::tempdir().expect("can create out dir");
        let destination = root.path().join("a/b/c");

        let output = OutputPlacer::new()
            .place(artifact(temp_dir.path(), b"book"), &destination, "Hamlet", "epub")
            .expect("can place output");
        assert!(output.is_file());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&destination)
                .expect("directory exists")
                .permissions()
                .mode();
            // the process umask can only take permissions away
            assert_eq!(mode & 0o777 & !DIRECTORY_MODE, 0);
        }
    }

    #[test]
    fn titles_with_slashes_nest() {
        let temp_dir = tempfile::tempdir().expect("can create temp dir");
        let out_dir = tempfile::tempdir().expect("can create out dir");

        let output = OutputPlacer::new()
            .place(artifact(temp_dir.path(), b"book"), out_dir.path(), "Essays/Book I", "epub")
            .expect("can place output");
        assert_eq!(output, out_dir.path().join("Essays/Book I.epub"));
        assert!(output.is_file());
    }

    #[test]
    fn replaces_existing_file() {
        let temp_dir = tempfile::tempdir().expect("can create temp dir");
        let out_dir = tempfile::tempdir().expect("can create out dir");
        std::fs::write(out_dir.path().join("Hamlet.epub"), b"old").expect("can write old file");

        let output = OutputPlacer::new()
            .place(artifact(temp_dir.path(), b"new"), out_dir.path(), "Hamlet", "epub")
            .expect("can place output");
        assert_eq!(std::fs::read(output).expect("output exists"), b"new");
    }

    #[test]
    fn failed_move_removes_artifact() {
        let temp_dir = tempfile::tempdir().expect("can create temp dir");
        let out_dir = tempfile::tempdir().expect("can create out dir");
        // a directory in the way makes the rename fail
        std::fs::create_dir(out_dir.path().join("Hamlet.epub")).expect("can create blocker");
        std::fs::write(out_dir.path().join("Hamlet.epub/keep"), b"x").expect("can fill blocker");

        let temp = artifact(temp_dir.path(), b"book");
        let temp_location = temp.to_path_buf();
        let err = OutputPlacer::new()
            .place(temp, out_dir.path(), "Hamlet", "epub")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Filesystem);
        assert!(err
            .to_string()
            .contains(&out_dir.path().join("Hamlet.epub").display().to_string()));
        assert!(!temp_location.exists());
    }

    #[test]
    fn unwritable_parent_is_a_filesystem_error() {
        let temp_dir = tempfile::tempdir().expect("can create temp dir");
        let out_dir = tempfile::tempdir().expect("can create out dir");
        // a regular file where a directory is needed
        let blocker = out_dir.path().join("file");
        std::fs::write(&blocker, b"x").expect("can write blocker");

        let err = OutputPlacer::new()
            .place(artifact(temp_dir.path(), b"book"), &blocker.join("sub"), "Hamlet", "epub")
            .unwrap_err();
        assert!(matches!(err, ExportError::Filesystem { .. }));
        assert!(std::fs::read_dir(temp_dir.path())
            .expect("can read temp dir")
            .next()
            .is_none());
    }
}
