//! Lazily created, owner-scoped scratch directory.
//!
//! The directory lives at `<base>/rundir_<pid>_<suffix>/` where `<suffix>` is
//! six random lowercase letters. It is created on first access and removed
//! recursively by [`ScratchSpace::teardown`] or when the value is dropped.
//! `std::process::exit` skips destructors, so terminal report paths call
//! `teardown` explicitly before exiting.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{OracleError, OracleResult};
use crate::obs;

const SUFFIX_LEN: usize = 6;

#[derive(Debug)]
pub struct ScratchSpace {
    path: PathBuf,
    created: bool,
}

impl ScratchSpace {
    /// Reserve a scratch path under `base`. Nothing touches the disk yet.
    pub fn new(base: &Path) -> Self {
        let name = format!("rundir_{}_{}", std::process::id(), random_suffix());
        Self {
            path: base.join(name),
            created: false,
        }
    }

    /// The scratch directory, creating it (and missing parents) on first call.
    pub fn dir(&mut self) -> OracleResult<&Path> {
        if !self.created {
            std::fs::create_dir_all(&self.path).map_err(|source| OracleError::ScratchCreate {
                path: self.path.clone(),
                source,
            })?;
            self.created = true;
            obs::emit_scratch_created(&self.path);
        }
        Ok(&self.path)
    }

    /// Reserved path, whether or not it has been created.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Recursively remove the directory if it was created. Idempotent.
    pub fn teardown(&mut self) -> OracleResult<()> {
        if !self.created {
            return Ok(());
        }
        self.created = false;
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => {
                obs::emit_scratch_removed(&self.path);
                Ok(())
            }
            // Someone else already cleaned up; nothing left to leak.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(OracleError::ScratchRemove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            obs::emit_scratch_remove_failed(&self.path, &e);
        }
    }
}

fn random_suffix() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(SUFFIX_LEN)
        .map(|b| char::from(b'a' + b % 26))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_is_stable_and_exists() {
        let base = tempfile::tempdir().unwrap();
        let mut scratch = ScratchSpace::new(base.path());

        let first = scratch.dir().unwrap().to_path_buf();
        assert!(first.is_dir());
        for _ in 0..5 {
            assert_eq!(scratch.dir().unwrap(), first.as_path());
        }
    }

    #[test]
    fn test_name_pattern() {
        let base = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::new(base.path());
        let name = scratch
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap()
            .to_string();

        let prefix = format!("rundir_{}_", std::process::id());
        assert!(name.starts_with(&prefix), "unexpected name {name}");
        let suffix = &name[prefix.len()..];
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase()));
        assert_eq!(scratch.path().parent(), Some(base.path()));
    }

    #[test]
    fn test_not_created_until_accessed() {
        let base = tempfile::tempdir().unwrap();
        let mut scratch = ScratchSpace::new(base.path());
        assert!(!scratch.is_created());
        assert!(!scratch.path().exists());

        // Teardown of a never-created directory is a no-op.
        scratch.teardown().unwrap();
        assert!(!scratch.path().exists());
    }

    #[test]
    fn test_teardown_removes_contents_and_is_idempotent() {
        let base = tempfile::tempdir().unwrap();
        let mut scratch = ScratchSpace::new(base.path());
        let dir = scratch.dir().unwrap().to_path_buf();
        std::fs::write(dir.join("bin1"), b"artifact").unwrap();
        std::fs::create_dir(dir.join("nested")).unwrap();

        scratch.teardown().unwrap();
        assert!(!dir.exists());
        assert!(!scratch.is_created());
        scratch.teardown().unwrap();
    }

    #[test]
    fn test_teardown_tolerates_external_removal() {
        let base = tempfile::tempdir().unwrap();
        let mut scratch = ScratchSpace::new(base.path());
        let dir = scratch.dir().unwrap().to_path_buf();
        std::fs::remove_dir_all(&dir).unwrap();

        scratch.teardown().unwrap();
    }

    #[test]
    fn test_drop_removes_directory() {
        let base = tempfile::tempdir().unwrap();
        let dir = {
            let mut scratch = ScratchSpace::new(base.path());
            scratch.dir().unwrap().to_path_buf()
        };
        assert!(!dir.exists());
    }

    #[test]
    fn test_creates_missing_parents() {
        let base = tempfile::tempdir().unwrap();
        let nested = base.path().join("a").join("b");
        let mut scratch = ScratchSpace::new(&nested);
        assert!(scratch.dir().unwrap().starts_with(&nested));
    }

    #[test]
    fn test_create_failure_propagates() {
        let base = tempfile::tempdir().unwrap();
        let blocker = base.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let mut scratch = ScratchSpace::new(&blocker);
        match scratch.dir().unwrap_err() {
            OracleError::ScratchCreate { path, .. } => assert!(path.starts_with(&blocker)),
            other => panic!("expected ScratchCreate, got {:?}", other),
        }
        assert!(!scratch.is_created());
    }

    #[test]
    fn test_two_spaces_get_distinct_paths() {
        let base = tempfile::tempdir().unwrap();
        let a = ScratchSpace::new(base.path());
        let b = ScratchSpace::new(base.path());
        assert_ne!(a.path(), b.path());
    }
}
