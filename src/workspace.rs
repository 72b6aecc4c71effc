//! @ai:module:intent Scoped working-directory stack and atomic artifact writes
//! @ai:module:layer infrastructure
//! @ai:module:public_api WorkingPathStack, WorkingPathGuard, write_atomic
//! @ai:module:stateless false

use anyhow::{Context, Result};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

/// @ai:intent Stack of nested output directories for the stage being run
/// @ai:invariant depth returns to its previous value when a guard is dropped
#[derive(Debug)]
pub struct WorkingPathStack {
    root: PathBuf,
    segments: Vec<PathBuf>,
}

impl WorkingPathStack {
    /// @ai:intent Create a stack rooted at an existing or creatable directory
    /// @ai:effects fs:write
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create working path {}", root.display()))?;
        Ok(Self {
            root,
            segments: Vec::new(),
        })
    }

    /// @ai:intent Current working directory
    /// @ai:effects pure
    pub fn current(&self) -> PathBuf {
        self.segments
            .iter()
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// @ai:intent Push a subdirectory (created if missing); popped when the guard drops
    /// @ai:effects fs:write
    pub fn enter(&mut self, segment: impl AsRef<Path>) -> Result<WorkingPathGuard<'_>> {
        let segment = segment.as_ref().to_path_buf();
        let path = self.current().join(&segment);
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create working path {}", path.display()))?;

        self.segments.push(segment);
        Ok(WorkingPathGuard { stack: self })
    }

    /// @ai:intent Create a directory under the current path without entering it
    /// @ai:effects fs:write
    pub fn ensure(&self, segment: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.current().join(segment);
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
        Ok(path)
    }
}

/// @ai:intent Scope of one pushed directory; derefs to the stack for nesting
pub struct WorkingPathGuard<'a> {
    stack: &'a mut WorkingPathStack,
}

impl Deref for WorkingPathGuard<'_> {
    type Target = WorkingPathStack;

    fn deref(&self) -> &Self::Target {
        self.stack
    }
}

impl DerefMut for WorkingPathGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stack
    }
}

impl Drop for WorkingPathGuard<'_> {
    fn drop(&mut self) {
        self.stack.segments.pop();
    }
}

/// @ai:intent Write a file through a sibling temp file and rename it into place
/// @ai:effects fs:write
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    use std::io::Write;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    file.write_all(contents)?;
    file.persist(path)
        .with_context(|| format!("Failed to persist {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_nested_guards_restore_depth() {
        let temp = TempDir::new().unwrap();
        let mut stack = WorkingPathStack::new(temp.path()).unwrap();

        {
            let mut step = stack.enter("00_Final").unwrap();
            assert_eq!(step.depth(), 1);
            {
                let source = step.enter("source").unwrap();
                assert_eq!(source.depth(), 2);
                assert_eq!(source.current(), temp.path().join("00_Final").join("source"));
                assert!(source.current().is_dir());
            }
            assert_eq!(step.depth(), 1);
        }

        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current(), temp.path());
    }

    #[test]
    fn test_guard_pops_on_error_path() {
        fn failing(stack: &mut WorkingPathStack) -> Result<()> {
            let _guard = stack.enter("group")?;
            anyhow::bail!("abort inside scope")
        }

        let temp = TempDir::new().unwrap();
        let mut stack = WorkingPathStack::new(temp.path()).unwrap();

        assert!(failing(&mut stack).is_err());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Data").join("00_Final.yaml");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
