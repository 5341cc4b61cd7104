use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::index::SkillIndex;

/// Live-reloadable skill index holder.
///
/// Wraps `SkillIndex` in an `ArcSwap` so evaluators never block and a reload
/// atomically swaps the pointer. Evaluations that already hold a snapshot keep
/// matching against it until they finish.
pub struct IndexHandle {
    inner: Arc<ArcSwap<SkillIndex>>,
    sources: Vec<PathBuf>,
}

impl IndexHandle {
    /// Create a handle seeded with `index`, reloadable from `sources`.
    pub fn new(index: SkillIndex, sources: Vec<PathBuf>) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(index)),
            sources,
        }
    }

    /// Load the sources (precedence order) and wrap the result.
    pub fn open(sources: Vec<PathBuf>) -> Result<Self> {
        let index = SkillIndex::load_merged(&sources)?;
        Ok(Self::new(index, sources))
    }

    /// Current snapshot. Lock-free.
    pub fn snapshot(&self) -> Arc<SkillIndex> {
        self.inner.load_full()
    }

    /// Re-read every source and swap in the fresh index.
    ///
    /// On error the previous snapshot stays active.
    pub fn reload(&self) -> Result<()> {
        let fresh = SkillIndex::load_merged(&self.sources)?;
        let skills = fresh.len();
        self.inner.store(Arc::new(fresh));
        info!(skills, "skill index hot-reloaded");
        Ok(())
    }

    /// Swap in an index built elsewhere.
    pub fn store(&self, index: SkillIndex) {
        self.inner.store(Arc::new(index));
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn primary_source(&self) -> Option<&Path> {
        self.sources.first().map(PathBuf::as_path)
    }
}

impl Clone for IndexHandle {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            sources: self.sources.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SkillDescriptor;
    use std::fs;
    use tempfile::TempDir;

    fn one_skill(id: &str) -> SkillIndex {
        SkillIndex::from_descriptors([SkillDescriptor::new(id)])
    }

    #[test]
    fn test_store_swaps_but_old_snapshot_survives() {
        let handle = IndexHandle::new(one_skill("old"), Vec::new());
        let before = handle.snapshot();

        handle.store(one_skill("new"));

        assert!(before.get("old").is_some());
        assert!(handle.snapshot().get("new").is_some());
        assert!(handle.snapshot().get("old").is_none());
    }

    #[test]
    fn test_clone_shares_state() {
        let handle = IndexHandle::new(one_skill("old"), Vec::new());
        let clone = handle.clone();
        handle.store(one_skill("new"));
        assert!(clone.snapshot().get("new").is_some());
    }

    #[test]
    fn test_reload_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("INDEX.yaml");
        fs::write(&path, "skills:\n  first: {}\n").unwrap();

        let handle = IndexHandle::open(vec![path.clone()]).unwrap();
        assert!(handle.snapshot().get("first").is_some());
        assert_eq!(handle.primary_source(), Some(path.as_path()));

        fs::write(&path, "skills:\n  second: {}\n").unwrap();
        handle.reload().unwrap();
        assert!(handle.snapshot().get("second").is_some());
    }

    #[test]
    fn test_failed_reload_keeps_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("INDEX.yaml");
        fs::write(&path, "skills:\n  first: {}\n").unwrap();
        let handle = IndexHandle::open(vec![path.clone()]).unwrap();

        fs::write(&path, "skills: [broken").unwrap();
        let err = handle.reload().unwrap_err();
        assert!(err.is_index_unavailable());
        assert!(handle.snapshot().get("first").is_some());
    }
}
