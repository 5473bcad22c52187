//! Directory-backed object store: `<root>/<key>`, bucket name ignored.

use super::{ObjectStore, SourceId, StoreError};
use std::fs;
use std::path::PathBuf;

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectStore for LocalStore {
    fn fetch(&self, id: &SourceId) -> Result<Vec<u8>, StoreError> {
        let path = self.root.join(&id.key);
        log::debug!("Reading {} from {}", id, path.display());
        fs::read(&path).map_err(|source| StoreError::Io {
            id: id.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        format!("local folder {}", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_objects_by_key() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("records.csv"), b"id\n1\n").unwrap();

        let store = LocalStore::new(dir.path());
        let bytes = store
            .fetch(&SourceId::new("hired-foreigners", "records.csv"))
            .unwrap();
        assert_eq!(bytes, b"id\n1\n");

        let missing = store.fetch(&SourceId::new("hired-foreigners", "absent.csv"));
        assert!(matches!(missing, Err(StoreError::Io { .. })));
    }
}
