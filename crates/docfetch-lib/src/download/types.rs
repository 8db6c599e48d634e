use crate::identifiers::Identifier;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Where artifacts end up relative to the download root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DownloadLayout {
    /// `<root>/<identifier>/<identifier><ext>`
    #[default]
    Nested,
    /// `<root>/<identifier><ext>`
    Flat,
}

impl DownloadLayout {
    pub fn target_dir(self, root: &Path, identifier: &Identifier) -> PathBuf {
        match self {
            DownloadLayout::Nested => root.join(identifier.as_str()),
            DownloadLayout::Flat => root.to_path_buf(),
        }
    }

    /// Looks for `<root>/<identifier>/<identifier>`, with or without an extension. Only the
    /// nested layout can tell that an identifier was fetched by an earlier run; the flat layout
    /// always returns `None`.
    pub async fn existing_artifact(
        self,
        root: &Path,
        identifier: &Identifier,
    ) -> std::io::Result<Option<PathBuf>> {
        if self == DownloadLayout::Flat {
            return Ok(None);
        }

        let folder = self.target_dir(root, identifier);
        let mut entries = match tokio::fs::read_dir(&folder).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let name = OsStr::new(identifier.as_str());
            let named_after_identifier =
                path.file_name() == Some(name) || path.file_stem() == Some(name);
            if named_after_identifier && entry.file_type().await?.is_file() {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    /// Whether the watcher must ignore files already named after the current identifier.
    pub fn guards_identifier_stem(self) -> bool {
        self == DownloadLayout::Flat
    }
}

/// Paths claimed as artifacts during the current run (flat layout only).
#[derive(Clone, Debug, Default)]
pub struct ProcessedSet {
    claimed: HashSet<PathBuf>,
}

impl ProcessedSet {
    pub fn claim(&mut self, path: PathBuf) -> bool {
        self.claimed.insert(path)
    }

    pub fn as_set(&self) -> &HashSet<PathBuf> {
        &self.claimed
    }
}

/// A completed file picked by the watcher for the identifier in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDownload {
    pub path: PathBuf,
    pub extension: Option<String>,
}

impl ResolvedDownload {
    pub fn new(path: PathBuf) -> Self {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned());
        Self { path, extension }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> Identifier {
        Identifier::new(value).unwrap()
    }

    #[test]
    fn test_target_dir_per_layout() {
        let root = Path::new("/dl");
        assert_eq!(
            DownloadLayout::Nested.target_dir(root, &id("1001")),
            PathBuf::from("/dl/1001")
        );
        assert_eq!(
            DownloadLayout::Flat.target_dir(root, &id("1001")),
            PathBuf::from("/dl")
        );
    }

    #[tokio::test]
    async fn test_existing_artifact_nested() {
        let root = tempfile::tempdir().unwrap();
        let folder = root.path().join("1001");
        std::fs::create_dir_all(&folder).unwrap();

        assert_eq!(
            DownloadLayout::Nested
                .existing_artifact(root.path(), &id("1001"))
                .await
                .unwrap(),
            None,
            "an empty folder is not an artifact"
        );

        std::fs::write(folder.join("notes.txt"), b"x").unwrap();
        assert_eq!(
            DownloadLayout::Nested
                .existing_artifact(root.path(), &id("1001"))
                .await
                .unwrap(),
            None
        );

        std::fs::write(folder.join("1001.pdf"), b"pdf").unwrap();
        assert_eq!(
            DownloadLayout::Nested
                .existing_artifact(root.path(), &id("1001"))
                .await
                .unwrap(),
            Some(folder.join("1001.pdf"))
        );
    }

    #[tokio::test]
    async fn test_existing_artifact_nested_without_extension() {
        let root = tempfile::tempdir().unwrap();
        let download = root.path().join("vendor_download");
        std::fs::write(&download, b"pdf").unwrap();

        let folder = DownloadLayout::Nested.target_dir(root.path(), &id("1001"));
        let artifact = crate::download::finalize(&download, &id("1001"), &folder)
            .await
            .unwrap();
        assert_eq!(artifact, folder.join("1001"));

        assert_eq!(
            DownloadLayout::Nested
                .existing_artifact(root.path(), &id("1001"))
                .await
                .unwrap(),
            Some(artifact)
        );
    }

    #[tokio::test]
    async fn test_existing_artifact_ignores_directory_named_after_identifier() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("1001").join("1001")).unwrap();

        assert_eq!(
            DownloadLayout::Nested
                .existing_artifact(root.path(), &id("1001"))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_existing_artifact_missing_folder_and_flat_layout() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("1001.pdf"), b"pdf").unwrap();

        assert_eq!(
            DownloadLayout::Nested
                .existing_artifact(root.path(), &id("1001"))
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            DownloadLayout::Flat
                .existing_artifact(root.path(), &id("1001"))
                .await
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_processed_set_grows_monotonically() {
        let mut processed = ProcessedSet::default();
        assert!(processed.as_set().is_empty());
        assert!(processed.claim(PathBuf::from("/dl/1001.pdf")));
        assert!(!processed.claim(PathBuf::from("/dl/1001.pdf")));
        assert_eq!(
            processed.as_set(),
            &HashSet::from([PathBuf::from("/dl/1001.pdf")])
        );
    }

    #[test]
    fn test_resolved_download_extension() {
        assert_eq!(
            ResolvedDownload::new(PathBuf::from("/dl/a.pdf")).extension,
            Some("pdf".to_string())
        );
        assert_eq!(ResolvedDownload::new(PathBuf::from("/dl/README")).extension, None);
    }
}
