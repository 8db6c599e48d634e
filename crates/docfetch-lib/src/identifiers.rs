use crate::error::DocFetchError;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;

/// A product code driving one search/download cycle.
#[derive(Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct Identifier(Arc<str>);

impl Identifier {
    /// Trims `raw` and returns `None` if nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(Arc::from(trimmed)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One identifier per line, blank lines ignored. Order is preserved and duplicates are kept.
pub fn parse_identifiers(contents: &str) -> Vec<Identifier> {
    contents.lines().filter_map(Identifier::new).collect()
}

pub async fn load_identifiers(path: &Path) -> Result<Vec<Identifier>, DocFetchError> {
    let contents =
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DocFetchError::IdentifierList {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

    let identifiers = parse_identifiers(&contents);
    tracing::info!(
        "Loaded {} product identifiers from {}",
        identifiers.len(),
        path.display()
    );

    let duplicates = identifiers.iter().duplicates().join(", ");
    if !duplicates.is_empty() {
        tracing::warn!(
            duplicates = %duplicates,
            "Identifier list contains duplicates; they will be processed once per occurrence"
        );
    }

    Ok(identifiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifiers_trims_and_skips_blank_lines() {
        let identifiers = parse_identifiers("1001\n\n  1002  \r\n\t\n1003");
        let values: Vec<&str> = identifiers.iter().map(Identifier::as_str).collect();
        assert_eq!(values, vec!["1001", "1002", "1003"]);
    }

    #[test]
    fn test_parse_identifiers_keeps_duplicates_in_order() {
        let identifiers = parse_identifiers("B\nA\nB\n");
        let values: Vec<&str> = identifiers.iter().map(Identifier::as_str).collect();
        assert_eq!(values, vec!["B", "A", "B"]);
    }

    #[test]
    fn test_identifier_rejects_whitespace_only() {
        assert!(Identifier::new("   ").is_none());
        assert_eq!(Identifier::new(" 7K ").unwrap().as_str(), "7K");
    }

    #[tokio::test]
    async fn test_load_identifiers_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("list.txt");

        let err = load_identifiers(&missing).await.unwrap_err();
        assert!(matches!(err, DocFetchError::IdentifierList { path, .. } if path == missing));
    }

    #[tokio::test]
    async fn test_load_identifiers_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        std::fs::write(&path, "1001\n1002\n").unwrap();

        let identifiers = load_identifiers(&path).await.unwrap();
        assert_eq!(identifiers.len(), 2);
        assert_eq!(identifiers[1].as_str(), "1002");
    }
}
