use crate::error::DocFetchError;
use crate::identifiers::Identifier;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// `<identifier>.<ext of source>`, or just the identifier when the source has no extension.
pub fn artifact_file_name(source: &Path, identifier: &Identifier) -> OsString {
    let mut name = OsString::from(identifier.as_str());
    if let Some(extension) = source.extension() {
        name.push(".");
        name.push(extension);
    }
    name
}

/// Moves `source` to `target_dir/<identifier><ext>`, replacing whatever already has that name.
pub async fn finalize(
    source: &Path,
    identifier: &Identifier,
    target_dir: &Path,
) -> Result<PathBuf, DocFetchError> {
    let artifact = target_dir.join(artifact_file_name(source, identifier));
    let organize_error = |reason: String| DocFetchError::Organize {
        download: source.to_path_buf(),
        artifact: artifact.clone(),
        reason,
    };

    tokio::fs::create_dir_all(target_dir).await.map_err(|e| {
        organize_error(format!(
            "failed to create directory {}: {}",
            target_dir.display(),
            e
        ))
    })?;

    if artifact == source {
        return Ok(artifact);
    }

    if tokio::fs::try_exists(&artifact)
        .await
        .map_err(|e| organize_error(e.to_string()))?
    {
        tracing::info!(path = %artifact.display(), "Replacing existing artifact");
        tokio::fs::remove_file(&artifact)
            .await
            .map_err(|e| organize_error(format!("failed to delete stale artifact: {}", e)))?;
    }

    tokio::fs::rename(source, &artifact)
        .await
        .map_err(|e| organize_error(e.to_string()))?;

    Ok(artifact)
}
