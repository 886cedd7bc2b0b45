//! Artifact key generation shared by all storage backends.
//!
//! Key format: `{assignment_id}/{student_id}/{token}{extension}`. The only
//! caller-influenced parts are the two validated identifiers and the extension,
//! which is reduced to ASCII alphanumerics; the filename itself is always generated.

use uuid::Uuid;

use crate::{StorageError, StorageResult};

const MAX_EXTENSION_LEN: usize = 10;

/// A freshly derived artifact location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactKey {
    /// Random token used as the file stem
    pub token: Uuid,
    /// Extension including the leading dot, if the source URL had one
    pub extension: Option<String>,
    /// Full storage key
    pub key: String,
}

/// Derive a new artifact key for a submission.
///
/// A new token is generated on every call; it is not checked against existing keys.
pub fn artifact_key(assignment_id: &str, student_id: &str, source_url: &str) -> ArtifactKey {
    let token = Uuid::new_v4();
    let extension = file_extension(source_url);
    let key = format!(
        "{}/{}/{}{}",
        assignment_id,
        student_id,
        token,
        extension.as_deref().unwrap_or("")
    );
    ArtifactKey {
        token,
        extension,
        key,
    }
}

/// Extension of the last path segment of `url`, including the dot.
///
/// Query strings and fragments are ignored. Dotfiles (`/.hidden`) have no
/// extension, and anything that is not a short run of ASCII alphanumerics is
/// dropped.
pub fn file_extension(url: &str) -> Option<String> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment
        .split('?')
        .next()
        .unwrap_or(without_fragment);
    let path = match without_query.find("://") {
        Some(idx) => {
            let rest = &without_query[idx + 3..];
            rest.find('/').map(|slash| &rest[slash..]).unwrap_or("")
        }
        None => without_query,
    };

    let segment = path.rsplit('/').next().unwrap_or("");
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        return None;
    }
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(format!(".{}", ext))
}

/// Reject keys that could address something outside the store's namespace.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty()
        || storage_key.starts_with('/')
        || storage_key.split('/').any(|seg| seg == ".." || seg == "." || seg.is_empty())
    {
        return Err(StorageError::InvalidKey(storage_key.to_string()));
    }
    Ok(())
}

/// Percent-encode each key segment for use in a URL path
pub fn encode_key_for_url(storage_key: &str) -> String {
    storage_key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let key = artifact_key("A1", "S1", "https://ex.com/pic.jpg");
        assert_eq!(key.key, format!("A1/S1/{}.jpg", key.token));
        assert_eq!(key.extension.as_deref(), Some(".jpg"));
    }

    #[test]
    fn test_key_without_extension() {
        let key = artifact_key("A1", "S1", "https://ex.com/images/12345");
        assert_eq!(key.key, format!("A1/S1/{}", key.token));
        assert!(key.extension.is_none());
    }

    #[test]
    fn test_tokens_are_fresh() {
        let a = artifact_key("A1", "S1", "https://ex.com/pic.jpg");
        let b = artifact_key("A1", "S1", "https://ex.com/pic.jpg");
        assert_ne!(a.key, b.key);
    }

    #[test]
    fn test_extension_ignores_query_and_fragment() {
        assert_eq!(
            file_extension("https://ex.com/a/pic.png?size=large&v=1.2"),
            Some(".png".to_string())
        );
        assert_eq!(
            file_extension("https://ex.com/pic.webp#section.x"),
            Some(".webp".to_string())
        );
    }

    #[test]
    fn test_extension_comes_from_path_not_host() {
        assert_eq!(file_extension("https://ex.com"), None);
        assert_eq!(file_extension("https://ex.com/"), None);
        assert_eq!(file_extension("https://cdn.ex.com/folder.v2/image"), None);
    }

    #[test]
    fn test_extension_rejects_dotfiles_and_odd_suffixes() {
        assert_eq!(file_extension("https://ex.com/.hidden"), None);
        assert_eq!(file_extension("https://ex.com/pic."), None);
        assert_eq!(file_extension("https://ex.com/pic.j%2Fpg"), None);
        assert_eq!(file_extension("https://ex.com/pic.averyveryverylongext"), None);
    }

    #[test]
    fn test_extension_keeps_last_suffix() {
        assert_eq!(
            file_extension("https://ex.com/archive.tar.gz"),
            Some(".gz".to_string())
        );
        assert_eq!(file_extension("https://ex.com/PIC.JPG"), Some(".JPG".to_string()));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("A1/S1/x.jpg").is_ok());
        assert!(validate_key("/A1/S1/x.jpg").is_err());
        assert!(validate_key("A1/../x.jpg").is_err());
        assert!(validate_key("A1//x.jpg").is_err());
        assert!(validate_key("").is_err());
    }

    #[test]
    fn test_encode_key_for_url() {
        assert_eq!(encode_key_for_url("Art 101/S#1/x.jpg"), "Art%20101/S%231/x.jpg");
    }
}
