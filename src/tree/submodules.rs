//! Submodule manifest parsing.
//!
//! `.gitmodules` is an INI-style file of `[submodule "name"]` sections,
//! each carrying a `path` and a `url`. The manifest arrives as a
//! base64-encoded blob; decoding strips the line wrapping the API inserts.

use std::collections::HashMap;

use base64::Engine as _;
use configparser::ini::Ini;
use thiserror::Error;

/// Errors that can occur while decoding a submodule manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The blob content was not valid base64.
    #[error("invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded content was not valid UTF-8.
    #[error("manifest is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The manifest could not be parsed as an INI document.
    #[error("manifest parse error: {0}")]
    Parse(String),
}

/// Decode a base64 blob body and parse it as a submodule manifest.
///
/// Returns a map from submodule path to its link URL.
pub fn parse_manifest_blob(content: &str) -> Result<HashMap<String, String>, ManifestError> {
    let stripped: String = content.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(stripped)?;
    parse_manifest(&String::from_utf8(bytes)?)
}

/// Parse decoded manifest text into a path -> url map.
///
/// Sections without both a `path` and a `url` are skipped rather than
/// rejected; a malformed manifest yields whatever entries were readable.
pub fn parse_manifest(text: &str) -> Result<HashMap<String, String>, ManifestError> {
    let mut ini = Ini::new();
    let map = ini.read(text.to_string()).map_err(ManifestError::Parse)?;

    let mut submodules = HashMap::new();
    for (_section, values) in map {
        let path = values.get("path").and_then(|v| v.clone());
        let url = values.get("url").and_then(|v| v.clone());
        if let (Some(path), Some(url)) = (path, url) {
            submodules.insert(path, url);
        }
    }
    Ok(submodules)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[submodule "vendored"]
	path = vendor/dep
	url = https://example.invalid/dep.git
[submodule "tools"]
	path = tools/build
	url = git@example.invalid:tools/build.git
"#;

    #[test]
    fn test_parse_manifest() {
        let map = parse_manifest(MANIFEST).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("vendor/dep").map(String::as_str),
            Some("https://example.invalid/dep.git")
        );
        assert_eq!(
            map.get("tools/build").map(String::as_str),
            Some("git@example.invalid:tools/build.git")
        );
    }

    #[test]
    fn test_parse_manifest_blob_with_wrapped_base64() {
        use base64::Engine as _;
        let encoded = base64::engine::general_purpose::STANDARD.encode(MANIFEST);
        let wrapped = encoded
            .as_bytes()
            .chunks(60)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");

        let map = parse_manifest_blob(&wrapped).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_incomplete_sections_skipped() {
        let text = "[submodule \"broken\"]\npath = somewhere\n";
        let map = parse_manifest(text).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_invalid_base64_rejected() {
        assert!(matches!(
            parse_manifest_blob("!!not base64!!"),
            Err(ManifestError::Base64(_))
        ));
    }
}
