//
//  teamcity-client
//  api/artifacts.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Artifacts API
//!
//! Listing, metadata and content of build artifacts.
//!
//! ## Endpoints
//!
//! | Operation | Path |
//! |-----------|------|
//! | List | `/builds/id:<id>/artifacts/children/<path>` |
//! | Metadata | `/builds/id:<id>/artifacts/metadata/<path>` |
//! | Content | `/builds/id:<id>/artifacts/content/<path>` |
//! | Download | `/builds/id:<id>/artifacts/content/<path>` (raw bytes) |
//!
//! ## Content Policy
//!
//! Content is only returned inline for textual artifacts (text, JSON, XML, YAML) of at
//! most 10 MB. Anything else comes back as metadata plus a note pointing at
//! [`TeamCityClient::download_artifact`], which returns raw bytes up to 50 MB.

use mime_guess::mime::{self, Mime};
use serde::{Deserialize, Serialize};

use super::client::{TeamCityClient, MAX_TEXT_BYTES};
use super::common::ApiError;

/// Extensions treated as text even when no MIME type is registered for them.
const TEXT_EXTENSIONS: &[&str] = &["log", "txt", "out", "properties", "ini", "conf", "cfg", "env"];

/// A file or directory in a build's artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modification_time: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Href>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Href>,
}

impl Artifact {
    /// Directories carry a `children` link instead of content.
    pub fn is_directory(&self) -> bool {
        self.children.is_some()
    }

    /// The guessed content type, from the file name.
    pub fn content_type(&self) -> Mime {
        guess_mime(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Href {
    pub href: String,
}

#[derive(Debug, Deserialize)]
struct ArtifactList {
    #[serde(default)]
    file: Vec<Artifact>,
}

/// Result of [`TeamCityClient::artifact_content`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactContent {
    Inline {
        path: String,
        content_type: String,
        size: usize,
        content: String,
    },
    MetadataOnly {
        path: String,
        content_type: String,
        artifact: Artifact,
        note: String,
    },
}

/// Returns `true` for text, JSON, XML and YAML content types.
///
/// ```rust
/// use teamcity_client::api::artifacts::is_textual;
///
/// assert!(is_textual(&"application/json".parse().unwrap()));
/// assert!(is_textual(&"image/svg+xml".parse().unwrap()));
/// assert!(!is_textual(&"application/zip".parse().unwrap()));
/// ```
pub fn is_textual(content_type: &Mime) -> bool {
    if content_type.type_() == mime::TEXT {
        return true;
    }
    let subtype = content_type.subtype().as_str();
    let suffix = content_type.suffix().map(|s| s.as_str()).unwrap_or_default();
    [subtype, suffix]
        .iter()
        .any(|s| matches!(*s, "json" | "xml" | "yaml" | "x-yaml"))
}

fn guess_mime(name: &str) -> Mime {
    if let Some(guess) = mime_guess::from_path(name).first() {
        return guess;
    }
    let known_text = name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
    if known_text {
        mime::TEXT_PLAIN
    } else {
        mime::APPLICATION_OCTET_STREAM
    }
}

/// Normalizes an artifact path: trims slashes and rejects characters that would
/// change the meaning of the URL.
fn artifact_path(path: &str) -> Result<String, ApiError> {
    let path = path.trim().trim_matches('/');
    if path.contains(&['?', '#', '\\', '%'][..]) {
        return Err(ApiError::Validation(
            "Artifact path contains forbidden characters".to_string(),
        ));
    }
    Ok(path.to_string())
}

fn required_path(path: &str) -> Result<String, ApiError> {
    let path = artifact_path(path)?;
    if path.is_empty() {
        return Err(ApiError::Validation("Artifact path is required".to_string()));
    }
    Ok(path)
}

impl TeamCityClient {
    /// Lists artifacts of a build, at the top level or under `path`.
    pub async fn list_artifacts(
        &self,
        build_id: u64,
        path: Option<&str>,
    ) -> Result<Vec<Artifact>, ApiError> {
        let path = artifact_path(path.unwrap_or_default())?;
        let endpoint = if path.is_empty() {
            format!("/builds/id:{build_id}/artifacts/children")
        } else {
            format!("/builds/id:{build_id}/artifacts/children/{path}")
        };

        let list: ArtifactList = self.get(&endpoint, &[]).await?;
        Ok(list.file)
    }

    /// Fetches the metadata of one artifact.
    pub async fn artifact_metadata(&self, build_id: u64, path: &str) -> Result<Artifact, ApiError> {
        let path = required_path(path)?;
        self.get(&format!("/builds/id:{build_id}/artifacts/metadata/{path}"), &[])
            .await
    }

    /// Returns a textual artifact inline, or metadata only for binary and oversized
    /// artifacts.
    pub async fn artifact_content(
        &self,
        build_id: u64,
        path: &str,
    ) -> Result<ArtifactContent, ApiError> {
        let path = required_path(path)?;
        let artifact = self.artifact_metadata(build_id, &path).await?;
        let content_type = artifact.content_type();

        let note = if artifact.is_directory() {
            Some("This is a directory; list it instead".to_string())
        } else if !is_textual(&content_type) {
            Some(format!(
                "Binary artifact ({content_type}); download it instead of viewing it inline"
            ))
        } else if artifact.size.is_some_and(|size| size > MAX_TEXT_BYTES) {
            Some(format!(
                "Artifact exceeds {} bytes; download it instead of viewing it inline",
                MAX_TEXT_BYTES
            ))
        } else {
            None
        };

        if let Some(note) = note {
            return Ok(ArtifactContent::MetadataOnly {
                path,
                content_type: content_type.to_string(),
                artifact,
                note,
            });
        }

        let content = self
            .get_text(&format!("/builds/id:{build_id}/artifacts/content/{path}"), &[])
            .await?;

        Ok(ArtifactContent::Inline {
            path,
            content_type: content_type.to_string(),
            size: content.len(),
            content,
        })
    }

    /// Downloads one artifact as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TooLarge`] once the body passes
    /// [`MAX_BINARY_BYTES`](super::client::MAX_BINARY_BYTES).
    pub async fn download_artifact(&self, build_id: u64, path: &str) -> Result<Vec<u8>, ApiError> {
        let path = required_path(path)?;
        self.get_bytes(&format!("/builds/id:{build_id}/artifacts/content/{path}"), &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime() {
        assert!(is_textual(&guess_mime("report.json")));
        assert!(is_textual(&guess_mime("pom.xml")));
        assert!(is_textual(&guess_mime("build.log")));
        assert!(is_textual(&guess_mime("notes.txt")));
        assert!(!is_textual(&guess_mime("app.jar")));
        assert!(!is_textual(&guess_mime("image.png")));
        assert!(!is_textual(&guess_mime("no_extension")));
    }

    #[test]
    fn test_artifact_path_rules() {
        assert_eq!(artifact_path("/reports/junit.xml").unwrap(), "reports/junit.xml");
        assert_eq!(artifact_path("").unwrap(), "");
        assert!(artifact_path("a?b").is_err());
        assert!(artifact_path("a#b").is_err());
        assert!(required_path(" / ").is_err());
    }

    #[test]
    fn test_directory_detection() {
        let json = r#"{"name":"reports","children":{"href":"/app/rest/builds/id:1/artifacts/children/reports"}}"#;
        let artifact: Artifact = serde_json::from_str(json).unwrap();
        assert!(artifact.is_directory());
    }
}
