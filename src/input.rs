//! Run-directory discovery.
//!
//! A run directory holds exactly one authenticity proof (`zktls_proof.json`)
//! and exactly one chat export (`chats.json`). Names are matched
//! case-insensitively, so `Chats.JSON` next to `chats.json` is ambiguous.

use std::path::{Path, PathBuf};
use serde::Deserialize;
use tracing::debug;

use crate::authenticity::AuthenticityProof;
use crate::normalize::ChatExport;

/// File name of the authenticity proof artifact.
pub const PROOF_ARTIFACT: &str = "zktls_proof.json";

/// File name of the chat export artifact.
pub const CHATS_ARTIFACT: &str = "chats.json";

/// Error loading a run directory.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// Required artifact not present.
    #[error("Missing required input artifact: {0}")]
    MissingArtifact(&'static str),

    /// More than one candidate for an artifact.
    #[error("Ambiguous input artifact {artifact}: {count} candidates")]
    #[allow(missing_docs)]
    Ambiguous { artifact: &'static str, count: usize },

    /// Directory or file could not be read.
    #[error("Failed to read {path}: {source}")]
    #[allow(missing_docs)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact is not valid JSON of the expected shape.
    #[error("Malformed {artifact}: {message}")]
    #[allow(missing_docs)]
    Parse { artifact: &'static str, message: String },
}

#[derive(Deserialize)]
struct ProofEnvelope {
    zktls_proof: serde_json::Value,
}

/// Decoded artifacts of one run directory.
#[derive(Debug, Clone)]
pub struct ProofInput {
    /// Authenticity proof document.
    pub proof: AuthenticityProof,
    /// Raw chat export.
    pub export: ChatExport,
}

impl ProofInput {
    /// Load both artifacts from `dir`.
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self, InputError> {
        let dir = dir.as_ref();
        let files = list_files(dir).await?;

        let proof_path = select(&files, PROOF_ARTIFACT)?;
        let chats_path = select(&files, CHATS_ARTIFACT)?;
        debug!(proof = %proof_path.display(), chats = %chats_path.display(), "Input artifacts located");

        let envelope: ProofEnvelope = read_json(&proof_path, PROOF_ARTIFACT).await?;
        let export: ChatExport = read_json(&chats_path, CHATS_ARTIFACT).await?;

        Ok(Self {
            proof: AuthenticityProof::new(envelope.zktls_proof),
            export,
        })
    }
}

async fn list_files(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    let io_err = |source| InputError::Io { path: dir.to_path_buf(), source };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        if entry.file_type().await.map_err(io_err)?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn select(files: &[PathBuf], artifact: &'static str) -> Result<PathBuf, InputError> {
    let candidates: Vec<&PathBuf> = files
        .iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.eq_ignore_ascii_case(artifact))
        })
        .collect();

    match candidates.as_slice() {
        [] => Err(InputError::MissingArtifact(artifact)),
        [path] => Ok((*path).clone()),
        many => Err(InputError::Ambiguous { artifact, count: many.len() }),
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
    artifact: &'static str,
) -> Result<T, InputError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| InputError::Parse {
        artifact,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("proof-input-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[tokio::test]
    async fn test_load_both_artifacts() {
        let dir = run_dir();
        write(&dir, PROOF_ARTIFACT, r#"{"zktls_proof": {"sig": "abc"}}"#);
        write(&dir, CHATS_ARTIFACT, r#"{"source": "telegram", "user": "u", "chats": []}"#);
        write(&dir, "notes.txt", "ignored");

        let input = ProofInput::load(&dir).await.unwrap();
        assert_eq!(input.proof.as_json()["sig"], "abc");
        assert_eq!(input.export.source, "telegram");
    }

    #[tokio::test]
    async fn test_missing_artifact() {
        let dir = run_dir();
        write(&dir, CHATS_ARTIFACT, r#"{"source": "telegram", "user": "u"}"#);

        let err = ProofInput::load(&dir).await.unwrap_err();
        assert!(matches!(err, InputError::MissingArtifact(PROOF_ARTIFACT)));
    }

    #[tokio::test]
    async fn test_malformed_proof_envelope() {
        let dir = run_dir();
        write(&dir, PROOF_ARTIFACT, r#"{"proof": {}}"#);
        write(&dir, CHATS_ARTIFACT, r#"{"source": "telegram", "user": "u"}"#);

        let err = ProofInput::load(&dir).await.unwrap_err();
        assert!(matches!(err, InputError::Parse { artifact: PROOF_ARTIFACT, .. }));
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let dir = std::env::temp_dir().join(format!("absent-{}", uuid::Uuid::new_v4()));
        assert!(matches!(
            ProofInput::load(&dir).await.unwrap_err(),
            InputError::Io { .. }
        ));
    }

    #[test]
    fn test_case_insensitive_duplicates_are_ambiguous() {
        let files = vec![PathBuf::from("/run/Chats.JSON"), PathBuf::from("/run/chats.json")];
        assert!(matches!(
            select(&files, CHATS_ARTIFACT),
            Err(InputError::Ambiguous { count: 2, .. })
        ));
    }
}
