//! Share-state codec
//!
//! A token is the URL-safe, unpadded base64 of the raw-deflate compressed
//! UTF-8 text. `decode(&encode(s))` returns `s` for every string.

use std::io::Read;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flate2::Compression;
use flate2::read::{DeflateDecoder, DeflateEncoder};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, FileSetError, ShareError};
use crate::targets::Target;
use crate::vfs::VirtualFileSet;

/// Encode text as a share token
pub fn encode(text: &str) -> String {
    let mut compressed = Vec::new();
    // Slice in, Vec out: the only I/O errors possible come from the reader
    DeflateEncoder::new(text.as_bytes(), Compression::best())
        .read_to_end(&mut compressed)
        .expect("in-memory deflate");
    URL_SAFE_NO_PAD.encode(compressed)
}

/// Decode a share token back to its text
pub fn decode(token: &str) -> Result<String, DecodeError> {
    let compressed = URL_SAFE_NO_PAD.decode(token.trim())?;
    let mut bytes = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .read_to_end(&mut bytes)
        .map_err(DecodeError::Inflate)?;
    Ok(String::from_utf8(bytes)?)
}

/// Serialized form of a whole artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    pub entry: String,
    pub files: IndexMap<String, String>,
}

impl ShareState {
    pub fn from_files(target: Option<Target>, files: &VirtualFileSet) -> Self {
        Self {
            target,
            entry: files.entry().to_string(),
            files: files
                .iter()
                .map(|(path, source)| (path.to_string(), source.to_string()))
                .collect(),
        }
    }

    /// Rebuild the file set, checking the entry
    pub fn file_set(&self) -> Result<VirtualFileSet, FileSetError> {
        VirtualFileSet::new(&self.files, &self.entry)
    }

    pub fn to_token(&self) -> serde_json::Result<String> {
        Ok(encode(&serde_json::to_string(self)?))
    }

    /// Decode and validate a token produced by [`ShareState::to_token`]
    pub fn from_token(token: &str) -> Result<Self, ShareError> {
        let state: ShareState = serde_json::from_str(&decode(token)?)?;
        state.file_set()?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_samples() {
        for text in [
            "",
            "export default () => <p>hi</p>;",
            "const label = \"héllo wörld\"; // 🚀🔥",
            "// 组件标题\nexport const title = '日本語のテキスト';",
        ] {
            let token = encode(text);
            assert!(
                token
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "token not URL safe: {}",
                token
            );
            assert_eq!(decode(&token).unwrap(), text);
        }
    }

    #[test]
    fn test_repetitive_source_compresses() {
        let text = "<Button variant=\"contained\">Save</Button>\n".repeat(200);
        assert!(encode(&text).len() < text.len() / 4);
    }

    #[test]
    fn test_large_incompressible_text_round_trips() {
        // Longer than the encoder's internal buffers, so several reads are needed
        let text: String = (0..200_000u32)
            .map(|i| char::from_u32(0x4e00 + (i.wrapping_mul(2_654_435_761) % 0x5000)).unwrap())
            .collect();
        assert_eq!(decode(&encode(&text)).unwrap(), text);
    }

    #[test]
    fn test_malformed_tokens_fail() {
        assert!(matches!(decode("not base64!"), Err(DecodeError::Base64(_))));
        assert!(matches!(decode("_____w"), Err(DecodeError::Inflate(_))));

        let invalid_utf8 = {
            let mut compressed = Vec::new();
            DeflateEncoder::new(&[0xff, 0xfe, 0x41][..], Compression::default())
                .read_to_end(&mut compressed)
                .unwrap();
            URL_SAFE_NO_PAD.encode(compressed)
        };
        assert!(matches!(decode(&invalid_utf8), Err(DecodeError::Utf8(_))));
    }

    #[test]
    fn test_share_state_round_trip() {
        let files = VirtualFileSet::new(
            [("App.tsx", "import Card from './Card';"), ("Card.tsx", "export default 1;")],
            "App.tsx",
        )
        .unwrap();
        let state = ShareState::from_files(Some(Target::Material), &files);
        let token = state.to_token().unwrap();
        let restored = ShareState::from_token(&token).unwrap();
        assert_eq!(restored, state);
        assert_eq!(restored.file_set().unwrap(), files);
    }

    #[test]
    fn test_share_state_requires_entry_file() {
        let token = encode(r#"{"entry":"Main.tsx","files":{"App.tsx":""}}"#);
        assert!(matches!(
            ShareState::from_token(&token),
            Err(ShareError::FileSet(FileSetError::MissingEntry(_)))
        ));
        let token = encode("{");
        assert!(matches!(ShareState::from_token(&token), Err(ShareError::Json(_))));
    }
}
