use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{IngestError, IngestResult};

/// A Base64 `data:` URI, the storable form of an ingested image.
#[derive(Clone, PartialEq, Eq)]
pub struct DataUri {
    mime: String,
    payload: String,
}

impl DataUri {
    /// Encode `bytes` under the given MIME type.
    pub fn encode(mime: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime: mime.into(),
            payload: STANDARD.encode(bytes),
        }
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// The Base64 text after the comma.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Decode the payload back into bytes.
    pub fn decode_payload(&self) -> IngestResult<Vec<u8>> {
        STANDARD
            .decode(&self.payload)
            .map_err(|e| IngestError::InvalidDataUri(e.to_string()))
    }

    /// Length of the full URI text, which is what storage is charged for.
    pub fn encoded_len(&self) -> usize {
        "data:".len() + self.mime.len() + ";base64,".len() + self.payload.len()
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, self.payload)
    }
}

impl fmt::Debug for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataUri")
            .field("mime", &self.mime)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl FromStr for DataUri {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IngestError::InvalidDataUri(truncate(s));
        let rest = s.strip_prefix("data:").ok_or_else(invalid)?;
        let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;
        let mime = header.strip_suffix(";base64").ok_or_else(invalid)?;
        Ok(Self {
            mime: mime.to_string(),
            payload: payload.to_string(),
        })
    }
}

impl Serialize for DataUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DataUri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(32).collect()
}
