//! `data:<mime>;base64,<payload>`: the self-describing payload handed to the extractor.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const PDF: &str = "application/pdf";
pub const DOC: &str = "application/msword";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TXT: &str = "text/plain";

/// Resume file types accepted for extraction.
pub const ACCEPTED_MIME_TYPES: &[&str] = &[PDF, DOC, DOCX, TXT];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUriError {
    #[error("expected a 'data:' URI")]
    MissingPrefix,

    #[error("only base64-encoded data URIs are supported")]
    NotBase64,

    #[error("missing ',' between header and payload")]
    MissingPayload,

    #[error("missing MIME type")]
    MissingMimeType,

    #[error("payload is not valid base64: {0}")]
    InvalidBase64(String),
}

/// A resume file encoded as a data URI.
///
/// Holds the canonical base64 text alongside the MIME type; decoding is done on
/// demand so the payload can be forwarded to the model without a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeDataUri {
    mime_type: String,
    base64: String,
}

impl ResumeDataUri {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_ascii_lowercase(),
            base64: STANDARD.encode(bytes),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn decode(&self) -> Result<Vec<u8>, DataUriError> {
        STANDARD
            .decode(&self.base64)
            .map_err(|e| DataUriError::InvalidBase64(e.to_string()))
    }

    pub fn is_accepted_type(&self) -> bool {
        ACCEPTED_MIME_TYPES.contains(&self.mime_type.as_str())
    }
}

impl FromStr for ResumeDataUri {
    type Err = DataUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.trim().strip_prefix("data:").ok_or(DataUriError::MissingPrefix)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingPayload)?;

        // Header is `<mime>[;param=value]*;base64`; parameters like charset are dropped.
        let mut parts = header.split(';');
        let mime_type = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        if !parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(DataUriError::NotBase64);
        }
        if mime_type.is_empty() {
            return Err(DataUriError::MissingMimeType);
        }

        let base64: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(&base64)
            .map_err(|e| DataUriError::InvalidBase64(e.to_string()))?;

        Ok(Self { mime_type, base64 })
    }
}

impl fmt::Display for ResumeDataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.base64)
    }
}

impl Serialize for ResumeDataUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResumeDataUri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Picks the MIME type of an uploaded file: the declared content type when it is
/// one we accept, otherwise whatever the filename extension implies.
pub fn detect_mime_type(declared: Option<&str>, file_name: Option<&str>) -> Option<String> {
    let declared = declared
        .map(|d| d.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .filter(|d| ACCEPTED_MIME_TYPES.contains(&d.as_str()));
    if declared.is_some() {
        return declared;
    }
    file_name
        .and_then(|name| mime_guess::from_path(name).first())
        .map(|guess| guess.essence_str().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_round_trips_through_parse() {
        let uri = ResumeDataUri::from_bytes(TXT, b"Jane Doe\nEngineer");
        let text = uri.to_string();
        assert_eq!(text, "data:text/plain;base64,SmFuZSBEb2UKRW5naW5lZXI=");

        let parsed: ResumeDataUri = text.parse().unwrap();
        assert_eq!(parsed, uri);
        assert_eq!(parsed.decode().unwrap(), b"Jane Doe\nEngineer");
    }

    #[test]
    fn test_parse_drops_parameters() {
        let uri: ResumeDataUri = "data:text/plain;charset=utf-8;base64,aGk=".parse().unwrap();
        assert_eq!(uri.mime_type(), "text/plain");
        assert_eq!(uri.base64(), "aGk=");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "text/plain;base64,aGk=".parse::<ResumeDataUri>(),
            Err(DataUriError::MissingPrefix)
        );
        assert_eq!(
            "data:text/plain,hi".parse::<ResumeDataUri>(),
            Err(DataUriError::NotBase64)
        );
        assert_eq!(
            "data:text/plain;base64".parse::<ResumeDataUri>(),
            Err(DataUriError::MissingPayload)
        );
        assert_eq!(
            "data:;base64,aGk=".parse::<ResumeDataUri>(),
            Err(DataUriError::MissingMimeType)
        );
        assert!(matches!(
            "data:text/plain;base64,!!!".parse::<ResumeDataUri>(),
            Err(DataUriError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_serde_uses_uri_text() {
        let uri = ResumeDataUri::from_bytes(PDF, b"%PDF-");
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, "\"data:application/pdf;base64,JVBERi0=\"");
        let back: ResumeDataUri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uri);
        assert!(serde_json::from_str::<ResumeDataUri>("\"https://example.com\"").is_err());
    }

    #[test]
    fn test_accepted_types() {
        assert!(ResumeDataUri::from_bytes(DOCX, b"PK").is_accepted_type());
        assert!(!ResumeDataUri::from_bytes("image/png", b"x").is_accepted_type());
    }

    #[test]
    fn test_detect_mime_type_prefers_accepted_declared_type() {
        assert_eq!(
            detect_mime_type(Some("application/pdf"), Some("resume.txt")).as_deref(),
            Some(PDF)
        );
        assert_eq!(
            detect_mime_type(Some("text/plain; charset=utf-8"), None).as_deref(),
            Some(TXT)
        );
    }

    #[test]
    fn test_detect_mime_type_falls_back_to_extension() {
        assert_eq!(
            detect_mime_type(Some("application/octet-stream"), Some("resume.docx")).as_deref(),
            Some(DOCX)
        );
        assert_eq!(detect_mime_type(None, Some("resume.doc")).as_deref(), Some(DOC));
        assert_eq!(detect_mime_type(None, Some("CV.PDF")).as_deref(), Some(PDF));
        assert_eq!(detect_mime_type(None, None), None);
    }
}
