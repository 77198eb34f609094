//! Extension bundle — the structured result of a model call
//!
//! The model's reply is untrusted input: a bundle is only obtained by
//! deserializing through [`ExtensionBundle::from_reply`], which requires the
//! `manifest` and `files` keys to exist with the expected shapes and rejects
//! anything else as a parse failure.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Structured bundle produced by a generation call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtensionBundle {
    /// Short technical summary of what was generated
    #[serde(default)]
    pub analysis: String,

    /// Manifest V3 fields, opaque to the engine beyond icon defaulting
    pub manifest: Map<String, Value>,

    /// Relative path -> file content
    pub files: BTreeMap<String, String>,

    /// Optional readme written alongside the extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
}

impl ExtensionBundle {
    /// Parse a raw model reply into a bundle.
    ///
    /// At most one markdown fence has already been tolerated by the caller;
    /// here the content must be a single JSON object with `manifest` and
    /// `files` of the expected shapes.
    pub fn from_reply(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| format!("reply is not a valid bundle: {}", e))
    }

    /// Parse an already-deserialized JSON value into a bundle
    pub fn from_value(value: Value) -> Result<Self, String> {
        serde_json::from_value(value).map_err(|e| format!("reply is not a valid bundle: {}", e))
    }

    /// Serialize the bundle back to a compact JSON string, as stored in
    /// session memory and handed to the audit pass
    pub fn serialized(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
