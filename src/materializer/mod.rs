//! File materializer
//!
//! Converts an [`ExtensionBundle`] into an actual directory tree. The update
//! model is replace, not patch: the output directory is deleted and recreated
//! on every call, so a file the model renamed or dropped between turns can
//! never linger from a previous build.

use crate::bundle::ExtensionBundle;
use crate::error::ForgeError;
use serde_json::{json, Value};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Fixed filename for the packaging manifest
const MANIFEST_FILE: &str = "manifest.json";

/// Fixed filename for the optional readme
const README_FILE: &str = "README.md";

/// Default icon filename the manifest icon fields resolve to
const DEFAULT_ICON: &str = "icon.png";

/// Minimal valid 1x1 transparent PNG, synthesized when the bundle only
/// carries a vector icon so the manifest icon references resolve to a real
/// binary file.
const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15,
    0xC4, 0x89, // 1x1, RGBA
    0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, // IDAT
    0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, // data
    0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82, // IEND
];

/// Result of a materialization: where it went and what exists there
#[derive(Debug, Clone)]
pub struct Materialized {
    /// Absolute path of the output directory
    pub path: PathBuf,

    /// Sorted, de-duplicated names of every file written, including the
    /// manifest and any synthesized icon
    pub files: Vec<String>,
}

pub struct Materializer {
    output_dir: PathBuf,
}

impl Materializer {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Replace the output directory with the contents of `bundle`.
    ///
    /// All relative paths are validated before the previous tree is touched,
    /// so a bundle carrying a traversal path cannot destroy the last good
    /// build.
    pub async fn materialize(&self, bundle: &ExtensionBundle) -> Result<Materialized, ForgeError> {
        for name in bundle.files.keys() {
            validate_relative(name)?;
        }

        if fs::metadata(&self.output_dir).await.is_ok() {
            fs::remove_dir_all(&self.output_dir).await?;
        }
        fs::create_dir_all(&self.output_dir).await?;

        let mut written = Vec::new();

        // Manifest first, with the icon default filled in when absent
        let mut manifest = bundle.manifest.clone();
        manifest.entry("icons").or_insert_with(|| {
            json!({ "16": DEFAULT_ICON, "48": DEFAULT_ICON, "128": DEFAULT_ICON })
        });
        let manifest_body = serde_json::to_string_pretty(&Value::Object(manifest))
            .map_err(|e| ForgeError::Parse(format!("manifest is not serializable: {}", e)))?;
        fs::write(self.output_dir.join(MANIFEST_FILE), manifest_body).await?;
        written.push(MANIFEST_FILE.to_string());

        for (name, content) in &bundle.files {
            let target = self.output_dir.join(name);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&target, content).await?;
            written.push(name.clone());
            debug!("Wrote {} ({} bytes)", target.display(), content.len());
        }

        // A vector icon alone leaves the manifest icon references dangling;
        // back them with a single placeholder binary icon.
        if bundle.files.keys().any(|name| name.ends_with(".svg"))
            && !bundle.files.contains_key(DEFAULT_ICON)
        {
            fs::write(self.output_dir.join(DEFAULT_ICON), PLACEHOLDER_PNG).await?;
            written.push(DEFAULT_ICON.to_string());
        }

        if let Some(readme) = &bundle.readme {
            fs::write(self.output_dir.join(README_FILE), readme).await?;
            written.push(README_FILE.to_string());
        }

        written.sort();
        written.dedup();

        let path = fs::canonicalize(&self.output_dir).await?;
        info!("Materialized {} files at {}", written.len(), path.display());

        Ok(Materialized {
            path,
            files: written,
        })
    }
}

/// Reject paths that could escape the output root
fn validate_relative(name: &str) -> Result<(), ForgeError> {
    let path = Path::new(name);
    if path.is_absolute() {
        return Err(ForgeError::Validation(format!(
            "absolute path in bundle: {}",
            name
        )));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(ForgeError::Validation(format!(
                    "path escapes the output directory: {}",
                    name
                )))
            }
        }
    }
    Ok(())
}
