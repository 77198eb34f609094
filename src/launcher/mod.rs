//! Browser launch helper
//!
//! Locates a Chrome/Chromium executable and spawns it with the generated
//! extension loaded unpacked. The `CHROME_PATH` environment variable always
//! wins; otherwise a per-platform candidate list is probed.

use crate::error::ForgeError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::info;

/// Locate a Chrome/Chromium executable, if any
pub fn find_browser() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CHROME_PATH") {
        let candidate = PathBuf::from(&path);
        if candidate.is_file() {
            return Some(candidate);
        }
        if let Some(found) = which(&path) {
            return Some(found);
        }
    }

    for candidate in platform_candidates() {
        let path = Path::new(&candidate);
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        if let Some(found) = which(&candidate) {
            return Some(found);
        }
    }

    None
}

fn platform_candidates() -> Vec<String> {
    if cfg!(target_os = "windows") {
        let program_files =
            std::env::var("PROGRAMFILES").unwrap_or_else(|_| r"C:\Program Files".to_string());
        let program_files_x86 = std::env::var("PROGRAMFILES(X86)")
            .unwrap_or_else(|_| r"C:\Program Files (x86)".to_string());
        vec![
            format!(r"{}\Google\Chrome\Application\chrome.exe", program_files),
            format!(r"{}\Google\Chrome\Application\chrome.exe", program_files_x86),
        ]
    } else if cfg!(target_os = "macos") {
        vec!["/Applications/Google Chrome.app/Contents/MacOS/Google Chrome".to_string()]
    } else {
        vec![
            "google-chrome".to_string(),
            "google-chrome-stable".to_string(),
            "chromium-browser".to_string(),
            "chromium".to_string(),
        ]
    }
}

/// Resolve a bare command name against PATH
fn which(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&paths) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Spawn the browser detached with the extension loaded unpacked
pub fn launch_with_extension(output_dir: &Path) -> Result<(), ForgeError> {
    if !output_dir.is_dir() {
        return Err(ForgeError::Launch(
            "no generated extension to load; forge one first".to_string(),
        ));
    }

    let browser = find_browser().ok_or_else(|| {
        ForgeError::Launch(
            "could not locate a Chrome/Chromium executable; set CHROME_PATH".to_string(),
        )
    })?;

    let abs = output_dir.canonicalize()?;
    info!("Launching {} with {}", browser.display(), abs.display());

    Command::new(browser)
        .arg(format!("--load-extension={}", abs.display()))
        .arg("--new-window")
        .arg("chrome://extensions/")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    Ok(())
}
