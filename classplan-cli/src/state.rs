use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// `$CLASSPLAN_HOME`, else `$HOME/.classplan`.
pub fn classplan_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("CLASSPLAN_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".classplan"))
}

pub fn ensure_classplan_home() -> Result<PathBuf> {
    let dir = classplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Resolve a configured path: absolute paths stay, relative ones live in the home dir.
pub fn home_relative(home: &Path, configured: &str) -> PathBuf {
    let p = PathBuf::from(configured);
    if p.is_absolute() { p } else { home.join(p) }
}
