use std::path::PathBuf;
use anyhow::Result;

/// Returns the application data directory.
/// Uses `dirs::data_dir()` + "scout" (e.g. %APPDATA%/scout or ~/.local/share/scout).
/// Creates the directory if it doesn't exist.
pub fn get_scout_data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| std::env::var("APPDATA").ok().map(PathBuf::from))
        .unwrap_or_else(std::env::temp_dir);

    let path = base.join("scout");

    if !path.exists() {
        std::fs::create_dir_all(&path)?;
    }

    Ok(path)
}
