use std::path::Path;

pub fn filename_without_extension(path: &Path) -> Option<&str> {
    let stem = path.file_stem()?.to_str()?;
    // `arm.scene.json` bakes to `arm`
    stem.split('.').next().filter(|s| !s.is_empty())
}

pub fn ensure_parent_dir_exists(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
