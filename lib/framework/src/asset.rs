use std::env::current_exe;
use std::path::Path;
use std::path::PathBuf;

use crate::exception;
use crate::exception::CoreRsResult;

/// Resolves `path` next to the running executable, and in debug builds
/// falls back to the crate source folder so `cargo run` finds `assets/`.
pub fn asset_path(path: &str) -> CoreRsResult<PathBuf> {
    let exe_path = current_exe()?;
    candidates(&exe_path, path)
        .into_iter()
        .find(|candidate| candidate.exists())
        .ok_or_else(|| {
            exception!(
                message = format!(
                    "asset not found, asset={path}, exe={}",
                    exe_path.to_string_lossy()
                )
            )
        })
}

fn candidates(exe_path: &Path, path: &str) -> Vec<PathBuf> {
    let mut candidates = vec![exe_path.with_file_name(path)];
    if cfg!(debug_assertions)
        && let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR")
    {
        candidates.push(PathBuf::from(manifest_dir).join(path));
    }
    candidates
}
