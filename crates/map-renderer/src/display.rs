//! Hand a finished figure to the operating system's image viewer.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::error::{RenderError, RenderResult};

/// Write `png` to a kept temporary file and return its path.
pub fn write_temp_png(png: &[u8]) -> RenderResult<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix("goes-figure-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| RenderError::Display(format!("cannot create temporary file: {}", e)))?;
    let (_, path) = file
        .keep()
        .map_err(|e| RenderError::Display(format!("cannot keep temporary file: {}", e)))?;
    std::fs::write(&path, png).map_err(|e| RenderError::io(&path, e))?;
    Ok(path)
}

fn viewer_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// Launch the platform viewer on `path` without waiting for it.
pub fn open_in_viewer(path: &Path) -> RenderResult<()> {
    let mut cmd = viewer_command(path);
    cmd.spawn()
        .map_err(|e| RenderError::Display(format!("cannot launch viewer for {}: {}", path.display(), e)))?;
    info!(path = %path.display(), "Opened figure in viewer");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_temp_png_persists() {
        let path = write_temp_png(b"\x89PNG").unwrap();
        assert!(path.exists());
        assert!(path.to_string_lossy().ends_with(".png"));
        std::fs::remove_file(path).unwrap();
    }
}
