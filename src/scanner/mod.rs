//! Directory scanning for identification candidates.
//!
//! Walks a root directory recursively and produces a [`LocalFile`] for
//! every file with a recognised ROM/archive extension (case-insensitive).
//! The engine consumes the result read-only.

use std::path::Path;

use walkdir::WalkDir;

use crate::model::LocalFile;

/// Extensions accepted as identification candidates.
const ROM_EXTENSIONS: &[&str] = &[
    "zip", "7z", "nes", "sfc", "smc", "gb", "gbc", "gba", "md", "bin", "sms", "gg", "n64", "z64",
    "v64", "pce", "lnx", "ws", "wsc", "ngc", "a26", "fds",
];

/// Scan `root` recursively for candidate files, sorted by filename for
/// deterministic processing order.
pub fn scan(root: &Path) -> Vec<LocalFile> {
    let mut files: Vec<LocalFile> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|entry| {
            let ext = entry.path().extension().and_then(|s| s.to_str())?;
            if !ROM_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
                return None;
            }
            let size = entry.metadata().ok()?.len();
            Some(LocalFile::new(entry.into_path(), size))
        })
        .collect();

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_scan_rom_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        File::create(root.join("Metroid (USA).zip")).unwrap();
        File::create(root.join("Contra (USA).NES")).unwrap(); // case-insensitive
        File::create(root.join("notes.txt")).unwrap(); // ignored
        File::create(root.join("cover.png")).unwrap(); // ignored

        let subdir = root.join("gba");
        std::fs::create_dir(&subdir).unwrap();
        File::create(subdir.join("Advance Wars (USA).gba")).unwrap();

        let files = scan(root);
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "Advance Wars (USA).gba",
                "Contra (USA).NES",
                "Metroid (USA).zip"
            ]
        );
    }

    #[test]
    fn test_scan_empty_dir() {
        let dir = tempdir().unwrap();
        assert!(scan(dir.path()).is_empty());
    }
}
