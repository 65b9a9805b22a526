use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";

/// Where the raw filings and their derived artifacts live.
pub fn filings_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("filings")
}

/// Cached archive reference data (ticker map).
pub fn edgar_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("edgar")
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

pub fn ensure_data_dirs(data_dir: &Path) -> io::Result<()> {
    ensure_dir(&filings_dir(data_dir))?;
    ensure_dir(&edgar_dir(data_dir))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_data_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        ensure_data_dirs(tmp.path()).unwrap();
        assert!(filings_dir(tmp.path()).is_dir());
        assert!(edgar_dir(tmp.path()).is_dir());
    }
}
