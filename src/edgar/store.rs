use chrono::NaiveDate;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::error::AcquisitionError;
use super::report::ReportType;
use super::tickers::Ticker;
use crate::utils::dirs;

pub const SUBMISSION_ARTIFACT: &str = "full-submission.txt";
pub const DOCUMENT_ARTIFACT: &str = "primary-document.html";

/// Identifies one filing's artifacts on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub ticker: Ticker,
    pub report_type: ReportType,
    pub filing_date: NaiveDate,
}

impl ArtifactKey {
    pub fn new(ticker: Ticker, report_type: ReportType, filing_date: NaiveDate) -> Self {
        Self {
            ticker,
            report_type,
            filing_date,
        }
    }

    /// `<TICKER>/<FORM>/<YYYY-MM-DD>`
    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(self.ticker.as_str())
            .join(self.report_type.dir_name())
            .join(self.filing_date.format("%Y-%m-%d").to_string())
    }
}

/// Filing artifacts under `<data_dir>/filings`.
///
/// Writes go to a temporary file in the target directory and are renamed into
/// place, so a reader sees either the old artifact, the new one, or nothing.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: dirs::filings_dir(data_dir),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, key: &ArtifactKey, name: &str) -> PathBuf {
        self.root.join(key.relative_dir()).join(name)
    }

    pub fn exists(&self, key: &ArtifactKey, name: &str) -> bool {
        self.path(key, name).is_file()
    }

    pub fn put(
        &self,
        key: &ArtifactKey,
        name: &str,
        contents: &[u8],
    ) -> Result<PathBuf, AcquisitionError> {
        let path = self.path(key, name);
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        fs::create_dir_all(&dir).map_err(|e| AcquisitionError::storage(&dir, e))?;

        // Dropping the temp file on any error below removes it.
        let mut temp =
            NamedTempFile::new_in(&dir).map_err(|e| AcquisitionError::storage(&dir, e))?;
        temp.write_all(contents)
            .map_err(|e| AcquisitionError::storage(temp.path(), e))?;
        temp.persist(&path)
            .map_err(|e| AcquisitionError::storage(&path, e.error))?;

        log::info!("Saved {} ({} bytes)", path.display(), contents.len());
        Ok(path)
    }

    /// `Ok(None)` when the artifact was never written.
    pub fn get(&self, key: &ArtifactKey, name: &str) -> Result<Option<Vec<u8>>, AcquisitionError> {
        let path = self.path(key, name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AcquisitionError::storage(path, e)),
        }
    }
}
