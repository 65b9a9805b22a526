use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::{EnumIter, IntoEnumIterator};

use super::error::AcquisitionError;

/// Periodic report forms the pipeline knows how to section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(try_from = "String", into = "String")]
pub enum ReportType {
    Form10K,
    Form10Q,
    Form10KA,
    Form10QA,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Form10K => "10-K",
            ReportType::Form10Q => "10-Q",
            ReportType::Form10KA => "10-K/A",
            ReportType::Form10QA => "10-Q/A",
        }
    }

    /// Form name usable as a single path component (`10-K/A` -> `10-K_A`).
    pub fn dir_name(&self) -> String {
        self.as_str().replace('/', "_")
    }

    pub fn is_amendment(&self) -> bool {
        matches!(self, ReportType::Form10KA | ReportType::Form10QA)
    }

    /// 10-Q and 10-Q/A, whose items are numbered per part.
    pub fn is_quarterly(&self) -> bool {
        matches!(self, ReportType::Form10Q | ReportType::Form10QA)
    }

    pub fn list_types() -> &'static str {
        &REPORT_TYPES
    }
}

pub static REPORT_TYPES: Lazy<String> = Lazy::new(|| {
    ReportType::iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
});

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = AcquisitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "10-K" | "10K" => Ok(ReportType::Form10K),
            "10-Q" | "10Q" => Ok(ReportType::Form10Q),
            "10-K/A" | "10-K_A" => Ok(ReportType::Form10KA),
            "10-Q/A" | "10-Q_A" => Ok(ReportType::Form10QA),
            other => Err(AcquisitionError::InvalidRequest(format!(
                "unsupported filing type {:?}, expected one of: {}",
                other,
                ReportType::list_types()
            ))),
        }
    }
}

impl TryFrom<String> for ReportType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        ReportType::from_str(&s).map_err(|e| e.to_string())
    }
}

impl From<ReportType> for String {
    fn from(report_type: ReportType) -> Self {
        report_type.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_forms() {
        assert_eq!("10-K".parse::<ReportType>().unwrap(), ReportType::Form10K);
        assert_eq!("10-q".parse::<ReportType>().unwrap(), ReportType::Form10Q);
        assert_eq!("10-K/A".parse::<ReportType>().unwrap(), ReportType::Form10KA);
        assert_eq!(" 10-Q/A ".parse::<ReportType>().unwrap(), ReportType::Form10QA);
    }

    #[test]
    fn test_unsupported_form_is_invalid_request() {
        let err = "8-K".parse::<ReportType>().unwrap_err();
        assert!(matches!(err, AcquisitionError::InvalidRequest(_)));
        assert!(err.to_string().contains("10-K, 10-Q, 10-K/A, 10-Q/A"));
    }

    #[test]
    fn test_dir_name_is_path_safe() {
        assert_eq!(ReportType::Form10KA.dir_name(), "10-K_A");
        assert_eq!(ReportType::Form10K.dir_name(), "10-K");
        assert_eq!(
            ReportType::from_str(&ReportType::Form10QA.dir_name()).unwrap(),
            ReportType::Form10QA
        );
    }

    #[test]
    fn test_serde_uses_form_names() {
        let json = serde_json::to_string(&ReportType::Form10KA).unwrap();
        assert_eq!(json, "\"10-K/A\"");
        let parsed: ReportType = serde_json::from_str("\"10-Q\"").unwrap();
        assert_eq!(parsed, ReportType::Form10Q);
    }
}
