pub mod analysis;
pub mod brief;
pub mod core;
pub mod edgar;
pub mod llm;
pub mod market;
pub mod news;
pub mod utils;

// Re-exports
pub use brief::{BriefRequest, ResearchBrief, ResearchDesk};
pub use crate::core::{init, ResearchConfig};
pub use edgar::{ExtractedFiling, FilingPipeline, ReportType, Ticker};
pub use utils::progress::ProgressTracker;
