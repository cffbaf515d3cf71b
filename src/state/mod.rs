//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: lifecycle of a crawler (idle, initialized, running, finished, aborted)
//! - `Frontier`: per-run visited set, pending queue and page budget

mod crawl_phase;
mod frontier;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use frontier::Frontier;
