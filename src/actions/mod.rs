//! File actions module.
//!
//! Currently one action: replacing duplicate copies with hard links to a
//! single original.
//!
//! ```no_run
//! use linkdupe::actions::{consolidate, planned_links};
//! use linkdupe::duplicates::DigestGroups;
//!
//! let groups = DigestGroups::default();
//! for (original, candidate) in planned_links(&groups) {
//!     println!("{} -> {}", candidate.display(), original.display());
//! }
//! let summary = consolidate(&groups);
//! assert_eq!(summary.replaced, 0);
//! ```

pub mod consolidate;

pub use consolidate::{
    consolidate, link_candidate, planned_links, CandidateState, ConsolidateError,
    ConsolidationSummary,
};
