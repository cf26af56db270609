//! The shared product catalog: loading, de-duplicating merge with backup,
//! whole-mall removal, run summaries and verification.

pub mod error;
pub mod merge;
pub mod store;
pub mod summary;
pub mod verify;

pub use error::CatalogError;
pub use merge::{
    merge, register, remove_mall_records, MergeCounts, MergeMode, MergeOutcome, RegisterOutcome,
    RemoveOutcome,
};
pub use store::{backup_file, entry_id, entry_mall, entry_name, Catalog};
pub use summary::{category_histogram, summarize, write_json, PriceStats, RunCounts, RunSummary};
pub use verify::{verify_mall, VerificationReport};
