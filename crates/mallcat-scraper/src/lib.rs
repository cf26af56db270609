pub mod client;
pub mod error;
pub mod extract;
pub mod mall;
pub mod pagination;
pub mod price;
pub mod record;
pub mod retry;
pub mod select;
pub mod taxonomy;
pub mod types;
pub mod url;

pub use client::MallClient;
pub use error::ScraperError;
pub use extract::{extract_products, CompiledSelectors};
pub use mall::MallScraper;
pub use price::{normalize_price, parse_price, NormalizedPrice};
pub use record::RecordBuilder;
pub use retry::RetryPolicy;
pub use select::CandidateSelectors;
pub use types::{PageFailure, RawProduct, ScrapeReport};
pub use url::{origin_of, resolve_url};
