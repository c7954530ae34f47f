pub mod config;
pub mod error;
pub mod models;
pub mod product_id;
pub mod marketplace;
pub mod analysis;
pub mod storage;

pub use config::{Config, FetchConfig};
pub use error::{Error, Result};
pub use product_id::ProductId;
pub use marketplace::{MarketplaceClient, ReviewFetcher, ReviewSource};
pub use analysis::ReviewPipeline;
pub use storage::Storage;
