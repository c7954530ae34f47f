pub mod client;
pub mod fetcher;
pub mod parser;
pub mod retry;
pub mod source;
pub mod throttle;
pub mod user_agent;

pub use client::MarketplaceClient;
pub use fetcher::ReviewFetcher;
pub use parser::{ParsedReview, ReviewPage};
pub use retry::RetryPolicy;
pub use source::ReviewSource;
pub use throttle::Throttle;
