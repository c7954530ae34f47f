pub mod authenticity;
pub mod pipeline;
pub mod sentiment;

pub use authenticity::{score_authenticity, Authenticity};
pub use pipeline::{classify, ReviewPipeline};
pub use sentiment::analyze_sentiment;
