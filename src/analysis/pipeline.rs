use crate::analysis::authenticity::score_authenticity;
use crate::analysis::sentiment::analyze_sentiment;
use crate::config::FetchConfig;
use crate::error::Result;
use crate::marketplace::{MarketplaceClient, ReviewFetcher, ReviewSource};
use crate::models::{ClassifiedReview, RawReview};
use crate::product_id::ProductId;

pub struct ReviewPipeline {
    config: FetchConfig,
}

impl ReviewPipeline {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    pub async fn run(
        &self,
        product_input: &str,
        max_reviews: Option<usize>,
    ) -> Result<Vec<ClassifiedReview>> {
        let session = MarketplaceClient::new(&self.config)?;
        self.run_with_source(&session, product_input, max_reviews).await
    }

    pub async fn run_with_source(
        &self,
        source: &dyn ReviewSource,
        product_input: &str,
        max_reviews: Option<usize>,
    ) -> Result<Vec<ClassifiedReview>> {
        tracing::info!("Fetching reviews for {}", product_input);
        let fetcher = ReviewFetcher::new(source, self.config.throttle.clone());
        let raw_reviews = fetcher.fetch(product_input, max_reviews).await?;

        if raw_reviews.is_empty() {
            tracing::warn!("No reviews fetched for {}", product_input);
            return Ok(Vec::new());
        }

        // Re-derived rather than threaded through the fetcher; both resolve
        // the same input with the same pure function.
        let product_id = ProductId::extract(product_input)?;

        let classified: Vec<_> = raw_reviews
            .into_iter()
            .map(|review| classify(&product_id, review))
            .collect();

        tracing::info!(
            "Classified {} reviews for product {} ({} flagged as fake)",
            classified.len(),
            product_id,
            classified.iter().filter(|r| r.is_fake).count()
        );

        Ok(classified)
    }
}

pub fn classify(product_id: &ProductId, review: RawReview) -> ClassifiedReview {
    let sentiment = analyze_sentiment(&review.text);
    let authenticity = score_authenticity(&review);

    if authenticity.is_fake {
        tracing::debug!(
            review_id = %review.review_id,
            score = authenticity.score,
            signals = ?authenticity.signals,
            "Review flagged as likely fake"
        );
    }

    ClassifiedReview {
        product_id: product_id.clone(),
        review_id: review.review_id,
        author: review.author,
        posted_at: review.posted_at,
        rating: review.rating,
        text: review.text,
        sentiment,
        fake_score: authenticity.score,
        is_fake: authenticity.is_fake,
    }
}
