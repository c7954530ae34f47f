use chrono::Utc;
use std::collections::HashSet;

use crate::error::Result;
use crate::marketplace::source::ReviewSource;
use crate::marketplace::throttle::Throttle;
use crate::models::RawReview;
use crate::product_id::ProductId;

// Upper bound for unlimited fetches against a source that never stops paging.
pub const MAX_PAGES: u32 = 500;

pub struct ReviewFetcher<'a> {
    source: &'a dyn ReviewSource,
    throttle: Throttle,
}

impl<'a> ReviewFetcher<'a> {
    pub fn new(source: &'a dyn ReviewSource, throttle: Throttle) -> Self {
        Self { source, throttle }
    }

    // Source failures end pagination; only bad input is an error.
    pub async fn fetch(
        &self,
        product_input: &str,
        max_reviews: Option<usize>,
    ) -> Result<Vec<RawReview>> {
        let product_id = ProductId::extract(product_input)?;
        let mut reviews: Vec<RawReview> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut page = 1;

        if max_reviews == Some(0) {
            return Ok(reviews);
        }

        'pages: loop {
            let fetched = match self.source.fetch_page(&product_id, page).await {
                Ok(Some(fetched)) => fetched,
                Ok(None) => {
                    tracing::info!(
                        "No review data on page {} for product {}, stopping",
                        page,
                        product_id
                    );
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        source = self.source.name(),
                        "Fetching page {} for product {} failed, keeping {} reviews: {}",
                        page,
                        product_id,
                        reviews.len(),
                        e
                    );
                    break;
                }
            };

            let fetched_at = Utc::now();
            let on_page = fetched.reviews.len();
            tracing::debug!("Page {} returned {} reviews", page, on_page);

            let repeated = on_page > 0
                && fetched
                    .reviews
                    .iter()
                    .all(|r| r.id.as_ref().is_some_and(|id| seen.contains(id)));
            if repeated {
                tracing::warn!(
                    "Page {} for product {} only repeats earlier reviews, stopping",
                    page,
                    product_id
                );
                break;
            }

            for entry in fetched.reviews {
                let index = reviews.len();
                let raw = entry.into_raw(|| format!("rev_{}_{}", index, product_id), fetched_at);
                seen.insert(raw.review_id.clone());
                reviews.push(raw);

                if max_reviews.is_some_and(|max| reviews.len() >= max) {
                    break 'pages;
                }
            }

            if !fetched.has_next || on_page == 0 {
                break;
            }

            if page >= MAX_PAGES {
                tracing::warn!(
                    "Reached {} pages for product {}, stopping",
                    MAX_PAGES,
                    product_id
                );
                break;
            }

            page += 1;
            self.throttle.pause().await;
        }

        tracing::info!(
            "Fetched {} reviews for product {} in {} page request(s)",
            reviews.len(),
            product_id,
            page
        );
        Ok(reviews)
    }
}
