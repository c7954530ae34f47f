use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::product_id::ProductId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReview {
    pub review_id: String,
    pub author: String,
    pub posted_at: DateTime<Utc>,
    pub rating: f64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    pub fn from_str_lossy(value: &str) -> Self {
        match value {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReview {
    pub product_id: ProductId,
    pub review_id: String,
    pub author: String,
    pub posted_at: DateTime<Utc>,
    pub rating: f64,
    pub text: String,
    pub sentiment: Sentiment,
    pub fake_score: f64,
    pub is_fake: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub fake: usize,
    pub average_rating: Option<f64>,
}

impl ReviewSummary {
    pub fn from_reviews(reviews: &[ClassifiedReview]) -> Self {
        let mut summary = Self {
            total: reviews.len(),
            ..Self::default()
        };

        for review in reviews {
            match review.sentiment {
                Sentiment::Positive => summary.positive += 1,
                Sentiment::Negative => summary.negative += 1,
                Sentiment::Neutral => summary.neutral += 1,
            }
            if review.is_fake {
                summary.fake += 1;
            }
        }

        if !reviews.is_empty() {
            let total_rating: f64 = reviews.iter().map(|r| r.rating).sum();
            summary.average_rating = Some(total_rating / reviews.len() as f64);
        }

        summary
    }

    pub fn fake_share(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.fake as f64 / self.total as f64
        }
    }
}
