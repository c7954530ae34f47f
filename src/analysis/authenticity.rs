use regex::Regex;
use std::sync::OnceLock;

use crate::models::RawReview;

// Strictly above.
pub const FAKE_THRESHOLD: f64 = 0.5;

const RECOMMEND_KEYWORD: &str = "рекомендую";

pub struct Signal {
    pub name: &'static str,
    pub weight: f64,
    pub triggered: fn(&RawReview) -> bool,
}

pub const SIGNALS: &[Signal] = &[
    Signal {
        name: "very_short_text",
        weight: 0.3,
        triggered: very_short_text,
    },
    Signal {
        name: "short_generic_recommendation",
        weight: 0.2,
        triggered: short_generic_recommendation,
    },
    Signal {
        name: "placeholder_author",
        weight: 0.2,
        triggered: placeholder_author,
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct Authenticity {
    pub score: f64,
    pub is_fake: bool,
    pub signals: Vec<&'static str>,
}

pub fn score_authenticity(review: &RawReview) -> Authenticity {
    let mut score = 0.0;
    let mut signals = Vec::new();

    for signal in SIGNALS {
        if (signal.triggered)(review) {
            score += signal.weight;
            signals.push(signal.name);
        }
    }

    Authenticity {
        score,
        is_fake: score > FAKE_THRESHOLD,
        signals,
    }
}

fn text_len(review: &RawReview) -> usize {
    review.text.chars().count()
}

fn very_short_text(review: &RawReview) -> bool {
    text_len(review) < 15
}

fn short_generic_recommendation(review: &RawReview) -> bool {
    text_len(review) < 40 && review.text.to_lowercase().contains(RECOMMEND_KEYWORD)
}

fn placeholder_author(review: &RawReview) -> bool {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    NON_WORD
        .get_or_init(|| Regex::new(r"^\W+$").expect("valid author regex"))
        .is_match(&review.author)
}
