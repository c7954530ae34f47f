use crate::models::Sentiment;

pub const POSITIVE_KEYWORDS: &[&str] = &["отлично", "рекомендую", "супер", "доволен"];

pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "плохо",
    "ужасно",
    "отвратительно",
    "разочарован",
    "не рекомендую",
];

// Each keyword found anywhere in the text counts once.
pub fn analyze_sentiment(text: &str) -> Sentiment {
    let lowered = text.to_lowercase();
    let positive = count_hits(&lowered, POSITIVE_KEYWORDS);
    let negative = count_hits(&lowered, NEGATIVE_KEYWORDS);

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

fn count_hits(lowered: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| lowered.contains(*kw)).count()
}
