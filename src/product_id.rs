use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

fn product_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // product/<digits> or product/<slug>-<digits>, ending the path segment
        Regex::new(r"product/(?:[^/?#]*?-)?(\d+)(?:[/?#]|$)").expect("valid product path regex")
    })
}

impl ProductId {
    pub fn extract(input: &str) -> Result<Self> {
        let input = input.trim();

        let lowered = input.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            return product_path_pattern()
                .captures(input)
                .and_then(|caps| caps.get(1))
                .map(|m| ProductId(m.as_str().to_string()))
                .ok_or_else(|| {
                    Error::InvalidInput(format!("no product identifier in URL: {}", input))
                });
        }

        if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(ProductId(input.to_string()));
        }

        Err(Error::InvalidInput(format!(
            "expected a product URL or numeric ID, got: {:?}",
            input
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::extract(s)
    }
}
