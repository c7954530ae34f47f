use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::RawReview;

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPage {
    pub reviews: Vec<ParsedReview>,
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReview {
    pub id: Option<String>,
    pub author: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub rating: f64,
    pub text: String,
}

impl ParsedReview {
    pub fn into_raw(self, fallback_id: impl FnOnce() -> String, fetched_at: DateTime<Utc>) -> RawReview {
        RawReview {
            review_id: self.id.unwrap_or_else(fallback_id),
            author: self.author,
            posted_at: self.posted_at.unwrap_or(fetched_at),
            rating: self.rating,
            text: self.text,
        }
    }
}

// Ok(None): no review widget on the page, i.e. end of data.
pub fn parse_page(body: &str, widget_prefix: &str) -> Result<Option<ReviewPage>> {
    let payload: Value = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let widget = match find_widget(&payload, widget_prefix)? {
        Some(widget) => widget,
        None => return Ok(None),
    };

    let reviews = match widget.get("reviews") {
        Some(Value::Array(items)) => items.iter().map(parse_entry).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            return Err(Error::MalformedResponse(
                "widget field `reviews` is not a list".to_string(),
            ))
        }
    };

    let has_next = widget
        .get("paging")
        .and_then(|paging| paging.get("nextPage"))
        .map(is_truthy)
        .unwrap_or(false);

    Ok(Some(ReviewPage { reviews, has_next }))
}

fn find_widget(payload: &Value, prefix: &str) -> Result<Option<Value>> {
    let container = payload.get("widgetStates").unwrap_or(payload);
    let states = container.as_object().ok_or_else(|| {
        Error::MalformedResponse("page payload is not a JSON object".to_string())
    })?;

    let state = match states.iter().find(|(key, _)| key.starts_with(prefix)) {
        Some((_, state)) => state,
        None => return Ok(None),
    };

    match state {
        Value::Object(_) => Ok(Some(state.clone())),
        Value::String(encoded) => serde_json::from_str(encoded)
            .map(Some)
            .map_err(|e| Error::MalformedResponse(format!("invalid widget state: {}", e))),
        _ => Err(Error::MalformedResponse(
            "widget state is neither an object nor a string".to_string(),
        )),
    }
}

fn parse_entry(entry: &Value) -> ParsedReview {
    ParsedReview {
        id: entry.get("id").and_then(stringify_id),
        author: entry.get("author").map(parse_author).unwrap_or_default(),
        posted_at: entry
            .get("createdAt")
            .or_else(|| entry.get("publishedAt"))
            .and_then(parse_millis),
        rating: entry.get("rating").map(parse_rating).unwrap_or(0.0),
        text: entry
            .get("text")
            .or_else(|| entry.get("comment"))
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

fn stringify_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_author(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Object(fields) => {
            if let Some(name) = fields.get("name").and_then(Value::as_str) {
                return name.trim().to_string();
            }
            let parts: Vec<&str> = ["firstName", "lastName"]
                .iter()
                .filter_map(|key| fields.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();
            parts.join(" ")
        }
        _ => String::new(),
    }
}

fn parse_rating(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().replace(',', ".").parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn parse_millis(value: &Value) -> Option<DateTime<Utc>> {
    let millis = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    DateTime::from_timestamp_millis(millis)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}
