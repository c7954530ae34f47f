use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::Result;
use crate::models::{ClassifiedReview, Sentiment};
use crate::product_id::ProductId;

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    fn init_db(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY,
                product_id TEXT NOT NULL,
                review_id TEXT NOT NULL,
                author TEXT NOT NULL,
                posted_at TEXT NOT NULL,
                rating REAL NOT NULL,
                text TEXT NOT NULL,
                sentiment TEXT NOT NULL,
                fake_score REAL NOT NULL,
                is_fake INTEGER NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(product_id, review_id)
            );

            CREATE INDEX IF NOT EXISTS idx_reviews_product_id ON reviews(product_id);
            CREATE INDEX IF NOT EXISTS idx_reviews_posted_at ON reviews(posted_at);
            "#,
        )?;

        Ok(())
    }

    pub fn save_reviews(&mut self, reviews: &[ClassifiedReview]) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO reviews (product_id, review_id, author, posted_at, rating, text,
                                     sentiment, fake_score, is_fake, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT(product_id, review_id) DO UPDATE SET
                    author = excluded.author,
                    posted_at = excluded.posted_at,
                    rating = excluded.rating,
                    text = excluded.text,
                    sentiment = excluded.sentiment,
                    fake_score = excluded.fake_score,
                    is_fake = excluded.is_fake,
                    updated_at = excluded.updated_at
                "#,
            )?;

            for review in reviews {
                stmt.execute(params![
                    review.product_id.as_str(),
                    review.review_id,
                    review.author,
                    review.posted_at.to_rfc3339(),
                    review.rating,
                    review.text,
                    review.sentiment.as_str(),
                    review.fake_score,
                    review.is_fake,
                    now,
                ])?;
            }
        }

        tx.commit()?;
        tracing::debug!("Saved {} reviews", reviews.len());
        Ok(reviews.len())
    }

    pub fn list_reviews(&self, product_id: Option<&ProductId>) -> Result<Vec<ClassifiedReview>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT product_id, review_id, author, posted_at, rating, text,
                   sentiment, fake_score, is_fake
            FROM reviews
            WHERE ?1 IS NULL OR product_id = ?1
            ORDER BY posted_at DESC, id DESC
            "#,
        )?;

        let reviews = stmt.query_map(params![product_id.map(|p| p.as_str())], |row| {
            let product_id: String = row.get(0)?;
            let posted_at: String = row.get(3)?;
            let sentiment: String = row.get(6)?;

            Ok((
                product_id,
                ClassifiedReviewRow {
                    review_id: row.get(1)?,
                    author: row.get(2)?,
                    posted_at,
                    rating: row.get(4)?,
                    text: row.get(5)?,
                    sentiment,
                    fake_score: row.get(7)?,
                    is_fake: row.get(8)?,
                },
            ))
        })?;

        let mut result = Vec::new();
        for row in reviews {
            let (product_id, row) = row?;
            let product_id = match ProductId::extract(&product_id) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Skipping stored review with bad product id: {}", e);
                    continue;
                }
            };
            result.push(row.into_review(product_id));
        }

        Ok(result)
    }

    pub fn count_reviews(&self, product_id: Option<&ProductId>) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE ?1 IS NULL OR product_id = ?1",
            params![product_id.map(|p| p.as_str())],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn last_updated(&self, product_id: &ProductId) -> Result<Option<DateTime<Utc>>> {
        let updated: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT MAX(updated_at) FROM reviews WHERE product_id = ?1",
                params![product_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(updated.flatten().and_then(|s| parse_timestamp(&s)))
    }
}

struct ClassifiedReviewRow {
    review_id: String,
    author: String,
    posted_at: String,
    rating: f64,
    text: String,
    sentiment: String,
    fake_score: f64,
    is_fake: bool,
}

impl ClassifiedReviewRow {
    fn into_review(self, product_id: ProductId) -> ClassifiedReview {
        ClassifiedReview {
            product_id,
            review_id: self.review_id,
            author: self.author,
            posted_at: parse_timestamp(&self.posted_at).unwrap_or_else(Utc::now),
            rating: self.rating,
            text: self.text,
            sentiment: Sentiment::from_str_lossy(&self.sentiment),
            fake_score: self.fake_score,
            is_fake: self.is_fake,
        }
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn review(product: &str, review_id: &str, day: u32, sentiment: Sentiment) -> ClassifiedReview {
        ClassifiedReview {
            product_id: ProductId::extract(product).unwrap(),
            review_id: review_id.to_string(),
            author: "Ольга".to_string(),
            posted_at: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
            rating: 4.0,
            text: "Хороший товар".to_string(),
            sentiment,
            fake_score: 0.3,
            is_fake: false,
        }
    }

    #[test]
    fn test_save_and_list() {
        let mut storage = Storage::in_memory().unwrap();
        let saved = storage
            .save_reviews(&[
                review("100", "a", 1, Sentiment::Positive),
                review("100", "b", 3, Sentiment::Negative),
                review("200", "c", 2, Sentiment::Neutral),
            ])
            .unwrap();
        assert_eq!(saved, 3);

        let all = storage.list_reviews(None).unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.review_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let product = ProductId::extract("100").unwrap();
        let for_product = storage.list_reviews(Some(&product)).unwrap();
        assert_eq!(for_product.len(), 2);
        assert_eq!(for_product[0], review("100", "b", 3, Sentiment::Negative));
    }

    #[test]
    fn test_upsert_overwrites_instead_of_duplicating() {
        let mut storage = Storage::in_memory().unwrap();
        storage
            .save_reviews(&[review("100", "a", 1, Sentiment::Neutral)])
            .unwrap();

        let mut updated = review("100", "a", 1, Sentiment::Positive);
        updated.is_fake = true;
        updated.fake_score = 0.7;
        storage.save_reviews(&[updated]).unwrap();

        assert_eq!(storage.count_reviews(None).unwrap(), 1);
        let stored = &storage.list_reviews(None).unwrap()[0];
        assert_eq!(stored.sentiment, Sentiment::Positive);
        assert!(stored.is_fake);
        assert_eq!(stored.fake_score, 0.7);
    }

    #[test]
    fn test_same_review_id_different_products_kept_apart() {
        let mut storage = Storage::in_memory().unwrap();
        storage
            .save_reviews(&[
                review("100", "rev_0", 1, Sentiment::Neutral),
                review("200", "rev_0", 1, Sentiment::Neutral),
            ])
            .unwrap();

        assert_eq!(storage.count_reviews(None).unwrap(), 2);
        let product = ProductId::extract("200").unwrap();
        assert_eq!(storage.count_reviews(Some(&product)).unwrap(), 1);
    }

    #[test]
    fn test_last_updated() {
        let mut storage = Storage::in_memory().unwrap();
        let product = ProductId::extract("100").unwrap();
        assert_eq!(storage.last_updated(&product).unwrap(), None);

        storage
            .save_reviews(&[review("100", "a", 1, Sentiment::Neutral)])
            .unwrap();
        assert!(storage.last_updated(&product).unwrap().is_some());
    }
}
