use async_trait::async_trait;
use reqwest::{header, Client};

use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::marketplace::parser::{parse_page, ReviewPage};
use crate::marketplace::retry::RetryPolicy;
use crate::marketplace::source::ReviewSource;
use crate::marketplace::user_agent::{random_user_agent, ACCEPT_LANGUAGE};
use crate::product_id::ProductId;

const PAGE_ENDPOINT: &str = "/api/entrypoint-api.bx/page/json/v2";

pub struct MarketplaceClient {
    client: Client,
    base_url: String,
    widget_prefix: String,
    retry: RetryPolicy,
}

impl MarketplaceClient {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static(ACCEPT_LANGUAGE),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            widget_prefix: config.widget_prefix.clone(),
            retry: config.retry.clone(),
        })
    }

    pub fn page_path(product_id: &ProductId, page: u32) -> String {
        format!("/product/{}/reviews?page={}", product_id, page)
    }

    fn referer(&self, product_id: &ProductId) -> String {
        format!("{}/product/{}/reviews", self.base_url, product_id)
    }

    async fn request_page(&self, product_id: &ProductId, page: u32) -> Result<String> {
        let url = format!("{}{}", self.base_url, PAGE_ENDPOINT);
        tracing::debug!("Fetching review page {} for product {}", page, product_id);

        let response = self
            .client
            .get(&url)
            .query(&[("url", Self::page_path(product_id, page))])
            .header(header::USER_AGENT, random_user_agent())
            .header(header::REFERER, self.referer(product_id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::from_status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ReviewSource for MarketplaceClient {
    async fn fetch_page(&self, product_id: &ProductId, page: u32) -> Result<Option<ReviewPage>> {
        let body = self
            .retry
            .execute("review page", || self.request_page(product_id, page))
            .await?;

        parse_page(&body, &self.widget_prefix)
    }

    fn name(&self) -> &str {
        "marketplace"
    }
}
