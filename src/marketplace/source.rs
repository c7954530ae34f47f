use async_trait::async_trait;

use crate::error::Result;
use crate::marketplace::parser::ReviewPage;
use crate::product_id::ProductId;

// `Ok(None)` means the page holds no review widget (end of data).
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn fetch_page(&self, product_id: &ProductId, page: u32) -> Result<Option<ReviewPage>>;
    fn name(&self) -> &str;
}
