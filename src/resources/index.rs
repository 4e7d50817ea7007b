//! Service banner at `/`.

use async_trait::async_trait;

use crate::http::{ApiRequest, ApiResponse, ApiResult, Resource};

pub struct Index;

#[async_trait]
impl Resource for Index {
    fn name(&self) -> &'static str {
        "index"
    }

    async fn read(&self, _req: ApiRequest) -> ApiResult {
        Ok(ApiResponse::text(format!(
            "Slice API @ v{}",
            env!("CARGO_PKG_VERSION")
        )))
    }
}
