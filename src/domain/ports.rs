use crate::domain::model::{StageBody, StageId, StageOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where the remote pipeline lives. Injected into the orchestrator and the
/// stage client so tests can point them at a mock server.
pub trait ApiConfig: Send + Sync {
    fn base_url(&self) -> &str;

    /// Location of the side-input reference document needed by the
    /// misspelling-correction stage. Defaults to the well-known path under
    /// the base address.
    fn reference_url(&self) -> String {
        format!(
            "{}/uploads/{}",
            self.base_url().trim_end_matches('/'),
            crate::domain::model::REFERENCE_DOCUMENT
        )
    }
}

/// Transport seam between the orchestrator and the network. One stage call
/// in, one classified outcome out; no retries at this layer.
#[async_trait]
pub trait StageTransport: Send + Sync {
    async fn call_stage(&self, stage: StageId, endpoint: &str, body: StageBody) -> StageOutcome;

    /// Fetch the side-input document. A non-2xx response or a connection
    /// failure is a `DependencyMissing` error, not a stage failure.
    async fn fetch_reference(&self, url: &str) -> Result<Vec<u8>>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
