//! News sub-client.

use crate::client::NexusClient;
use crate::domain::news::{Article, NewsState};
use crate::domain::tracked::FetchOutcome;
use crate::error::SdkError;

/// Sub-client for crypto headlines.
pub struct News<'a> {
    pub(crate) client: &'a NexusClient,
}

impl<'a> News<'a> {
    /// Latest crypto headlines, newest first as upstream orders them.
    pub async fn latest(&self) -> Result<Vec<Article>, SdkError> {
        let resp = self.client.http.get_crypto_news().await?;
        if let Some(status) = resp.status.as_deref() {
            if status != "success" {
                return Err(SdkError::Other(format!("news upstream returned status {}", status)));
            }
        }
        Ok(resp.into())
    }

    pub async fn refresh(&self, state: &mut NewsState) -> FetchOutcome {
        let ticket = state.begin_fetch();
        let result = self.latest().await;
        state.complete_fetch(ticket, result)
    }
}
