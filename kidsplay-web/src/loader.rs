//! Puzzle datasets served as static assets.

use async_trait::async_trait;
use kidsplay_game::PuzzleSource;

use crate::dom;

/// Fetches dataset files relative to the page
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchSource;

#[derive(Debug, thiserror::Error)]
pub enum WebDataError {
    #[error("Network error fetching {url}: {reason}")]
    Network { url: String, reason: String },
}

#[async_trait(?Send)]
impl PuzzleSource for FetchSource {
    type Error = WebDataError;

    async fn fetch(&self, resource: &str) -> Result<String, Self::Error> {
        dom::fetch_text(resource)
            .await
            .map_err(|err| WebDataError::Network {
                url: resource.to_string(),
                reason: dom::js_error_message(&err),
            })
    }
}
