//! News state container — app-owned, SDK-provided update logic.

use super::Article;
use crate::domain::tracked::{FetchGuard, FetchOutcome, FetchTicket};
use crate::error::SdkError;

/// Latest headlines with the same loading/error lifecycle as tracked state.
#[derive(Debug, Clone, Default)]
pub struct NewsState {
    articles: Vec<Article>,
    fetch: FetchGuard,
}

impl NewsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.fetch.error()
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetch.begin()
    }

    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Article>, SdkError>,
    ) -> FetchOutcome {
        match self.fetch.finish(ticket, result) {
            None => FetchOutcome::Stale,
            Some(Ok(articles)) => {
                self.articles = articles;
                FetchOutcome::Applied {
                    count: self.articles.len(),
                }
            }
            Some(Err(_)) => FetchOutcome::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str) -> Article {
        Article {
            id: id.to_string(),
            title: format!("headline {}", id),
            url: None,
            published_at: None,
        }
    }

    #[test]
    fn test_fetch_lifecycle() {
        let mut state = NewsState::new();
        let ticket = state.begin_fetch();
        assert!(state.is_loading());

        let outcome = state.complete_fetch(ticket, Ok(vec![article("a"), article("b")]));
        assert_eq!(outcome, FetchOutcome::Applied { count: 2 });
        assert!(!state.is_loading());
        assert_eq!(state.articles().len(), 2);
    }

    #[test]
    fn test_failure_keeps_articles() {
        let mut state = NewsState::new();
        let t = state.begin_fetch();
        state.complete_fetch(t, Ok(vec![article("a")]));

        let t = state.begin_fetch();
        let outcome = state.complete_fetch(t, Err(SdkError::Other("upstream down".into())));
        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(state.error(), Some("upstream down"));
        assert_eq!(state.articles().len(), 1);
    }

    #[test]
    fn test_stale_news_discarded() {
        let mut state = NewsState::new();
        let old = state.begin_fetch();
        let new = state.begin_fetch();
        state.complete_fetch(new, Ok(vec![article("new")]));
        assert_eq!(state.complete_fetch(old, Ok(vec![])), FetchOutcome::Stale);
        assert_eq!(state.articles()[0].id, "new");
        assert!(!state.is_loading());
    }
}
