//! Conversions from wire types to domain types for news.

use super::wire::NewsResponse;
use super::Article;

impl From<NewsResponse> for Vec<Article> {
    fn from(resp: NewsResponse) -> Self {
        resp.results
            .into_iter()
            .enumerate()
            .map(|(index, a)| Article {
                id: a.link.clone().unwrap_or_else(|| format!("news-{}", index)),
                title: a.title.unwrap_or_default(),
                url: a.link,
                published_at: a.pub_date,
            })
            .collect()
    }
}
