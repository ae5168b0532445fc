//! Wire types for NewsData `/api/1/news` (REST).

use crate::shared::serde_util::news_timestamp;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Vec<NewsArticle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, rename = "pubDate", deserialize_with = "news_timestamp::deserialize")]
    pub pub_date: Option<DateTime<Utc>>,
}
