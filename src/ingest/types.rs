// src/ingest/types.rs
use crate::error::Result;

/// One raw article record as it came out of a source. Immutable after loading.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Article {
    pub id: String,
    pub published: Option<String>, // raw date text, parsed by the deriver
    pub source: String,            // e.g. "seekingalpha.com"
    pub url: String,
    pub tone: Option<String>,      // composite "tone,pos,neg,polarity,..." string
    pub themes: Option<String>,    // ';'-delimited theme codes
    pub locations: Option<String>, // raw location tags
    pub organizations: Option<String>,
}

#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Article>>;
    fn name(&self) -> &'static str;
}

/// What the loader produced and where it came from.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub articles: Vec<Article>,
    pub source: &'static str,
    pub synthetic: bool,
}
