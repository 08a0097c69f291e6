use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::kv::KvStore;

const READ_ARTICLES_KEY: &str = "newsflash_read_articles";

/// Cap on stored entries, oldest dropped first. Keeps the persisted blob
/// from growing without bound.
const MAX_READ_ARTICLES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadArticle {
    pub article_id: String,
    #[serde(rename = "readAt")]
    pub read_at_ms: u64,
}

/// Which articles the reader has already opened, persisted alongside the
/// quota state. Same degradation policy: an unreadable store means an
/// empty history, a failed write keeps the in-memory list and reports it.
pub struct ReadingHistory<S: KvStore, C: Clock> {
    store: S,
    clock: C,
    articles: Vec<ReadArticle>,
}

impl<S: KvStore, C: Clock> ReadingHistory<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        let articles = load_articles(&store);
        Self {
            store,
            clock,
            articles,
        }
    }

    /// Record an article as read. Re-reading is a no-op. Returns whether
    /// the updated list was persisted.
    pub fn mark_read(&mut self, article_id: &str) -> bool {
        if self.is_read(article_id) {
            return true;
        }

        self.articles.push(ReadArticle {
            article_id: article_id.to_string(),
            read_at_ms: self.clock.now_ms(),
        });
        if self.articles.len() > MAX_READ_ARTICLES {
            let excess = self.articles.len() - MAX_READ_ARTICLES;
            self.articles.drain(..excess);
        }

        self.persist()
    }

    pub fn is_read(&self, article_id: &str) -> bool {
        self.articles.iter().any(|a| a.article_id == article_id)
    }

    pub fn read_articles(&self) -> &[ReadArticle] {
        &self.articles
    }

    /// Drop the whole history. Returns whether the cleared state was
    /// persisted.
    pub fn clear(&mut self) -> bool {
        self.articles.clear();
        match self.store.remove(READ_ARTICLES_KEY) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to clear reading history: {e}");
                false
            }
        }
    }

    fn persist(&mut self) -> bool {
        let json = match serde_json::to_string(&self.articles) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("failed to serialize reading history: {e}");
                return false;
            }
        };
        match self.store.set(READ_ARTICLES_KEY, &json) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to persist reading history: {e}");
                false
            }
        }
    }
}

fn load_articles(store: &impl KvStore) -> Vec<ReadArticle> {
    let raw = match store.get(READ_ARTICLES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!("failed to load reading history: {e}");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(articles) => articles,
        Err(e) => {
            tracing::warn!("discarding corrupt reading history: {e}");
            Vec::new()
        }
    }
}
