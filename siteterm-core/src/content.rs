//! Content index collaborator.
//!
//! The interpreter only ever asks for "all posts" and "search posts". The
//! site loads posts elsewhere; [`InMemoryContentIndex`] holds a loaded copy
//! with a per-query search cache.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use crate::error::{ContentError, Result};

/// A published post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub reading_time: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub content: String,
}

impl Post {
    /// Case-insensitive substring match over title, excerpt, content, tags and category.
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.excerpt.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
            || self.category.to_lowercase().contains(needle)
    }
}

/// Read-only view of the site's posts.
#[async_trait]
pub trait ContentIndex: Send + Sync {
    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// Posts matching `query`; an empty query returns the full index.
    async fn search_posts(&self, query: &str) -> Result<Vec<Post>>;

    /// Whether posts are still being loaded.
    fn is_loading(&self) -> bool {
        false
    }

    async fn featured_posts(&self) -> Result<Vec<Post>> {
        Ok(self
            .list_posts()
            .await?
            .into_iter()
            .filter(|p| p.featured)
            .collect())
    }

    /// The `limit` most recent posts by publication date.
    async fn recent_posts(&self, limit: usize) -> Result<Vec<Post>> {
        let mut posts = self.list_posts().await?;
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        posts.truncate(limit);
        Ok(posts)
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        Ok(self.list_posts().await?.into_iter().find(|p| p.slug == slug))
    }
}

/// Distinct queries remembered before the search cache starts over.
pub const SEARCH_CACHE_LIMIT: usize = 64;

/// Posts held in memory, sorted newest first.
#[derive(Default)]
pub struct InMemoryContentIndex {
    posts: Vec<Post>,
    loading: bool,
    search_cache: Mutex<HashMap<String, Vec<Post>>>,
}

impl InMemoryContentIndex {
    pub fn new(mut posts: Vec<Post>) -> Self {
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Self {
            posts,
            loading: false,
            search_cache: Mutex::new(HashMap::new()),
        }
    }

    /// An index that reports it is still loading.
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// Load posts from a JSON array file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ContentError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let posts: Vec<Post> = serde_json::from_str(&raw).map_err(|e| ContentError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), count = posts.len(), "Loaded posts");
        Ok(Self::new(posts))
    }

    /// Replace the posts and drop cached searches.
    pub fn set_posts(&mut self, posts: Vec<Post>) {
        *self = Self::new(posts);
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.posts
            .iter()
            .map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        self.posts
            .iter()
            .flat_map(|p| p.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn cached(&self, key: &str) -> Option<Vec<Post>> {
        self.search_cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(key).cloned())
    }

    fn remember(&self, key: String, results: &[Post]) {
        if let Ok(mut cache) = self.search_cache.lock() {
            if cache.len() >= SEARCH_CACHE_LIMIT && !cache.contains_key(&key) {
                debug!(entries = cache.len(), "Search cache full, clearing");
                cache.clear();
            }
            cache.insert(key, results.to_vec());
        }
    }
}

#[async_trait]
impl ContentIndex for InMemoryContentIndex {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.posts.clone())
    }

    async fn search_posts(&self, query: &str) -> Result<Vec<Post>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(self.posts.clone());
        }
        if let Some(hit) = self.cached(&needle) {
            debug!(query = %needle, "Search cache hit");
            return Ok(hit);
        }
        let results: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| p.matches(&needle))
            .cloned()
            .collect();
        self.remember(needle, &results);
        Ok(results)
    }

    fn is_loading(&self) -> bool {
        self.loading
    }
}
