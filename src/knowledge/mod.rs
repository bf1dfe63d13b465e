//! Advice lookup used to answer suggestion-tier queries.

pub mod static_kb;

pub use static_kb::{KnowledgeEntry, StaticKnowledgeBase};

use std::future::Future;
use std::pin::Pin;

/// Source of advice text for a query. The engine treats the text as opaque.
pub trait KnowledgeRetriever: Send + Sync {
    fn name(&self) -> &str;

    /// Return advice for `query`; an empty string means nothing relevant.
    fn lookup<'a>(
        &'a self,
        query: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}
