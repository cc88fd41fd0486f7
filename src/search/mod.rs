//! Full-text user search backed by Elasticsearch.

mod elasticsearch;
mod error;

use async_trait::async_trait;
pub use elasticsearch::ElasticsearchUserRepo;
pub use error::{SearchError, SearchResult};

use crate::models::User;

#[async_trait]
pub trait UserSearchRepo: Send + Sync {
    /// Run a `query_string` query (e.g. `login:admin` or `alice`) against the index
    async fn search(&self, query: &str) -> SearchResult<Vec<User>>;

    /// Insert or replace the document for a user
    async fn index(&self, user: &User) -> SearchResult<()>;

    /// Remove a user's document. Removing a missing document is not an error.
    async fn delete(&self, id: i64) -> SearchResult<()>;
}
