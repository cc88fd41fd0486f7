use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{SearchError, SearchResult, UserSearchRepo};
use crate::{config::SearchConfig, models::User, observability::metrics};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: User,
}

pub struct ElasticsearchUserRepo {
    client: Client,
    base_url: String,
    index: String,
    credentials: Option<(String, Option<String>)>,
}

impl ElasticsearchUserRepo {
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        config
            .validate()
            .map_err(|e| SearchError::Config(e.to_string()))?;

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            index: config.index.clone(),
            credentials: config
                .username
                .clone()
                .map(|user| (user, config.password.clone())),
        })
    }

    fn doc_url(&self, id: i64) -> String {
        format!("{}/{}/_doc/{}", self.base_url, self.index, id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, password.as_ref()),
            None => request,
        }
    }

    /// Send a request, timing it and mapping non-success statuses to errors.
    /// Statuses in `allowed` are passed through as success.
    async fn send(
        &self,
        operation: &str,
        request: RequestBuilder,
        allowed: &[StatusCode],
    ) -> SearchResult<Response> {
        let start = Instant::now();
        let result = self.authorize(request).send().await;
        let elapsed = start.elapsed().as_secs_f64();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                metrics::record_search_request(operation, false, elapsed);
                return Err(e.into());
            }
        };

        let status = response.status();
        if status.is_success() || allowed.contains(&status) {
            metrics::record_search_request(operation, true, elapsed);
            return Ok(response);
        }

        metrics::record_search_request(operation, false, elapsed);
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            operation,
            status = status.as_u16(),
            index = %self.index,
            "Search index request failed"
        );
        Err(SearchError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl UserSearchRepo for ElasticsearchUserRepo {
    async fn search(&self, query: &str) -> SearchResult<Vec<User>> {
        let url = format!("{}/{}/_search", self.base_url, self.index);
        let body = json!({
            "query": {
                "query_string": { "query": query }
            }
        });

        let response = self
            .send("search", self.client.post(url).json(&body), &[])
            .await?;
        let text = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&text)?;

        let users: Vec<User> = parsed.hits.hits.into_iter().map(|hit| hit.source).collect();
        tracing::debug!(query, hits = users.len(), "User search complete");
        Ok(users)
    }

    async fn index(&self, user: &User) -> SearchResult<()> {
        self.send(
            "index",
            self.client.put(self.doc_url(user.id)).json(user),
            &[],
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> SearchResult<()> {
        let response = self
            .send(
                "delete",
                self.client.delete(self.doc_url(id)),
                &[StatusCode::NOT_FOUND],
            )
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(id, "User document already absent from index");
        }
        Ok(())
    }
}
