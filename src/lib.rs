//! Online store admin backend: audit event persistence, the audit event
//! retention sweeper, and user search over an Elasticsearch index.

pub mod config;
pub mod db;
pub mod models;
pub mod observability;
pub mod retention;
pub mod search;
pub mod services;
