use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A login account, as stored in the user search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub login: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub activated: bool,
    pub lang_key: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
}
