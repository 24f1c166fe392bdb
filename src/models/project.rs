use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectCreation {
    pub name: String,
    pub description: Option<String>,
}
