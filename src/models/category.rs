use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub popularity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCreation {
    pub name: String,
    pub description: Option<String>,
}
