use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Public profile of a volunteer. Credential columns stay out of this
/// struct, handlers select the profile columns explicitly.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Volunteer {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub birth_date: Option<NaiveDate>,
    pub contact: Option<String>,
    pub reputation: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i32,
    pub email: String,
    pub password: String,
    pub salt: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VolunteerUpdate {
    pub name: String,
    pub surname: String,
    pub birth_date: Option<NaiveDate>,
    pub contact: Option<String>,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
}
