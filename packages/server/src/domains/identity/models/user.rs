use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{StoreResult, UserId};

/// User record as stored by the identity directory
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub phone: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>, // opaque, never fetched
    pub created_at: DateTime<Utc>,
}

/// Display data joined onto members, requests and check-ins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: Option<String>,
    pub phone: String,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Fields needed to seed a user (fixtures and local tooling)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub phone: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl NewUser {
    pub fn new(phone: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            email: None,
            first_name: first_name.into(),
            last_name: None,
        }
    }
}

impl User {
    /// Find user by phone number
    pub async fn find_by_phone(phone: &str, pool: &PgPool) -> StoreResult<Option<Self>> {
        let user = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE phone = $1")
            .bind(phone)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(id: UserId, pool: &PgPool) -> StoreResult<Option<Self>> {
        let user = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Insert new user
    pub async fn insert(new: &NewUser, pool: &PgPool) -> StoreResult<Self> {
        let user = sqlx::query_as::<_, Self>(
            "INSERT INTO users (id, phone, email, first_name, last_name)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(UserId::new())
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first: &str, last: Option<&str>) -> UserProfile {
        UserProfile {
            first_name: first.to_string(),
            last_name: last.map(str::to_string),
            phone: "+15550100".to_string(),
            avatar_url: None,
        }
    }

    #[test]
    fn display_name_joins_first_and_last() {
        assert_eq!(profile("Ada", Some("Lovelace")).display_name(), "Ada Lovelace");
    }

    #[test]
    fn display_name_ignores_blank_last_name() {
        assert_eq!(profile("Ada", Some("  ")).display_name(), "Ada");
        assert_eq!(profile("Ada", None).display_name(), "Ada");
    }
}
