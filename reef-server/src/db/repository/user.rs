//! User Repository

use super::{BaseRepository, RepoError, RepoResult, now_millis, record_key};
use crate::db::models::User;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let pure_id = record_key(USER_TABLE, id);
        let user: Option<User> = self.base.db().select((USER_TABLE, pure_id)).await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?
            .take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a user; the unique email index turns a concurrent duplicate
    /// registration into a database error surfaced as Duplicate.
    pub async fn create(&self, name: String, email: String, password_hash: String) -> RepoResult<User> {
        let user = User {
            id: None,
            name,
            email: email.clone(),
            password_hash,
            created_at: now_millis(),
        };

        let created: Result<Option<User>, surrealdb::Error> =
            self.base.db().create(USER_TABLE).content(user).await;

        match created {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(RepoError::Database("Failed to create user".to_string())),
            Err(e) if e.to_string().contains("idx_user_email") => {
                Err(RepoError::Duplicate(format!("Email {} already registered", email)))
            }
            Err(e) => Err(e.into()),
        }
    }
}
