use axum::async_trait;

use crate::users::repo_types::{NewUser, User, UserFilter, UserOrder};

pub type RepoResult<T> = Result<T, sqlx::Error>;

/// Persistence operations over the `users` table.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users; `None` keeps insertion order.
    async fn find_all(&self, order: Option<UserOrder>) -> RepoResult<Vec<User>>;

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>>;

    /// First user (lowest id) matching the filter.
    async fn find_one(&self, filter: UserFilter) -> RepoResult<Option<User>>;

    async fn create(&self, user: NewUser) -> RepoResult<User>;

    /// Inserts every record in one transaction, returning them in input order.
    async fn bulk_create(&self, users: &[NewUser]) -> RepoResult<Vec<User>>;

    /// Creates the table if missing. With `force`, drops it first.
    async fn sync(&self, force: bool) -> RepoResult<()>;
}
