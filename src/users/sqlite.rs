use axum::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Executor, Sqlite, SqlitePool,
};
use std::str::FromStr;
use time::OffsetDateTime;
use tracing::debug;

use crate::users::repo::{RepoResult, UserRepository};
use crate::users::repo_types::{NewUser, User, UserFilter, UserOrder};

const USER_COLUMNS: &str = "id, username, email, password, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteUserRepository {
    db: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn in_memory() -> RepoResult<Self> {
        Self::in_memory_with(SqliteConnectOptions::from_str("sqlite::memory:")?).await
    }

    /// Single pinned connection: every in-memory connection is its own database.
    pub async fn in_memory_with(options: SqliteConnectOptions) -> RepoResult<Self> {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self::new(db))
    }

    /// Opens a file database, creating the file when it does not exist yet.
    pub async fn open(options: SqliteConnectOptions, max_connections: u32) -> RepoResult<Self> {
        let db = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options.create_if_missing(true))
            .await?;
        Ok(Self::new(db))
    }

    async fn insert<'e, E>(executor: E, user: &NewUser) -> RepoResult<User>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = OffsetDateTime::now_utc();
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING id, username, email, password, created_at, updated_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(now)
        .fetch_one(executor)
        .await
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_all(&self, order: Option<UserOrder>) -> RepoResult<Vec<User>> {
        // BINARY is already SQLite's default collation.
        let sql = format!(
            "SELECT {} FROM users ORDER BY {}",
            USER_COLUMNS,
            UserOrder::order_by_clause(order, "BINARY")
        );
        sqlx::query_as::<_, User>(&sql).fetch_all(&self.db).await
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn find_one(&self, filter: UserFilter) -> RepoResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE {} = ?1 ORDER BY id ASC LIMIT 1",
            USER_COLUMNS,
            filter.column()
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(filter.value())
            .fetch_optional(&self.db)
            .await
    }

    async fn create(&self, user: NewUser) -> RepoResult<User> {
        Self::insert(&self.db, &user).await
    }

    async fn bulk_create(&self, users: &[NewUser]) -> RepoResult<Vec<User>> {
        let mut tx = self.db.begin().await?;
        let mut created = Vec::with_capacity(users.len());
        for user in users {
            created.push(Self::insert(&mut *tx, user).await?);
        }
        tx.commit().await?;
        debug!(count = created.len(), "bulk insert committed");
        Ok(created)
    }

    async fn sync(&self, force: bool) -> RepoResult<()> {
        if force {
            sqlx::query("DROP TABLE IF EXISTS users")
                .execute(&self.db)
                .await?;
        }
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                email TEXT NOT NULL,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;
        debug!(force, "users table synced");
        Ok(())
    }
}
