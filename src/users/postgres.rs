use axum::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use time::OffsetDateTime;
use tracing::debug;

use crate::users::repo::{RepoResult, UserRepository};
use crate::users::repo_types::{NewUser, User, UserFilter, UserOrder};

const USER_COLUMNS: &str = "id, username, email, password, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn insert<'e, E>(executor: E, user: &NewUser) -> RepoResult<User>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let now = OffsetDateTime::now_utc();
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
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
impl UserRepository for PgUserRepository {
    async fn find_all(&self, order: Option<UserOrder>) -> RepoResult<Vec<User>> {
        // "C" collation gives byte-wise ordering regardless of the database locale.
        let sql = format!(
            "SELECT {} FROM users ORDER BY {}",
            USER_COLUMNS,
            UserOrder::order_by_clause(order, "\"C\"")
        );
        sqlx::query_as::<_, User>(&sql).fetch_all(&self.db).await
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn find_one(&self, filter: UserFilter) -> RepoResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE {} = $1 ORDER BY id ASC LIMIT 1",
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
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL,
                email TEXT NOT NULL,
                password TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.db)
        .await?;
        debug!(force, "users table synced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::fixtures::fixture_users;
    use crate::users::repo_types::UserColumn;
    use sqlx::postgres::PgPoolOptions;

    /// Drops and recreates `users`, so point it at a scratch database:
    /// `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`
    async fn seeded() -> Option<PgUserRepository> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let db = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect to postgres");
        let repo = PgUserRepository::new(db);
        repo.sync(true).await.expect("sync");
        repo.bulk_create(&fixture_users()).await.expect("seed");
        Some(repo)
    }

    fn usernames(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.username.as_str()).collect()
    }

    #[tokio::test]
    #[ignore = "needs TEST_DATABASE_URL pointing at a scratch postgres"]
    async fn postgres_orders_bytewise_and_finds_first_match() {
        let Some(repo) = seeded().await else {
            eprintln!("TEST_DATABASE_URL not set; skipping");
            return;
        };

        let all = repo.find_all(None).await.unwrap();
        assert_eq!(usernames(&all), vec!["test1", "test2", "test3", "abc"]);
        assert_eq!(all[0].id, 1);

        let created = repo
            .create(NewUser::new("Zed", "zed@gmail.com", "zzz"))
            .await
            .unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let sorted = repo
            .find_all(Some(UserOrder::asc(UserColumn::Username)))
            .await
            .unwrap();
        assert_eq!(usernames(&sorted), vec!["Zed", "abc", "test1", "test2", "test3"]);

        repo.create(NewUser::new("test2", "other@gmail.com", "other"))
            .await
            .unwrap();
        let first = repo
            .find_one(UserFilter::Username("test2".into()))
            .await
            .unwrap()
            .expect("test2");
        assert_eq!(first.id, 2);
        assert_eq!(first.password, "pass2");

        let by_id = repo.find_by_id(1).await.unwrap().expect("user 1");
        assert_eq!(by_id.email, "test1@gmail.com");
        assert!(repo.find_by_id(999).await.unwrap().is_none());
    }
}
