use crate::config::AppConfig;
use crate::users::{postgres::PgUserRepository, repo::UserRepository, sqlite::SqliteUserRepository};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, sqlite::SqliteConnectOptions};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let users = connect(&config).await?;
        Ok(Self::from_parts(users, config))
    }

    pub fn from_parts(users: Arc<dyn UserRepository>, config: Arc<AppConfig>) -> Self {
        Self { users, config }
    }

    /// Creates the users table, dropping it first when configured to reset.
    pub async fn sync_schema(&self) -> anyhow::Result<()> {
        self.users
            .sync(self.config.reset_on_start)
            .await
            .context("sync users table")?;
        if self.config.reset_on_start {
            tracing::warn!("users table reset on startup");
        }
        Ok(())
    }

    #[cfg(test)]
    pub async fn seeded_for_tests() -> Self {
        let repo = SqliteUserRepository::in_memory()
            .await
            .expect("in-memory sqlite");
        repo.sync(true).await.expect("sync");
        repo.bulk_create(&crate::users::fixtures::fixture_users())
            .await
            .expect("seed fixtures");

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 0,
            max_connections: 1,
            reset_on_start: true,
        });
        Self::from_parts(Arc::new(repo), config)
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<Arc<dyn UserRepository>> {
    if config.is_sqlite() {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .context("parse sqlite DATABASE_URL")?;
        if config.is_in_memory_sqlite() {
            let repo = SqliteUserRepository::in_memory_with(options)
                .await
                .context("open in-memory sqlite")?;
            tracing::warn!("using in-memory sqlite; data is lost on shutdown");
            return Ok(Arc::new(repo));
        }
        let repo = SqliteUserRepository::open(options, config.max_connections)
            .await
            .context("connect to sqlite")?;
        tracing::info!("using sqlite user repository");
        Ok(Arc::new(repo))
    } else {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        tracing::info!("using postgres user repository");
        Ok(Arc::new(PgUserRepository::new(db)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::{NewUser, UserColumn, UserOrder};

    fn config_for(url: String) -> AppConfig {
        AppConfig::from_lookup(move |key| (key == "DATABASE_URL").then(|| url.clone()))
            .expect("config")
    }

    #[tokio::test]
    async fn sqlite_file_is_created_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("users.db");
        assert!(!path.exists());

        let users = connect(&config_for(format!("sqlite:{}", path.display())))
            .await
            .expect("connect to fresh sqlite file");
        users.sync(false).await.expect("sync");
        let created = users
            .create(NewUser::new("test1", "test1@gmail.com", "pass1"))
            .await
            .expect("create");

        assert_eq!(created.id, 1);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn in_memory_url_with_params_keeps_one_database() {
        let users = connect(&config_for("sqlite::memory:?cache=shared".into()))
            .await
            .expect("connect");
        users.sync(true).await.expect("sync");
        users
            .bulk_create(&crate::users::fixtures::fixture_users())
            .await
            .expect("seed");

        // Separate calls must see the same table.
        assert_eq!(users.find_all(None).await.unwrap().len(), 4);
        let sorted = users
            .find_all(Some(UserOrder::asc(UserColumn::Username)))
            .await
            .unwrap();
        assert_eq!(sorted[0].username, "abc");
    }

    #[tokio::test]
    async fn sync_schema_resets_when_configured() {
        let state = AppState::seeded_for_tests().await;
        state.sync_schema().await.expect("sync schema");
        assert!(state.users.find_all(None).await.unwrap().is_empty());
    }
}
