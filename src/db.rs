use std::time::Duration;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::Settings;
use crate::errors::AppError;

#[tracing::instrument(name = "init_db", skip(settings), fields(database_url = %settings.database_url))]
pub async fn init_db(settings: &Settings) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(settings.db_max_connections)
        .connect(&settings.database_url)
        .await?;

    migrate(&pool).await?;

    tracing::info!("Database ready");
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn timeout_query<T, F>(duration: Duration, fut: F) -> Result<T, AppError>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    timeout_query_with(duration, fut, AppError::from).await
}

/// [`timeout_query`] with a caller-chosen mapping for database errors, for
/// statements whose constraint failures mean something to the caller.
pub async fn timeout_query_with<T, F, M>(duration: Duration, fut: F, map_err: M) -> Result<T, AppError>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
    M: FnOnce(sqlx::Error) -> AppError,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(Ok(res)) => Ok(res),
        Ok(Err(e)) => Err(map_err(e)),
        Err(_) => {
            tracing::error!("Query timeout after {:?}", duration);
            Err(AppError::Database(anyhow::anyhow!(
                "Query timeout after {:?}",
                duration
            )))
        }
    }
}

/// Single-connection in-memory database with the schema applied.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    migrate(&pool).await.expect("Failed to run migrations");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slow_query_becomes_a_database_error() {
        let result = timeout_query(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, sqlx::Error>(())
        })
        .await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn caller_mapping_sees_the_database_error() {
        let result: Result<(), AppError> = timeout_query_with(
            Duration::from_secs(1),
            async { Err(sqlx::Error::PoolTimedOut) },
            |e| AppError::Validation(e.to_string()),
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
