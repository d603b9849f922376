use crate::domain::drink_model::DrinkRow;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Result;
use std::str::FromStr;

const CREATE_DRINKS_TABLE: &str = "CREATE TABLE IF NOT EXISTS drinks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL UNIQUE,
    recipe TEXT NOT NULL
)";

const SEED_TITLE: &str = "water";
const SEED_RECIPE: &str = r#"[{"name":"water","color":"blue","parts":1}]"#;

#[derive(Clone)]
pub struct SqliteStateImpl {
    pool: SqlitePool,
}

impl SqliteStateImpl {
    pub async fn new(conn_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(conn_url)?.create_if_missing(true);

        // every connection to an in-memory database sees its own database
        let max_connections = if conn_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }
}

impl SqliteStateImpl {
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_DRINKS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    // single seed row after the reset
    pub async fn drop_and_create_all(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DROP TABLE IF EXISTS drinks")
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_DRINKS_TABLE).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO drinks (title, recipe) VALUES (?, ?)")
            .bind(SEED_TITLE)
            .bind(SEED_RECIPE)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }
}

impl SqliteStateImpl {
    pub async fn find_all_drinks(&self) -> Result<Vec<DrinkRow>> {
        sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_drink_by_id(&self, id: i64) -> Result<Option<DrinkRow>> {
        sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert_drink(&self, title: &str, recipe: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO drinks (title, recipe) VALUES (?, ?)")
            .bind(title)
            .bind(recipe)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_drink(&self, row: &DrinkRow) -> Result<()> {
        sqlx::query("UPDATE drinks SET title = ?, recipe = ? WHERE id = ?")
            .bind(&row.title)
            .bind(&row.recipe)
            .bind(row.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_drink_by_id(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
