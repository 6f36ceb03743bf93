/*
 * Responsibility
 * - drink テーブル向けの store 抽象 (DrinkStore) と SQLx 実装
 * - 一覧は常に id 昇順
 * - recipe は JSON 文字列として TEXT カラムに保存し、読み出し時に復元する
 * - DB エラーは RepoError (NotFound / Constraint / Db) に分類して返す
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::models::{Drink, Ingredient, Recipe};
use crate::repos::error::{RepoError, RepoResult};

/// Handler から見える store の契約。
///
/// 実装は Clone/共有前提 (`Arc<dyn DrinkStore>` で AppState に載せる)。
#[async_trait]
pub trait DrinkStore: Send + Sync + 'static {
    fn backend_name(&self) -> &'static str;

    // All drinks, ascending by id.
    async fn list(&self) -> RepoResult<Vec<Drink>>;

    async fn get(&self, id: i64) -> RepoResult<Option<Drink>>;

    async fn create(&self, title: &str, recipe: &Recipe) -> RepoResult<Drink>;

    // Partial update:
    // - None: do not update
    // - Some(v): set v
    // Returns NotFound when the row disappeared between lookup and update.
    async fn update(
        &self,
        id: i64,
        title: Option<&str>,
        recipe: Option<&Recipe>,
    ) -> RepoResult<Drink>;

    // Returns false when nothing was deleted.
    async fn delete(&self, id: i64) -> RepoResult<bool>;

    /// Drop every drink and insert the seed drink.
    async fn reset_with_seed(&self) -> RepoResult<Drink>;
}

pub const SEED_TITLE: &str = "water";

pub fn seed_recipe() -> Recipe {
    Recipe::new(vec![Ingredient {
        name: "water".to_string(),
        color: "blue".to_string(),
        quantity: serde_json::Number::from(1),
    }])
}

#[derive(Debug, FromRow)]
struct DrinkRow {
    id: i64,
    title: String,
    recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = RepoError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        let recipe = Recipe::from_stored(&row.recipe).map_err(|e| {
            tracing::error!(id = row.id, error = %e, "stored recipe could not be decoded");
            RepoError::Serialization(e)
        })?;

        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PgDrinkStore {
    pool: PgPool,
}

impl PgDrinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn list(&self) -> RepoResult<Vec<Drink>> {
        let rows = sqlx::query_as::<_, DrinkRow>(
            r#"
            SELECT id, title, recipe
            FROM drink
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        rows.into_iter().map(Drink::try_from).collect()
    }

    async fn get(&self, id: i64) -> RepoResult<Option<Drink>> {
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            SELECT id, title, recipe
            FROM drink
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        row.map(Drink::try_from).transpose()
    }

    async fn create(&self, title: &str, recipe: &Recipe) -> RepoResult<Drink> {
        let stored = recipe.to_stored()?;

        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            INSERT INTO drink (title, recipe)
            VALUES ($1, $2)
            RETURNING id, title, recipe
            "#,
        )
        .bind(title)
        .bind(stored)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Drink::try_from(row)
    }

    async fn update(
        &self,
        id: i64,
        title: Option<&str>,
        recipe: Option<&Recipe>,
    ) -> RepoResult<Drink> {
        let stored = recipe.map(Recipe::to_stored).transpose()?;

        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            UPDATE drink
            SET
                title = COALESCE($2, title),
                recipe = COALESCE($3, recipe)
            WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(stored)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?
        .ok_or(RepoError::NotFound)?;

        Drink::try_from(row)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM drink
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    async fn reset_with_seed(&self) -> RepoResult<Drink> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from_sqlx)?;

        sqlx::query("DELETE FROM drink")
            .execute(&mut *tx)
            .await
            .map_err(RepoError::from_sqlx)?;

        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            INSERT INTO drink (title, recipe)
            VALUES ($1, $2)
            RETURNING id, title, recipe
            "#,
        )
        .bind(SEED_TITLE)
        .bind(seed_recipe().to_stored()?)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepoError::from_sqlx)?;

        tx.commit().await.map_err(RepoError::from_sqlx)?;

        Drink::try_from(row)
    }
}
