//! # Brand Repository
//!
//! Database operations for the catalog.
//!
//! ## Stock Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Who writes brands.stock                                               │
//! │                                                                         │
//! │  insert / restock / update(stock)  → set absolute value,               │
//! │                                      last_restocked = now              │
//! │                                                                         │
//! │  decrement_stock (Sale Recorder)   → stock = stock - q                 │
//! │                                      WHERE stock >= q                  │
//! │                                      (0 rows ⇒ not enough stock)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use brandpos_core::validation::{BrandUpdate, NewBrand};
use brandpos_core::Brand;

const SELECT_BRAND: &str = r#"
    SELECT id, name, price_cents, stock, last_restocked, created_at, updated_at
    FROM brands
"#;

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct BrandRepository {
    pool: SqlitePool,
}

impl BrandRepository {
    /// Creates a new BrandRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BrandRepository { pool }
    }

    /// Lists every brand, alphabetically.
    pub async fn list(&self) -> DbResult<Vec<Brand>> {
        let sql = format!("{SELECT_BRAND} ORDER BY name COLLATE NOCASE, id");
        let brands = sqlx::query_as::<_, Brand>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = brands.len(), "Listed brands");
        Ok(brands)
    }

    /// Gets a brand by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Brand>> {
        fetch_brand(&self.pool, id).await
    }

    /// Inserts a new brand. `last_restocked` is set to now.
    pub async fn insert(&self, brand: &NewBrand) -> DbResult<Brand> {
        let now = Utc::now();
        let brand = Brand {
            id: Uuid::new_v4().to_string(),
            name: brand.name.clone(),
            price_cents: brand.price.cents(),
            stock: brand.stock,
            last_restocked: now,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %brand.id, name = %brand.name, stock = brand.stock, "Inserting brand");

        sqlx::query(
            r#"
            INSERT INTO brands (
                id, name, price_cents, stock,
                last_restocked, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&brand.id)
        .bind(&brand.name)
        .bind(brand.price_cents)
        .bind(brand.stock)
        .bind(brand.last_restocked)
        .bind(brand.created_at)
        .bind(brand.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(brand)
    }

    /// Applies a partial update. Setting stock also moves `last_restocked`.
    pub async fn update(&self, id: &str, update: &BrandUpdate) -> DbResult<Brand> {
        debug!(id = %id, restocks = update.restocks(), "Updating brand");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE brands
            SET
                name = COALESCE(?1, name),
                price_cents = COALESCE(?2, price_cents),
                stock = COALESCE(?3, stock),
                last_restocked = CASE WHEN ?3 IS NULL THEN last_restocked ELSE ?4 END,
                updated_at = ?4
            WHERE id = ?5
            "#,
        )
        .bind(update.name.as_deref())
        .bind(update.price.map(|p| p.cents()))
        .bind(update.stock)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Brand", id));
        }

        self.require(id).await
    }

    /// Sets the stock level and `last_restocked`.
    pub async fn restock(&self, id: &str, stock: i64) -> DbResult<Brand> {
        self.update(
            id,
            &BrandUpdate {
                stock: Some(stock),
                ..Default::default()
            },
        )
        .await
    }

    /// Deletes a brand. Its sales stay and report as "Unknown".
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting brand");

        let result = sqlx::query("DELETE FROM brands WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Brand", id));
        }

        Ok(())
    }

    /// Counts brands (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM brands")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn require(&self, id: &str) -> DbResult<Brand> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Brand", id))
    }
}

// =============================================================================
// Transaction-scoped statements
// =============================================================================

/// Looks up a brand on any executor.
pub(crate) async fn fetch_brand<'e>(
    executor: impl SqliteExecutor<'e>,
    id: &str,
) -> DbResult<Option<Brand>> {
    let sql = format!("{SELECT_BRAND} WHERE id = ?1");
    let brand = sqlx::query_as::<_, Brand>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(brand)
}

/// Conditionally takes `quantity` units from stock.
///
/// Returns `false` when the brand does not hold enough (or no longer
/// exists), in which case nothing was written.
pub(crate) async fn decrement_stock<'e>(
    executor: impl SqliteExecutor<'e>,
    id: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE brands
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        "#,
    )
    .bind(id)
    .bind(quantity)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use brandpos_core::validation::{BrandUpdate, NewBrand};
    use brandpos_core::Money;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_brand(name: &str, price: i64, stock: i64) -> NewBrand {
        NewBrand {
            name: name.to_string(),
            price: Money::from_cents(price),
            stock,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = db().await;
        let brands = db.brands();

        brands.insert(&new_brand("Pall Mall", 850, 10)).await.unwrap();
        brands.insert(&new_brand("dunhill", 1200, 5)).await.unwrap();

        let list = brands.list().await.unwrap();
        let names: Vec<_> = list.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["dunhill", "Pall Mall"]);
        assert_eq!(brands.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_restock_moves_last_restocked() {
        let db = db().await;
        let brands = db.brands();
        let created = brands.insert(&new_brand("Marlboro", 1000, 3)).await.unwrap();

        let restocked = brands.restock(&created.id, 50).await.unwrap();
        assert_eq!(restocked.stock, 50);
        assert!(restocked.last_restocked >= created.last_restocked);
        assert_eq!(restocked.name, "Marlboro");
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let db = db().await;
        let brands = db.brands();
        let created = brands.insert(&new_brand("Marlboro", 1000, 3)).await.unwrap();

        let updated = brands
            .update(
                &created.id,
                &BrandUpdate {
                    price: Some(Money::from_cents(1100)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price_cents, 1100);
        assert_eq!(updated.stock, 3);
        assert_eq!(updated.last_restocked, created.last_restocked);
    }

    #[tokio::test]
    async fn test_unknown_brand_is_not_found() {
        let db = db().await;
        let brands = db.brands();

        assert!(brands.get_by_id("missing").await.unwrap().is_none());
        assert!(matches!(
            brands.restock("missing", 1).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            brands.delete("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_decrement_is_conditional() {
        let db = db().await;
        let created = db.brands().insert(&new_brand("Marlboro", 1000, 2)).await.unwrap();
        let now = chrono::Utc::now();

        assert!(super::decrement_stock(db.pool(), &created.id, 2, now).await.unwrap());
        assert!(!super::decrement_stock(db.pool(), &created.id, 1, now).await.unwrap());

        let brand = db.brands().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(brand.stock, 0);
    }
}
