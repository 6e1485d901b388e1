//! # Sale Repository
//!
//! Read access to recorded sales. Writes go through the
//! [`SaleRecorder`](crate::recorder::SaleRecorder).
//!
//! ## Brand Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sales s LEFT JOIN brands b ON b.id = s.brand_id                       │
//! │                                                                         │
//! │  brand exists   → SaleView { brand: Some(BrandSummary) }               │
//! │  brand deleted  → SaleView { brand: None }  → reports as "Unknown"     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use brandpos_core::report::ReportFilter;
use brandpos_core::validation::Page;
use brandpos_core::{page_count, BrandSummary, Sale, SaleType, SaleView, SalesPage};

const SELECT_SALE_VIEW: &str = r#"
    SELECT
        s.id,
        s.brand_id,
        s.quantity,
        s.total_amount_cents,
        s.amount_received_cents,
        s.change_given_cents,
        s.sale_type,
        s.date,
        s.created_at,
        s.updated_at,
        b.name AS brand_name,
        b.price_cents AS brand_price_cents,
        b.stock AS brand_stock
    FROM sales s
    LEFT JOIN brands b ON b.id = s.brand_id
"#;

/// Joined row; brand columns are NULL when the brand is gone.
#[derive(Debug, sqlx::FromRow)]
struct SaleViewRow {
    #[sqlx(flatten)]
    sale: Sale,
    brand_name: Option<String>,
    brand_price_cents: Option<i64>,
    brand_stock: Option<i64>,
}

impl From<SaleViewRow> for SaleView {
    fn from(row: SaleViewRow) -> Self {
        let brand = row.brand_name.map(|name| BrandSummary {
            id: row.sale.brand_id.clone(),
            name,
            price_cents: row.brand_price_cents.unwrap_or_default(),
            stock: row.brand_stock.unwrap_or_default(),
        });
        SaleView {
            sale: row.sale,
            brand,
        }
    }
}

/// Repository for sale queries.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale with its brand.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleView>> {
        let sql = format!("{SELECT_SALE_VIEW} WHERE s.id = ?1");
        let row = sqlx::query_as::<_, SaleViewRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(SaleView::from))
    }

    /// Counts all sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts the sales referencing one brand.
    pub async fn count_for_brand(&self, brand_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE brand_id = ?1")
            .bind(brand_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// One page of sales, newest first.
    ///
    /// ## Pagination
    /// ```text
    /// 45 sales, page size 20
    /// page 1 → rows  1-20   totalPages = ceil(45 / 20) = 3
    /// page 2 → rows 21-40
    /// page 3 → rows 41-45
    /// page 4 → []           (past the end is empty, not an error)
    /// ```
    pub async fn list_page(&self, page: Page) -> DbResult<SalesPage> {
        debug!(page = page.number, size = page.size, "Listing sales");

        let total = self.count().await?;

        let sql = format!("{SELECT_SALE_VIEW} ORDER BY s.date DESC, s.id LIMIT ?1 OFFSET ?2");
        let rows = sqlx::query_as::<_, SaleViewRow>(&sql)
            .bind(page.size as i64)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(SalesPage {
            sales: rows.into_iter().map(SaleView::from).collect(),
            total_pages: page_count(total.max(0) as u64, page.size),
            current_page: page.number,
        })
    }

    /// Sales selected by a report filter, oldest first.
    pub async fn find(&self, filter: &ReportFilter) -> DbResult<Vec<SaleView>> {
        debug!(
            period = filter.period.as_str(),
            start = %filter.range.start,
            end = %filter.range.end,
            sale_type = ?filter.sale_type,
            brand_id = ?filter.brand_id,
            "Selecting sales for report"
        );

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_SALE_VIEW);
        query
            .push(" WHERE s.date >= ")
            .push_bind(filter.range.start)
            .push(" AND s.date <= ")
            .push_bind(filter.range.end);

        if let Some(token) = &filter.sale_type {
            // An unrecognized token is bound as-is and selects nothing.
            let sale_type = SaleType::parse(token)
                .map(|t| t.as_str().to_string())
                .unwrap_or_else(|| token.clone());
            query.push(" AND s.sale_type = ").push_bind(sale_type);
        }
        if let Some(brand_id) = &filter.brand_id {
            query.push(" AND s.brand_id = ").push_bind(brand_id.clone());
        }
        query.push(" ORDER BY s.date ASC, s.id");

        let rows = query
            .build_query_as::<SaleViewRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(SaleView::from).collect())
    }
}

// =============================================================================
// Transaction-scoped statements
// =============================================================================

/// Inserts a sale row on any executor.
pub(crate) async fn insert_sale<'e>(
    executor: impl SqliteExecutor<'e>,
    sale: &Sale,
) -> DbResult<()> {
    debug!(
        id = %sale.id,
        brand_id = %sale.brand_id,
        quantity = sale.quantity,
        "Inserting sale"
    );

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, brand_id, quantity,
            total_amount_cents, amount_received_cents, change_given_cents,
            sale_type, date, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.brand_id)
    .bind(sale.quantity)
    .bind(sale.total_amount_cents)
    .bind(sale.amount_received_cents)
    .bind(sale.change_given_cents)
    .bind(sale.sale_type)
    .bind(sale.date)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
