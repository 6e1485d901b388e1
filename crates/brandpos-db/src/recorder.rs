//! # Sale Recorder
//!
//! Validates and persists sales, decrementing catalog stock in the same
//! transaction.
//!
//! ## Single Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record(request)                                                        │
//! │       │                                                                 │
//! │       ├── check_payment ─────────────────────────► Rejected(Payment)   │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │       ├── SELECT brand ── none ──────────────────► Rejected(NotFound)  │
//! │       ├── check_stock ───────────────────────────► Rejected(Stock)     │
//! │       ├── into_line (schema rules) ──────────────► Rejected(Invalid)   │
//! │       ├── UPDATE stock = stock - q                                     │
//! │       │     WHERE stock >= q ── 0 rows ──────────► Rejected(Stock)     │
//! │       ├── INSERT sale                                                  │
//! │  COMMIT ─────────────────────── failure ────────► Aborted             │
//! │                                                                         │
//! │  Any early return drops the transaction, which rolls it back.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional UPDATE is what stops two concurrent sales of the last
//! unit from both committing: the loser sees zero rows affected.
//!
//! ## Bulk Sale
//! ```text
//! items:    [ 0 ✓ ] [ 1 ✓ ] [ 2 ✗ ] [ 3 · ]
//!              │       │       │       └── never attempted
//!              │       │       └────────── reported: index 2 + kind
//!              └───────┴────────────────── committed, stay committed
//! ```
//! Each item runs the single-sale path in its own transaction, in order,
//! so later items see the stock taken by earlier ones.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{DbError, RecordError};
use crate::repository::brand::{decrement_stock, fetch_brand};
use crate::repository::sale::insert_sale;
use brandpos_core::checkout::{split_cart, Cart};
use brandpos_core::validation::SaleRequest;
use brandpos_core::{
    BulkFailure, BulkOutcome, CoreError, CoreResult, RecordedSale, Sale, StockChange,
    ValidationError, MAX_BULK_ITEMS,
};

/// Message returned for a failed write. Internal details are only logged.
pub const ABORTED_MESSAGE: &str = "Failed to record sale";

/// Records single and bulk sales.
#[derive(Debug, Clone)]
pub struct SaleRecorder {
    pool: SqlitePool,
}

impl SaleRecorder {
    /// Creates a new SaleRecorder.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRecorder { pool }
    }

    // =========================================================================
    // Single sale
    // =========================================================================

    /// Records one sale from its raw JSON body.
    pub async fn record_json(&self, body: &Value) -> Result<RecordedSale, RecordError> {
        let request = SaleRequest::from_json(body).inspect_err(|err| {
            warn!(error = %err, "Sale rejected");
        })?;
        self.record(request).await
    }

    /// Records one sale dated now.
    pub async fn record(&self, request: SaleRequest) -> Result<RecordedSale, RecordError> {
        self.record_at(request, Utc::now()).await
    }

    /// Records one sale with an explicit sale date (seeding, back-office entry).
    pub async fn record_at(
        &self,
        request: SaleRequest,
        date: DateTime<Utc>,
    ) -> Result<RecordedSale, RecordError> {
        let brand_id = request.brand_id.clone();

        match self.try_record(request, date).await {
            Ok(recorded) => {
                info!(
                    sale_id = %recorded.sale.id,
                    brand_id = %brand_id,
                    quantity = recorded.sale.quantity,
                    total_cents = recorded.sale.total_amount_cents,
                    new_stock = recorded.inventory_update.new_stock,
                    "Sale recorded"
                );
                Ok(recorded)
            }
            Err(RecordError::Rejected(err)) => {
                warn!(brand_id = %brand_id, kind = ?err.kind(), error = %err, "Sale rejected");
                Err(RecordError::Rejected(err))
            }
            Err(RecordError::Aborted(err)) => {
                error!(brand_id = %brand_id, error = %err, "Sale transaction aborted");
                Err(RecordError::Aborted(err))
            }
        }
    }

    async fn try_record(
        &self,
        request: SaleRequest,
        date: DateTime<Utc>,
    ) -> Result<RecordedSale, RecordError> {
        request.check_payment()?;

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let brand = fetch_brand(&mut *tx, &request.brand_id)
            .await?
            .ok_or_else(|| CoreError::BrandNotFound(request.brand_id.clone()))?;

        request.check_stock(&brand)?;
        let line = request.into_line()?;

        let now = Utc::now();
        if !decrement_stock(&mut *tx, &brand.id, line.quantity, now).await? {
            return Err(CoreError::InsufficientStock {
                brand: brand.name.clone(),
                available: brand.stock,
                requested: line.quantity,
            }
            .into());
        }

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            brand_id: brand.id.clone(),
            quantity: line.quantity,
            total_amount_cents: line.total_amount.cents(),
            amount_received_cents: line.amount_received.cents(),
            change_given_cents: line.change_given().cents(),
            sale_type: line.sale_type(),
            date,
            created_at: now,
            updated_at: now,
        };
        insert_sale(&mut *tx, &sale).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        let inventory_update = StockChange {
            previous_stock: brand.stock,
            new_stock: brand.stock - line.quantity,
        };
        let mut summary = brand.summary();
        summary.stock = inventory_update.new_stock;

        Ok(RecordedSale {
            sale,
            brand: summary,
            inventory_update,
        })
    }

    // =========================================================================
    // Bulk sale
    // =========================================================================

    /// Records an ordered list of raw sale items, stopping at the first
    /// failure.
    ///
    /// ## Errors
    /// Only an empty or oversized list is an error; per-item failures are
    /// reported inside the [`BulkOutcome`].
    pub async fn record_bulk(&self, items: &[Value]) -> Result<BulkOutcome, RecordError> {
        check_bulk_size(items.len())?;
        Ok(self
            .record_sequence(items.iter().map(SaleRequest::from_json))
            .await)
    }

    /// Splits a cart into lines and records them as a bulk sale.
    pub async fn record_checkout(&self, cart: &Cart) -> Result<BulkOutcome, RecordError> {
        let requests = split_cart(cart).inspect_err(|err| {
            warn!(error = %err, "Checkout rejected");
        })?;
        Ok(self.record_sequence(requests.into_iter().map(Ok)).await)
    }

    async fn record_sequence<I>(&self, items: I) -> BulkOutcome
    where
        I: IntoIterator<Item = CoreResult<SaleRequest>>,
    {
        let mut outcome = BulkOutcome::default();

        for (index, item) in items.into_iter().enumerate() {
            let result = match item {
                Ok(request) => self.record(request).await,
                Err(err) => Err(RecordError::Rejected(err)),
            };

            match result {
                Ok(recorded) => outcome.sales.push(recorded),
                Err(err) => {
                    warn!(index, kind = ?err.kind(), "Bulk sale stopped");
                    outcome.failure = Some(BulkFailure {
                        index,
                        kind: err.kind(),
                        message: public_message(&err),
                    });
                    break;
                }
            }
        }

        info!(
            recorded = outcome.sales.len(),
            complete = outcome.is_complete(),
            "Bulk sale finished"
        );
        outcome
    }
}

fn check_bulk_size(len: usize) -> Result<(), RecordError> {
    if len == 0 {
        return Err(ValidationError::Required {
            field: "sales".to_string(),
        }
        .into());
    }
    if len > MAX_BULK_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "sales".to_string(),
            min: 1,
            max: MAX_BULK_ITEMS as i64,
        }
        .into());
    }
    Ok(())
}

/// Caller-facing message for a failure.
pub fn public_message(err: &RecordError) -> String {
    match err {
        RecordError::Rejected(err) => err.to_string(),
        RecordError::Aborted(_) => ABORTED_MESSAGE.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use brandpos_core::checkout::CartLine;
    use brandpos_core::validation::NewBrand;
    use brandpos_core::{FailureKind, Money, SaleType};
    use serde_json::json;

    async fn setup(stock: i64) -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let brand = db
            .brands()
            .insert(&NewBrand {
                name: "Marlboro".to_string(),
                price: Money::from_cents(1000),
                stock,
            })
            .await
            .unwrap();
        (db, brand.id)
    }

    fn request(brand_id: &str, quantity: i64, total: i64, received: i64) -> SaleRequest {
        SaleRequest::new(
            brand_id,
            quantity,
            Money::from_cents(total),
            Money::from_cents(received),
        )
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.brands().get_by_id(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_successful_sales_decrement_stock() {
        let (db, brand_id) = setup(10).await;
        let recorder = db.recorder();

        for quantity in [1, 3, 2] {
            recorder
                .record(request(&brand_id, quantity, quantity * 1000, quantity * 1000))
                .await
                .unwrap();
        }

        assert_eq!(stock_of(&db, &brand_id).await, 10 - 6);
        assert_eq!(db.sales().count_for_brand(&brand_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_recorded_sale_fields() {
        let (db, brand_id) = setup(5).await;

        let recorded = db
            .recorder()
            .record(request(&brand_id, 2, 2000, 2500))
            .await
            .unwrap();

        assert_eq!(recorded.sale.sale_type, SaleType::Multi);
        assert_eq!(recorded.sale.change_given_cents, 500);
        assert_eq!(recorded.inventory_update.previous_stock, 5);
        assert_eq!(recorded.inventory_update.new_stock, 3);
        assert_eq!(recorded.brand.stock, 3);

        let stored = db.sales().get_by_id(&recorded.sale.id).await.unwrap().unwrap();
        assert_eq!(stored.sale, recorded.sale);
        assert_eq!(stored.brand_name(), "Marlboro");
    }

    #[tokio::test]
    async fn test_underpayment_writes_nothing() {
        let (db, brand_id) = setup(5).await;

        let err = db
            .recorder()
            .record(request(&brand_id, 1, 1000, 998))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::InsufficientPayment);
        assert_eq!(stock_of(&db, &brand_id).await, 5);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let (db, brand_id) = setup(2).await;

        let err = db
            .recorder()
            .record(request(&brand_id, 3, 3000, 3000))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::InsufficientStock);
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Marlboro (Available: 2, Requested: 3)"
        );
        assert_eq!(stock_of(&db, &brand_id).await, 2);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_brand() {
        let (db, _) = setup(2).await;

        let err = db
            .recorder()
            .record(request("no-such-brand", 1, 100, 100))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::BrandNotFound);
    }

    #[tokio::test]
    async fn test_check_order_payment_before_brand() {
        let (db, _) = setup(2).await;

        let err = db
            .recorder()
            .record(request("no-such-brand", 1, 100, 50))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::InsufficientPayment);
    }

    #[tokio::test]
    async fn test_schema_rules_after_stock() {
        let (db, brand_id) = setup(2).await;
        let recorder = db.recorder();

        let fractional = recorder
            .record_json(&json!({
                "brandId": brand_id,
                "quantity": 1.5,
                "totalAmount": 15.0,
                "amountReceived": 15.0
            }))
            .await
            .unwrap_err();
        assert_eq!(fractional.kind(), FailureKind::ValidationFailed);

        // Stock is checked before the quantity shape.
        let too_many = recorder
            .record_json(&json!({
                "brandId": brand_id,
                "quantity": 2.5,
                "totalAmount": 25.0,
                "amountReceived": 25.0
            }))
            .await
            .unwrap_err();
        assert_eq!(too_many.kind(), FailureKind::InsufficientStock);

        let free = recorder
            .record(request(&brand_id, 1, 0, 0))
            .await
            .unwrap_err();
        assert_eq!(free.kind(), FailureKind::ValidationFailed);

        assert_eq!(stock_of(&db, &brand_id).await, 2);
    }

    #[tokio::test]
    async fn test_missing_fields_from_json() {
        let (db, _) = setup(2).await;

        let err = db
            .recorder()
            .record_json(&json!({ "quantity": 1 }))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::MissingFields);
        assert_eq!(
            err.to_string(),
            "Missing required fields: brandId, totalAmount, amountReceived"
        );
    }

    /// File database with several connections, so the sales really
    /// contend for the write lock.
    async fn setup_shared(stock: i64) -> (tempfile::TempDir, Database, String) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("shop.db")).max_connections(4))
            .await
            .unwrap();
        let brand = db
            .brands()
            .insert(&NewBrand {
                name: "Marlboro".to_string(),
                price: Money::from_cents(1000),
                stock,
            })
            .await
            .unwrap();
        (dir, db, brand.id)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_of_last_unit() {
        let (_dir, db, brand_id) = setup_shared(1).await;

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let recorder = db.recorder();
                let req = request(&brand_id, 1, 1000, 1000);
                tokio::spawn(async move { recorder.record(req).await })
            })
            .collect();

        let mut successes = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert!(matches!(
                    e.kind(),
                    FailureKind::InsufficientStock | FailureKind::TransactionAborted
                )),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(stock_of(&db, &brand_id).await, 0);
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_contended_sales_never_oversell() {
        let (_dir, db, brand_id) = setup_shared(3).await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let recorder = db.recorder();
                let req = request(&brand_id, 1, 1000, 1000);
                tokio::spawn(async move { recorder.record(req).await })
            })
            .collect();

        let mut successes = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert!((1..=3).contains(&successes));
        assert_eq!(stock_of(&db, &brand_id).await, 3 - successes);
        assert_eq!(db.sales().count().await.unwrap(), successes);
    }

    #[tokio::test]
    async fn test_bulk_stops_at_first_failure() {
        let (db, brand_id) = setup(10).await;

        let items = vec![
            json!({ "brandId": brand_id, "quantity": 1, "totalAmount": 10, "amountReceived": 10 }),
            json!({ "brandId": brand_id, "quantity": 2, "totalAmount": 20, "amountReceived": 20 }),
            json!({ "brandId": brand_id, "quantity": 1, "totalAmount": 10, "amountReceived": 5 }),
            json!({ "brandId": brand_id, "quantity": 1, "totalAmount": 10, "amountReceived": 10 }),
        ];

        let outcome = db.recorder().record_bulk(&items).await.unwrap();

        assert_eq!(outcome.sales.len(), 2);
        let failure = outcome.failure.unwrap();
        assert_eq!(failure.index, 2);
        assert_eq!(failure.kind, FailureKind::InsufficientPayment);

        assert_eq!(db.sales().count().await.unwrap(), 2);
        assert_eq!(stock_of(&db, &brand_id).await, 7);
    }

    #[tokio::test]
    async fn test_bulk_sees_earlier_stock_decrements() {
        let (db, brand_id) = setup(3).await;

        let items = vec![
            json!({ "brandId": brand_id, "quantity": 2, "totalAmount": 20, "amountReceived": 20 }),
            json!({ "brandId": brand_id, "quantity": 2, "totalAmount": 20, "amountReceived": 20 }),
        ];

        let outcome = db.recorder().record_bulk(&items).await.unwrap();

        assert_eq!(outcome.sales.len(), 1);
        let failure = outcome.failure.unwrap();
        assert_eq!(failure.index, 1);
        assert_eq!(failure.kind, FailureKind::InsufficientStock);
        assert_eq!(stock_of(&db, &brand_id).await, 1);
    }

    #[tokio::test]
    async fn test_bulk_rounds_amounts_per_item() {
        let (db, brand_id) = setup(5).await;

        let items = vec![json!({
            "brandId": brand_id,
            "quantity": 3,
            "totalAmount": 12.1 * 3.0,
            "amountReceived": 36.3
        })];

        let outcome = db.recorder().record_bulk(&items).await.unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.sales[0].sale.total_amount_cents, 3630);
        assert_eq!(outcome.sales[0].sale.change_given_cents, 0);
    }

    #[tokio::test]
    async fn test_bulk_missing_fields_reported_at_index() {
        let (db, brand_id) = setup(5).await;

        let items = vec![
            json!({ "brandId": brand_id, "quantity": 1, "totalAmount": 10, "amountReceived": 10 }),
            json!({ "brandId": brand_id }),
        ];

        let outcome = db.recorder().record_bulk(&items).await.unwrap();
        let failure = outcome.failure.unwrap();
        assert_eq!(failure.index, 1);
        assert_eq!(failure.kind, FailureKind::MissingFields);
        assert_eq!(outcome.sales.len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_rejects_empty_list() {
        let (db, _) = setup(5).await;
        let err = db.recorder().record_bulk(&[]).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::ValidationFailed);
    }

    #[tokio::test]
    async fn test_checkout_records_every_line() {
        let (db, brand_id) = setup(5).await;
        let other = db
            .brands()
            .insert(&NewBrand {
                name: "Dunhill".to_string(),
                price: Money::from_cents(1000),
                stock: 5,
            })
            .await
            .unwrap();

        let cart = Cart {
            items: vec![
                CartLine {
                    brand_id: brand_id.clone(),
                    quantity: 2,
                    unit_price: 10.0,
                },
                CartLine {
                    brand_id: other.id.clone(),
                    quantity: 1,
                    unit_price: 10.0,
                },
            ],
            amount_received: Some(40.0),
        };

        let outcome = db.recorder().record_checkout(&cart).await.unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.sales[0].sale.amount_received_cents, 2667);
        assert_eq!(outcome.sales[1].sale.amount_received_cents, 1333);
        assert_eq!(outcome.sales[0].sale.sale_type, SaleType::Multi);
        assert_eq!(outcome.sales[1].sale.sale_type, SaleType::Single);
        assert_eq!(stock_of(&db, &brand_id).await, 3);
        assert_eq!(stock_of(&db, &other.id).await, 4);
    }

    #[tokio::test]
    async fn test_deleted_brand_sales_remain() {
        let (db, brand_id) = setup(5).await;
        let recorded = db
            .recorder()
            .record(request(&brand_id, 1, 1000, 1000))
            .await
            .unwrap();

        db.brands().delete(&brand_id).await.unwrap();

        let stored = db.sales().get_by_id(&recorded.sale.id).await.unwrap().unwrap();
        assert!(stored.brand.is_none());
        assert_eq!(stored.brand_name(), "Unknown");
    }
}
