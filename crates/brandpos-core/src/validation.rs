//! # Validation Module
//!
//! Boundary validation for Brand POS input.
//!
//! ## Sale Validation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Recording One Sale Line                             │
//! │                                                                         │
//! │  JSON body                                                              │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  SaleRequest::from_json ── absent / mistyped ──► MissingFields          │
//! │     │  (amounts rounded to cents here)                                  │
//! │     ▼                                                                   │
//! │  check_payment ─────────── received < total ───► InsufficientPayment    │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  brand lookup (db) ─────── no such brand ──────► BrandNotFound          │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  check_stock ───────────── stock < quantity ───► InsufficientStock      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  into_line ─────────────── fractional qty,      ► ValidationFailed      │
//! │     │                      qty < 1, total < 0.01,                       │
//! │     │                      amount above the cap                         │
//! │     ▼                                                                   │
//! │  SaleLine (ready to write)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The database steps live in `brandpos-db`; everything else is here so it
//! can be tested without I/O.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Brand, SaleType};
use crate::{
    DEFAULT_PAGE_SIZE, MAX_AMOUNT_CENTS, MAX_BRAND_NAME_LEN, MAX_PAGE_SIZE, MIN_SALE_TOTAL_CENTS,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Sale Input
// =============================================================================

/// Field names as they appear on the wire.
const BRAND_ID: &str = "brandId";
const QUANTITY: &str = "quantity";
const TOTAL_AMOUNT: &str = "totalAmount";
const AMOUNT_RECEIVED: &str = "amountReceived";

/// A sale line whose fields are present and correctly typed, but not yet
/// checked against the catalog or the schema rules.
///
/// `quantity` stays a raw number until [`SaleRequest::into_line`] because a
/// fractional quantity is a schema failure, reported after the stock check.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRequest {
    pub brand_id: String,
    pub quantity: f64,
    pub total_amount: Money,
    pub amount_received: Money,
}

impl SaleRequest {
    /// Builds a request from already-typed parts (checkout splitting, tests).
    pub fn new(
        brand_id: impl Into<String>,
        quantity: i64,
        total_amount: Money,
        amount_received: Money,
    ) -> Self {
        Self {
            brand_id: brand_id.into(),
            quantity: quantity as f64,
            total_amount,
            amount_received,
        }
    }

    /// Reads a sale line from a JSON object.
    ///
    /// Every field that is absent, `null`, or of the wrong type is listed in
    /// the resulting [`CoreError::MissingFields`]. Amounts are rounded to the
    /// nearest cent.
    pub fn from_json(value: &Value) -> CoreResult<Self> {
        let mut missing = Vec::new();

        let brand_id = value
            .get(BRAND_ID)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty());
        if brand_id.is_none() {
            missing.push(BRAND_ID);
        }

        let quantity = number_field(value, QUANTITY);
        if quantity.is_none() {
            missing.push(QUANTITY);
        }

        let total_amount = number_field(value, TOTAL_AMOUNT).and_then(Money::from_decimal);
        if total_amount.is_none() {
            missing.push(TOTAL_AMOUNT);
        }

        let amount_received = number_field(value, AMOUNT_RECEIVED).and_then(Money::from_decimal);
        if amount_received.is_none() {
            missing.push(AMOUNT_RECEIVED);
        }

        match (brand_id, quantity, total_amount, amount_received) {
            (Some(brand_id), Some(quantity), Some(total_amount), Some(amount_received)) => {
                Ok(Self {
                    brand_id: brand_id.to_string(),
                    quantity,
                    total_amount,
                    amount_received,
                })
            }
            _ => Err(CoreError::missing(missing)),
        }
    }

    /// Amount received must cover the amount charged.
    ///
    /// Both sides are already whole cents, so the comparison is exact.
    pub fn check_payment(&self) -> CoreResult<()> {
        if self.amount_received < self.total_amount {
            return Err(CoreError::InsufficientPayment {
                amount_received: self.amount_received,
                total_amount: self.total_amount,
            });
        }
        Ok(())
    }

    /// The brand must hold at least the requested quantity.
    pub fn check_stock(&self, brand: &Brand) -> CoreResult<()> {
        if (brand.stock as f64) < self.quantity {
            return Err(CoreError::InsufficientStock {
                brand: brand.name.clone(),
                available: brand.stock,
                requested: self.quantity.ceil() as i64,
            });
        }
        Ok(())
    }

    /// Applies the schema rules and produces a line ready to be written.
    pub fn into_line(self) -> CoreResult<SaleLine> {
        let quantity = validate_sale_quantity(self.quantity)?;
        validate_sale_total(self.total_amount)?;
        validate_amount(AMOUNT_RECEIVED, self.amount_received)?;

        Ok(SaleLine {
            brand_id: self.brand_id,
            quantity,
            total_amount: self.total_amount,
            amount_received: self.amount_received,
        })
    }
}

/// Reads a numeric field. Non-numbers count as missing.
fn number_field(value: &Value, field: &str) -> Option<f64> {
    value
        .get(field)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
}

/// A fully validated sale line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    pub brand_id: String,
    pub quantity: i64,
    pub total_amount: Money,
    pub amount_received: Money,
}

impl SaleLine {
    /// Classification derived from the quantity.
    pub fn sale_type(&self) -> SaleType {
        SaleType::for_quantity(self.quantity)
    }

    /// Change handed back to the customer.
    pub fn change_given(&self) -> Money {
        self.amount_received - self.total_amount
    }
}

/// Sale quantity must be a whole number of at least one.
pub fn validate_sale_quantity(quantity: f64) -> ValidationResult<i64> {
    if quantity.fract() != 0.0 {
        return Err(ValidationError::NotInteger {
            field: QUANTITY.to_string(),
            value: quantity.to_string(),
        });
    }
    if quantity < 1.0 {
        return Err(ValidationError::BelowMinimum {
            field: QUANTITY.to_string(),
            min: "1".to_string(),
        });
    }
    if quantity > i64::MAX as f64 {
        return Err(ValidationError::OutOfRange {
            field: QUANTITY.to_string(),
            min: 1,
            max: i64::MAX,
        });
    }
    Ok(quantity as i64)
}

/// A sale line must charge at least one cent and at most
/// [`MAX_AMOUNT_CENTS`].
pub fn validate_sale_total(total: Money) -> ValidationResult<()> {
    if total.cents() < MIN_SALE_TOTAL_CENTS {
        return Err(ValidationError::BelowMinimum {
            field: TOTAL_AMOUNT.to_string(),
            min: Money::from_cents(MIN_SALE_TOTAL_CENTS).to_decimal_string(),
        });
    }
    validate_amount(TOTAL_AMOUNT, total)
}

/// Upper bound shared by prices, line totals, and payments.
///
/// ## Example
/// ```rust
/// use brandpos_core::money::Money;
/// use brandpos_core::validation::validate_amount;
///
/// assert!(validate_amount("price", Money::from_cents(1_000_000_000_000)).is_ok());
/// assert!(validate_amount("price", Money::from_cents(1_000_000_000_001)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.cents() > MAX_AMOUNT_CENTS {
        return Err(ValidationError::AboveMaximum {
            field: field.to_string(),
            max: Money::from_cents(MAX_AMOUNT_CENTS).to_decimal_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Brand Input
// =============================================================================

/// Brand fields as submitted by the catalog screen.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BrandInput {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<f64>,
}

/// Partial update of a brand. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BrandPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<f64>,
}

/// A validated new brand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBrand {
    pub name: String,
    pub price: Money,
    pub stock: i64,
}

/// A validated brand update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandUpdate {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
}

impl BrandUpdate {
    /// Whether the update sets stock (and therefore `last_restocked`).
    pub fn restocks(&self) -> bool {
        self.stock.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock.is_none()
    }
}

impl BrandInput {
    /// Validates every field, all of which are required on creation.
    pub fn validate(self) -> CoreResult<NewBrand> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if self.stock.is_none() {
            missing.push("stock");
        }

        match (self.name, self.price, self.stock) {
            (Some(name), Some(price), Some(stock)) => Ok(NewBrand {
                name: validate_brand_name(&name)?,
                price: validate_brand_price(price)?,
                stock: validate_stock(stock)?,
            }),
            _ => Err(CoreError::missing(missing)),
        }
    }
}

impl BrandPatch {
    pub fn validate(self) -> ValidationResult<BrandUpdate> {
        Ok(BrandUpdate {
            name: self.name.as_deref().map(validate_brand_name).transpose()?,
            price: self.price.map(validate_brand_price).transpose()?,
            stock: self.stock.map(validate_stock).transpose()?,
        })
    }
}

/// Validates a brand name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_BRAND_NAME_LEN`] characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_brand_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_BRAND_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_BRAND_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a unit price. Zero is allowed.
pub fn validate_brand_price(price: f64) -> ValidationResult<Money> {
    let money = Money::from_decimal(price).ok_or_else(|| ValidationError::InvalidFormat {
        field: "price".to_string(),
        reason: "must be a finite number".to_string(),
    })?;

    if money.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }
    validate_amount("price", money)?;

    Ok(money)
}

/// Validates a stock level: a whole number, zero or more.
///
/// ## Example
/// ```rust
/// use brandpos_core::validation::validate_stock;
///
/// assert_eq!(validate_stock(12.0).unwrap(), 12);
/// assert!(validate_stock(-1.0).is_err());
/// assert!(validate_stock(2.5).is_err());
/// ```
pub fn validate_stock(stock: f64) -> ValidationResult<i64> {
    if !stock.is_finite() || stock.fract() != 0.0 {
        return Err(ValidationError::NotInteger {
            field: "stock".to_string(),
            value: stock.to_string(),
        });
    }

    if stock < 0.0 || stock > i64::MAX as f64 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(stock as i64)
}

// =============================================================================
// Credentials
// =============================================================================

/// Registration / login fields. Both must be non-empty.
pub fn validate_credentials<'a>(
    username: Option<&'a str>,
    password: Option<&'a str>,
) -> CoreResult<(&'a str, &'a str)> {
    let username = username.map(str::trim).filter(|u| !u.is_empty());
    let password = password.filter(|p| !p.is_empty());

    match (username, password) {
        (Some(u), Some(p)) => Ok((u, p)),
        (u, p) => {
            let mut missing = Vec::new();
            if u.is_none() {
                missing.push("username");
            }
            if p.is_none() {
                missing.push("password");
            }
            Err(CoreError::missing(missing))
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Query parameters of the sales listing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// A resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    /// Resolves query parameters. Page 0 or absent means page 1; the size is
    /// clamped to `1..=MAX_PAGE_SIZE` and defaults to `default_size`.
    pub fn resolve(params: PageParams, default_size: u32) -> Self {
        let default_size = if default_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            default_size
        };
        Self {
            number: params.page.unwrap_or(1).max(1),
            size: params.limit.unwrap_or(default_size).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> i64 {
        (self.number as i64 - 1) * self.size as i64
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use chrono::Utc;
    use serde_json::json;

    fn brand(stock: i64) -> Brand {
        let now = Utc::now();
        Brand {
            id: "b1".into(),
            name: "Marlboro".into(),
            price_cents: 1000,
            stock,
            last_restocked: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_from_json_rounds_amounts() {
        let req = SaleRequest::from_json(&json!({
            "brandId": "b1",
            "quantity": 3,
            "totalAmount": 12.1 * 3.0,
            "amountReceived": 40.004
        }))
        .unwrap();

        assert_eq!(req.total_amount.cents(), 3630);
        assert_eq!(req.amount_received.cents(), 4000);
        assert_eq!(req.quantity, 3.0);
    }

    #[test]
    fn test_from_json_lists_every_missing_field() {
        let err = SaleRequest::from_json(&json!({
            "brandId": "",
            "quantity": "2",
            "totalAmount": 10
        }))
        .unwrap_err();

        assert_eq!(err.kind(), FailureKind::MissingFields);
        match err {
            CoreError::MissingFields { fields } => {
                assert_eq!(fields, vec!["brandId", "quantity", "amountReceived"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_payment() {
        let ok = SaleRequest::new("b1", 1, Money::from_cents(500), Money::from_cents(500));
        assert!(ok.check_payment().is_ok());

        let short = SaleRequest::new("b1", 1, Money::from_cents(500), Money::from_cents(499));
        assert_eq!(
            short.check_payment().unwrap_err().kind(),
            FailureKind::InsufficientPayment
        );
    }

    #[test]
    fn test_check_stock() {
        let req = SaleRequest::new("b1", 5, Money::from_cents(500), Money::from_cents(500));
        assert!(req.check_stock(&brand(5)).is_ok());

        let err = req.check_stock(&brand(3)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Marlboro (Available: 3, Requested: 5)"
        );
    }

    #[test]
    fn test_into_line_schema_rules() {
        let fractional = SaleRequest {
            brand_id: "b1".into(),
            quantity: 1.5,
            total_amount: Money::from_cents(100),
            amount_received: Money::from_cents(100),
        };
        assert_eq!(
            fractional.into_line().unwrap_err().kind(),
            FailureKind::ValidationFailed
        );

        let zero_qty = SaleRequest::new("b1", 0, Money::from_cents(100), Money::from_cents(100));
        assert_eq!(
            zero_qty.into_line().unwrap_err().kind(),
            FailureKind::ValidationFailed
        );

        let free = SaleRequest::new("b1", 1, Money::zero(), Money::zero());
        assert_eq!(
            free.into_line().unwrap_err().kind(),
            FailureKind::ValidationFailed
        );

        let line = SaleRequest::new("b1", 2, Money::from_cents(2000), Money::from_cents(2500))
            .into_line()
            .unwrap();
        assert_eq!(line.sale_type(), SaleType::Multi);
        assert_eq!(line.change_given().cents(), 500);
    }

    #[test]
    fn test_amounts_above_cap_fail_schema() {
        let huge = SaleRequest::from_json(&json!({
            "brandId": "b1",
            "quantity": 1,
            "totalAmount": 5.0e16,
            "amountReceived": 5.0e16
        }))
        .unwrap();
        let err = huge.into_line().unwrap_err();
        assert_eq!(err.kind(), FailureKind::ValidationFailed);
        assert_eq!(
            err.to_string(),
            "Validation failed: totalAmount must be at most 10000000000.00"
        );

        let overpaid = SaleRequest::new(
            "b1",
            1,
            Money::from_cents(100),
            Money::from_cents(MAX_AMOUNT_CENTS + 1),
        );
        assert_eq!(
            overpaid.into_line().unwrap_err().kind(),
            FailureKind::ValidationFailed
        );

        let at_cap = SaleRequest::new(
            "b1",
            1,
            Money::from_cents(MAX_AMOUNT_CENTS),
            Money::from_cents(MAX_AMOUNT_CENTS),
        );
        assert!(at_cap.into_line().is_ok());

        assert!(validate_brand_price(1.0e10).is_ok());
        assert!(validate_brand_price(1.0e10 + 0.01).is_err());
    }

    #[test]
    fn test_brand_input_validation() {
        let brand = BrandInput {
            name: Some("  Dunhill ".into()),
            price: Some(10.5),
            stock: Some(40.0),
        }
        .validate()
        .unwrap();
        assert_eq!(brand.name, "Dunhill");
        assert_eq!(brand.price.cents(), 1050);
        assert_eq!(brand.stock, 40);

        let err = BrandInput {
            name: None,
            price: Some(1.0),
            stock: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: name, stock");

        assert!(validate_brand_price(-0.5).is_err());
        assert!(validate_brand_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_brand_patch() {
        let update = BrandPatch {
            price: Some(2.0),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(update.price, Some(Money::from_cents(200)));
        assert!(!update.restocks());
        assert!(BrandPatch::default().validate().unwrap().is_empty());
    }

    #[test]
    fn test_credentials() {
        assert!(validate_credentials(Some("admin"), Some("secret")).is_ok());
        let err = validate_credentials(Some(" "), None).unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: username, password");
    }

    #[test]
    fn test_page_resolution() {
        let page = Page::resolve(PageParams::default(), 20);
        assert_eq!(page, Page { number: 1, size: 20 });
        assert_eq!(page.offset(), 0);

        let page = Page::resolve(
            PageParams {
                page: Some(3),
                limit: Some(10_000),
            },
            20,
        );
        assert_eq!(page.size, MAX_PAGE_SIZE);
        assert_eq!(page.offset(), 2 * MAX_PAGE_SIZE as i64);

        let page = Page::resolve(
            PageParams {
                page: Some(0),
                limit: Some(0),
            },
            20,
        );
        assert_eq!(page, Page { number: 1, size: 1 });
    }
}
