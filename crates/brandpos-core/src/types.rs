//! # Domain Types
//!
//! Core domain types used throughout Brand POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────────┐                    │
//! │  │     Brand       │ 1    * │        Sale         │                    │
//! │  │  ─────────────  │◄───────│  ─────────────────  │                    │
//! │  │  id (UUID)      │        │  id (UUID)          │                    │
//! │  │  name           │        │  brand_id (ref)     │                    │
//! │  │  price_cents    │        │  quantity           │                    │
//! │  │  stock          │        │  total_amount_cents │                    │
//! │  │  last_restocked │        │  amount_received_.. │                    │
//! │  └─────────────────┘        │  sale_type          │                    │
//! │                             │  date               │                    │
//! │  ┌─────────────────┐        └─────────────────────┘                    │
//! │  │    SaleType     │                                                    │
//! │  │  Single | Multi │  multi iff quantity > 1 (per line item)           │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A Sale references its Brand but does not own it. Deleting a brand leaves
//! its sales in place; they report under [`crate::UNKNOWN_BRAND`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::FailureKind;
use crate::money::Money;
use crate::UNKNOWN_BRAND;

// =============================================================================
// Brand
// =============================================================================

/// A catalog entry available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and in reports.
    pub name: String,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Set whenever stock is set directly (creation, restock, edit).
    #[ts(as = "String")]
    pub last_restocked: DateTime<Utc>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Brand {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the summary embedded in sale listings.
    pub fn summary(&self) -> BrandSummary {
        BrandSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            price_cents: self.price_cents,
            stock: self.stock,
        }
    }
}

/// The brand data resolved onto a sale when listing or reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BrandSummary {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: i64,
}

// =============================================================================
// Sale Type
// =============================================================================

/// Classification of a sale line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SaleType {
    /// A single unit sold.
    #[default]
    Single,
    /// More than one unit of the same brand sold on one line.
    Multi,
}

impl SaleType {
    /// Classifies a line by its quantity.
    ///
    /// The classification is per line item, not per basket: a checkout of
    /// three different brands at quantity 1 records three `Single` sales.
    #[inline]
    pub fn for_quantity(quantity: i64) -> Self {
        if quantity > 1 {
            SaleType::Multi
        } else {
            SaleType::Single
        }
    }

    /// Wire/storage token.
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleType::Single => "single",
            SaleType::Multi => "multi",
        }
    }

    /// Human label used in exports.
    pub fn label(&self) -> &'static str {
        match self {
            SaleType::Single => "Single Product",
            SaleType::Multi => "Multi-Product",
        }
    }

    /// Parses a storage token.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "single" => Some(SaleType::Single),
            "multi" => Some(SaleType::Multi),
            _ => None,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale line. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    /// Referenced brand. May dangle if the brand was deleted.
    pub brand_id: String,
    /// Units sold, at least 1.
    pub quantity: i64,
    /// Amount charged for this line, at least 1 cent.
    pub total_amount_cents: i64,
    /// Amount handed over by the customer for this line.
    pub amount_received_cents: i64,
    /// `amount_received - total_amount`.
    pub change_given_cents: i64,
    pub sale_type: SaleType,
    /// When the sale happened. Reports select on this field.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the line total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Returns the amount received as Money.
    #[inline]
    pub fn amount_received(&self) -> Money {
        Money::from_cents(self.amount_received_cents)
    }

    /// `amount_received - total_amount` for this line.
    #[inline]
    pub fn balance(&self) -> Money {
        self.amount_received() - self.total_amount()
    }
}

/// A sale joined with its brand (if the brand still exists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    #[serde(flatten)]
    pub sale: Sale,
    pub brand: Option<BrandSummary>,
}

impl SaleView {
    /// Brand name, or [`UNKNOWN_BRAND`] when the reference does not resolve.
    pub fn brand_name(&self) -> &str {
        self.brand
            .as_ref()
            .map(|b| b.name.as_str())
            .unwrap_or(UNKNOWN_BRAND)
    }
}

// =============================================================================
// Recording Results
// =============================================================================

/// Stock movement caused by a recorded sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub previous_stock: i64,
    pub new_stock: i64,
}

/// A successfully recorded sale plus what it did to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RecordedSale {
    pub sale: Sale,
    pub brand: BrandSummary,
    pub inventory_update: StockChange,
}

/// Where and why a bulk sale stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    /// Position of the failing item in the request.
    pub index: usize,
    pub kind: FailureKind,
    pub message: String,
}

/// Result of a bulk sale.
///
/// Items before `failure.index` are committed; the failing item and all
/// later items are not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub sales: Vec<RecordedSale>,
    pub failure: Option<BulkFailure>,
}

impl BulkOutcome {
    /// True when every item was recorded.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of the sales listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesPage {
    pub sales: Vec<SaleView>,
    pub total_pages: u32,
    pub current_page: u32,
}

/// Number of pages needed for `count` rows at `page_size` per page.
pub fn page_count(count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size as u64) as u32
}

// =============================================================================
// Unit Tests
// =============================================================================
