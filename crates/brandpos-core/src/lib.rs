//! # brandpos-core: Pure Business Logic for Brand POS
//!
//! This crate holds every business rule of the sale and reporting core as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Brand POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Browser Dashboard (cart checkout)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    brandpos-server (axum)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ brandpos-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌──────────┐ ┌──────────┐ ┌────────┐ ┌─────────┐ │   │
//! │  │  │  types  │ │validation│ │ checkout │ │ report │ │ export  │ │   │
//! │  │  │ Brand   │ │ SaleInput│ │ cart →   │ │ fold   │ │ csv     │ │   │
//! │  │  │ Sale    │ │ rules    │ │ items    │ │ stats  │ │ xlsx    │ │   │
//! │  │  └─────────┘ └──────────┘ └──────────┘ └────────┘ └─────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  brandpos-db (Database Layer)                   │   │
//! │  │        SQLite repositories, transactional Sale Recorder         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Brand, Sale, SaleType)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types and failure kinds
//! - [`validation`] - Boundary validation of sale and brand input
//! - [`checkout`] - Splitting a cart into bulk sale items
//! - [`report`] - Period resolution and report aggregation
//! - [`export`] - CSV / spreadsheet rendering of a sale set
//!
//! ## Example Usage
//!
//! ```rust
//! use brandpos_core::money::Money;
//! use brandpos_core::SaleType;
//!
//! let unit = Money::from_cents(1050);
//! let total = unit * 3;
//! assert_eq!(total.to_decimal_string(), "31.50");
//! assert_eq!(SaleType::for_quantity(3), SaleType::Multi);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod export;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, FailureKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Brand name used in reports and exports when a sale's brand no longer
/// resolves.
pub const UNKNOWN_BRAND: &str = "Unknown";

/// Smallest charge a sale line may carry (one cent).
pub const MIN_SALE_TOTAL_CENTS: i64 = 1;

/// Largest amount a single price, line total, or payment may carry
/// ($10,000,000,000.00).
///
/// Keeps every stored sale small enough that report totals over the whole
/// table stay far from the `i64` range.
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000;

/// Maximum length of a brand name.
pub const MAX_BRAND_NAME_LEN: usize = 200;

/// Maximum number of lines accepted in a single bulk request.
///
/// ## Business Reason
/// Prevents runaway baskets; the dashboard cart never comes close.
pub const MAX_BULK_ITEMS: usize = 100;

/// Default page size for the sales listing.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on the sales listing page size.
pub const MAX_PAGE_SIZE: u32 = 200;
