//! # Checkout Module
//!
//! Turns a dashboard cart into the ordered list of bulk sale items.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart                                 Bulk items                        │
//! │  ────────────────────────────         ───────────────────────────────   │
//! │  Marlboro  x2 @ $10.00 = $20.00  ──►  total $20.00 received $26.67      │
//! │  Dunhill   x1 @ $10.00 = $10.00  ──►  total $10.00 received $13.33      │
//! │                                                                         │
//! │  Cart total $30.00, customer hands over $40.00                          │
//! │  Each line receives its share of $40.00, proportional to its total,     │
//! │  rounded to the cent.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Because every share is computed from `received >= total`, each line's
//! received amount is at least its own total after rounding.

use serde::Deserialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{
    validate_amount, validate_brand_price, validate_sale_quantity, SaleRequest,
};
use crate::MAX_BULK_ITEMS;

/// One line of the cart.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub brand_id: String,
    pub quantity: i64,
    pub unit_price: f64,
}

/// The cart submitted at checkout.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub amount_received: Option<f64>,
}

/// Splits a cart into bulk sale items.
///
/// ## Errors
/// - `ValidationFailed` for an empty or oversized cart, a quantity below
///   one, a negative price, a line total above the amount cap, or a cart
///   whose total is zero
/// - `MissingFields` when the amount received is absent or not finite
/// - `InsufficientPayment` when the amount received is below the cart total
pub fn split_cart(cart: &Cart) -> CoreResult<Vec<SaleRequest>> {
    if cart.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        }
        .into());
    }
    if cart.items.len() > MAX_BULK_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_BULK_ITEMS as i64,
        }
        .into());
    }

    let received = cart
        .amount_received
        .and_then(Money::from_decimal)
        .ok_or_else(|| CoreError::missing(["amountReceived"]))?;

    let mut totals = Vec::with_capacity(cart.items.len());
    let mut cart_total = Money::zero();
    for line in &cart.items {
        validate_sale_quantity(line.quantity as f64)?;
        let unit = validate_brand_price(line.unit_price)?;
        let line_total = unit
            .checked_multiply_quantity(line.quantity)
            .ok_or_else(line_total_too_large)?;
        validate_amount("totalAmount", line_total)?;

        // At most MAX_BULK_ITEMS lines under the cap each; cannot overflow.
        cart_total = cart_total.saturating_add(line_total);
        totals.push(line_total);
    }

    if received < cart_total {
        return Err(CoreError::InsufficientPayment {
            amount_received: received,
            total_amount: cart_total,
        });
    }

    cart.items
        .iter()
        .zip(totals)
        .map(|(line, line_total)| -> CoreResult<SaleRequest> {
            let share = received.share(line_total, cart_total).ok_or_else(|| {
                ValidationError::BelowMinimum {
                    field: "totalAmount".to_string(),
                    min: "0.01".to_string(),
                }
            })?;
            Ok(SaleRequest::new(
                line.brand_id.clone(),
                line.quantity,
                line_total,
                share,
            ))
        })
        .collect()
}

fn line_total_too_large() -> ValidationError {
    ValidationError::AboveMaximum {
        field: "totalAmount".to_string(),
        max: Money::from_cents(crate::MAX_AMOUNT_CENTS).to_decimal_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
