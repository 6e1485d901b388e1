//! # Report Module
//!
//! Period resolution and aggregation of a selection of sales.
//!
//! ## Report Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ?period=week&saleType=multi&brandId=all                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReportQuery::filter(now) ──── unknown period ──► InvalidPeriod         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReportFilter { range: [now-7d, now], sale_type: multi, brand: any }    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  brandpos-db: SaleRepository::find_in_range(&filter)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  build_report(sales) ── one fold ──► summary + brandStats + dailyStats  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both breakdowns are `BTreeMap`s. Day keys are `YYYY-MM-DD`, so the daily
//! breakdown iterates chronologically.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Sale, SaleType, SaleView};

/// Filter token meaning "no filter".
pub const ALL: &str = "all";

// =============================================================================
// Period
// =============================================================================

/// Reporting window selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The last 24 hours.
    Day,
    /// The last 7 days.
    Week,
    /// The last calendar month.
    Month,
    /// The last calendar year.
    Year,
    /// Caller-supplied `[startDate, endDate]`.
    Custom,
}

impl Period {
    /// Parses a period token. Anything else is [`CoreError::InvalidPeriod`].
    pub fn parse(token: Option<&str>) -> CoreResult<Self> {
        match token {
            Some("day") => Ok(Period::Day),
            Some("week") => Ok(Period::Week),
            Some("month") => Ok(Period::Month),
            Some("year") => Ok(Period::Year),
            Some("custom") => Ok(Period::Custom),
            Some(other) => Err(CoreError::InvalidPeriod(other.to_string())),
            None => Err(CoreError::InvalidPeriod("period is required".to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::Custom => "custom",
        }
    }

    /// Resolves the window ending at `now`.
    ///
    /// `start` and `end` are only read for [`Period::Custom`], where both are
    /// required.
    pub fn resolve(
        &self,
        now: DateTime<Utc>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> CoreResult<DateRange> {
        let start = match self {
            Period::Day => now - Duration::hours(24),
            Period::Week => now - Duration::days(7),
            Period::Month => now
                .checked_sub_months(Months::new(1))
                .ok_or_else(|| CoreError::InvalidPeriod("month".to_string()))?,
            Period::Year => now
                .checked_sub_months(Months::new(12))
                .ok_or_else(|| CoreError::InvalidPeriod("year".to_string()))?,
            Period::Custom => {
                let (Some(start), Some(end)) = (start, end) else {
                    return Err(CoreError::InvalidPeriod(
                        "custom period requires startDate and endDate".to_string(),
                    ));
                };
                return Ok(DateRange {
                    start: parse_bound(start, Bound::Start)?,
                    end: parse_bound(end, Bound::End)?,
                });
            }
        };

        Ok(DateRange { start, end: now })
    }
}

/// An inclusive `[start, end]` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[ts(as = "String")]
    pub start: DateTime<Utc>,
    #[ts(as = "String")]
    pub end: DateTime<Utc>,
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// Reads an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
///
/// A bare end date covers the whole of that day.
fn parse_bound(raw: &str, bound: Bound) -> CoreResult<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidPeriod(format!("unreadable date: {raw}")))?;

    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
            .ok_or_else(|| CoreError::InvalidPeriod(raw.to_string()))?,
    };

    Ok(date.and_time(time).and_utc())
}

// =============================================================================
// Query & Filter
// =============================================================================

/// Query string of the report and download routes.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub period: Option<String>,
    pub sale_type: Option<String>,
    pub brand_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Download only: `csv` (default) or `excel`.
    pub format: Option<String>,
}

impl ReportQuery {
    /// Resolves the query into a filter anchored at `now`.
    pub fn filter(&self, now: DateTime<Utc>) -> CoreResult<ReportFilter> {
        let period = Period::parse(self.period.as_deref())?;
        let range = period.resolve(now, self.start_date.as_deref(), self.end_date.as_deref())?;

        Ok(ReportFilter {
            period,
            range,
            sale_type: active_filter(self.sale_type.as_deref()),
            brand_id: active_filter(self.brand_id.as_deref()),
        })
    }
}

/// `None` for an absent, empty, or `all` token.
fn active_filter(token: Option<&str>) -> Option<String> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != ALL)
        .map(str::to_string)
}

/// Selection criteria for a report.
///
/// `sale_type` is kept as the raw token: a value other than `single` or
/// `multi` is not an error, it simply selects nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilter {
    pub period: Period,
    pub range: DateRange,
    pub sale_type: Option<String>,
    pub brand_id: Option<String>,
}

impl ReportFilter {
    /// Unfiltered window.
    pub fn for_range(period: Period, range: DateRange) -> Self {
        Self {
            period,
            range,
            sale_type: None,
            brand_id: None,
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// Headline figures of a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_sales: u64,
    pub total_amount_cents: i64,
    pub amount_received_cents: i64,
    pub total_quantity: i64,
    /// `amount_received - total_amount`.
    pub balance_cents: i64,
    pub single_product_sales: u64,
    pub multi_product_sales: u64,
    /// 0 when nothing was selected.
    pub average_sale_value_cents: i64,
    /// 0 when nothing was selected.
    pub average_quantity: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BrandStats {
    pub quantity: i64,
    pub total_amount_cents: i64,
    pub amount_received_cents: i64,
}

impl BrandStats {
    fn add(&mut self, sale: &Sale) {
        self.quantity = self.quantity.saturating_add(sale.quantity);
        self.total_amount_cents = self.total_amount_cents.saturating_add(sale.total_amount_cents);
        self.amount_received_cents = self
            .amount_received_cents
            .saturating_add(sale.amount_received_cents);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub quantity: i64,
    pub total_amount_cents: i64,
    pub amount_received_cents: i64,
    pub count: u64,
}

impl DailyStats {
    fn add(&mut self, sale: &Sale) {
        self.quantity = self.quantity.saturating_add(sale.quantity);
        self.total_amount_cents = self.total_amount_cents.saturating_add(sale.total_amount_cents);
        self.amount_received_cents = self
            .amount_received_cents
            .saturating_add(sale.amount_received_cents);
        self.count += 1;
    }
}

/// Aggregated view of a sale selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub summary: ReportSummary,
    /// Keyed by brand name; unresolvable brands group under "Unknown".
    pub brand_stats: BTreeMap<String, BrandStats>,
    /// Keyed by UTC calendar day, `YYYY-MM-DD`.
    pub daily_stats: BTreeMap<String, DailyStats>,
    pub sales: Vec<SaleView>,
}

/// Day key of a timestamp.
pub fn day_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Folds a selection of sales into a report.
///
/// Sums saturate at the `i64` bounds rather than wrapping.
///
/// ## Example
/// ```rust
/// use brandpos_core::report::build_report;
///
/// let report = build_report(Vec::new());
/// assert_eq!(report.summary.total_sales, 0);
/// assert_eq!(report.summary.average_sale_value_cents, 0);
/// assert_eq!(report.summary.average_quantity, 0.0);
/// ```
pub fn build_report(sales: Vec<SaleView>) -> Report {
    let mut summary = ReportSummary::default();
    let mut total = Money::zero();
    let mut received = Money::zero();
    let mut brand_stats: BTreeMap<String, BrandStats> = BTreeMap::new();
    let mut daily_stats: BTreeMap<String, DailyStats> = BTreeMap::new();

    for view in &sales {
        let sale = &view.sale;

        summary.total_sales += 1;
        summary.total_quantity = summary.total_quantity.saturating_add(sale.quantity);
        total = total.saturating_add(sale.total_amount());
        received = received.saturating_add(sale.amount_received());
        match sale.sale_type {
            SaleType::Single => summary.single_product_sales += 1,
            SaleType::Multi => summary.multi_product_sales += 1,
        }

        brand_stats
            .entry(view.brand_name().to_string())
            .or_default()
            .add(sale);
        daily_stats.entry(day_key(sale.date)).or_default().add(sale);
    }

    summary.total_amount_cents = total.cents();
    summary.amount_received_cents = received.cents();
    summary.balance_cents = received.saturating_sub(total).cents();
    if summary.total_sales > 0 {
        let count = summary.total_sales as i64;
        summary.average_sale_value_cents = total
            .divide_by_quantity(count)
            .unwrap_or_default()
            .cents();
        summary.average_quantity = summary.total_quantity as f64 / count as f64;
    }

    Report {
        summary,
        brand_stats,
        daily_stats,
        sales,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::types::BrandSummary;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn view(
        brand: Option<&str>,
        quantity: i64,
        total: i64,
        received: i64,
        date: DateTime<Utc>,
    ) -> SaleView {
        let brand_id = brand.unwrap_or("gone").to_lowercase();
        SaleView {
            sale: Sale {
                id: format!("{brand_id}-{quantity}-{total}"),
                brand_id: brand_id.clone(),
                quantity,
                total_amount_cents: total,
                amount_received_cents: received,
                change_given_cents: received - total,
                sale_type: SaleType::for_quantity(quantity),
                date,
                created_at: date,
                updated_at: date,
            },
            brand: brand.map(|name| BrandSummary {
                id: brand_id,
                name: name.to_string(),
                price_cents: 0,
                stock: 0,
            }),
        }
    }

    #[test]
    fn test_period_tokens() {
        assert_eq!(Period::parse(Some("week")).unwrap(), Period::Week);
        assert_eq!(
            Period::parse(Some("decade")).unwrap_err().kind(),
            FailureKind::InvalidPeriod
        );
        assert_eq!(
            Period::parse(None).unwrap_err().kind(),
            FailureKind::InvalidPeriod
        );
    }

    #[test]
    fn test_period_windows() {
        let now = at(2024, 3, 31, 12);

        let day = Period::Day.resolve(now, None, None).unwrap();
        assert_eq!(day.start, at(2024, 3, 30, 12));
        assert_eq!(day.end, now);

        let week = Period::Week.resolve(now, None, None).unwrap();
        assert_eq!(week.start, at(2024, 3, 24, 12));

        // Calendar month, clamped to the end of February.
        let month = Period::Month.resolve(now, None, None).unwrap();
        assert_eq!(month.start, at(2024, 2, 29, 12));

        let year = Period::Year.resolve(now, None, None).unwrap();
        assert_eq!(year.start, at(2023, 3, 31, 12));
    }

    #[test]
    fn test_custom_range() {
        let now = at(2024, 3, 31, 12);
        let range = Period::Custom
            .resolve(now, Some("2024-01-01"), Some("2024-01-31"))
            .unwrap();
        assert_eq!(range.start, at(2024, 1, 1, 0));
        assert!(range.end > at(2024, 1, 31, 23));
        assert!(range.end < at(2024, 2, 1, 0));

        let range = Period::Custom
            .resolve(
                now,
                Some("2024-01-01T08:00:00Z"),
                Some("2024-01-01T09:00:00+01:00"),
            )
            .unwrap();
        assert_eq!(range.end, at(2024, 1, 1, 8));

        let bad = [
            (None, Some("2024-01-01")),
            (Some("yesterday"), Some("2024-01-01")),
        ];
        for (start, end) in bad {
            let err = Period::Custom.resolve(now, start, end).unwrap_err();
            assert_eq!(err.kind(), FailureKind::InvalidPeriod);
        }
    }

    #[test]
    fn test_query_filters_treat_all_as_absent() {
        let query = ReportQuery {
            period: Some("day".into()),
            sale_type: Some("all".into()),
            brand_id: Some("b1".into()),
            ..Default::default()
        };
        let filter = query.filter(at(2024, 1, 2, 0)).unwrap();
        assert_eq!(filter.sale_type, None);
        assert_eq!(filter.brand_id.as_deref(), Some("b1"));
    }

    #[test]
    fn test_build_report_totals_and_breakdowns() {
        let sales = vec![
            view(Some("A"), 2, 2000, 2000, at(2024, 1, 1, 10)),
            view(Some("B"), 1, 500, 500, at(2024, 1, 2, 10)),
        ];

        let report = build_report(sales);
        let s = &report.summary;
        assert_eq!(s.total_sales, 2);
        assert_eq!(s.total_amount_cents, 2500);
        assert_eq!(s.total_quantity, 3);
        assert_eq!(s.balance_cents, 0);
        assert_eq!(s.single_product_sales, 1);
        assert_eq!(s.multi_product_sales, 1);
        assert_eq!(s.average_sale_value_cents, 1250);
        assert_eq!(s.average_quantity, 1.5);

        assert_eq!(report.brand_stats["A"].quantity, 2);
        assert_eq!(report.brand_stats["B"].quantity, 1);

        let days: Vec<_> = report.daily_stats.keys().cloned().collect();
        assert_eq!(days, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(report.daily_stats["2024-01-01"].count, 1);
    }

    #[test]
    fn test_unresolved_brand_reports_as_unknown() {
        let report = build_report(vec![
            view(None, 1, 300, 400, at(2024, 1, 1, 10)),
            view(None, 3, 900, 900, at(2024, 1, 1, 11)),
        ]);

        let unknown = report.brand_stats["Unknown"];
        assert_eq!(unknown.quantity, 4);
        assert_eq!(unknown.amount_received_cents, 1300);
        assert_eq!(report.summary.balance_cents, 100);
        assert_eq!(report.daily_stats["2024-01-01"].count, 2);
    }

    #[test]
    fn test_large_amounts_do_not_overflow() {
        let huge = 5_000_000_000_000_000_000;
        let report = build_report(vec![
            view(Some("A"), 1, huge, huge, at(2024, 1, 1, 10)),
            view(Some("A"), 1, huge, huge, at(2024, 1, 1, 11)),
        ]);

        assert_eq!(report.summary.total_amount_cents, i64::MAX);
        assert_eq!(report.brand_stats["A"].amount_received_cents, i64::MAX);
        assert_eq!(report.daily_stats["2024-01-01"].total_amount_cents, i64::MAX);
        assert_eq!(report.summary.balance_cents, 0);
    }

    #[test]
    fn test_sales_at_amount_cap_sum_exactly() {
        let cap = crate::MAX_AMOUNT_CENTS;
        let sales = (0..1_000)
            .map(|i| view(Some("A"), 1, cap, cap, at(2024, 1, 1, 0) + Duration::minutes(i)))
            .collect();

        let report = build_report(sales);
        assert_eq!(report.summary.total_amount_cents, cap * 1_000);
        assert_eq!(report.summary.average_sale_value_cents, cap);
    }
}
