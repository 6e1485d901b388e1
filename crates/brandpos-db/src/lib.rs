//! # brandpos-db: Database Layer for Brand POS
//!
//! This crate provides database access for the Brand POS system.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Brand POS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /sales)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    brandpos-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  BrandRepo    │    │  (embedded)  │  │   │
//! │  │   │               │◄───│  SaleRepo     │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │    │  AdminRepo    │    │              │  │   │
//! │  │   │               │◄───│ SaleRecorder  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (brandpos.db)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Brand, sale and admin repositories
//! - [`recorder`] - Transactional sale recording (single, bulk, checkout)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use brandpos_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("brandpos.db")).await?;
//!
//! let brands = db.brands().list().await?;
//! let recorded = db.recorder().record_json(&body).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod recorder;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, RecordError};
pub use pool::{Database, DbConfig};
pub use recorder::SaleRecorder;

// Repository re-exports for convenience
pub use repository::admin::{Admin, AdminRepository};
pub use repository::brand::BrandRepository;
pub use repository::sale::SaleRepository;
