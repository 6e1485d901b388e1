//! # Repository Module
//!
//! Database repository implementations for Brand POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.brands().restock(id, 40)                                   │
//! │       ▼                                                                 │
//! │  BrandRepository        SaleRepository          AdminRepository        │
//! │  ├── list               ├── list_page           ├── create             │
//! │  ├── get_by_id          ├── find (report)       └── find_by_username   │
//! │  ├── insert             ├── get_by_id                                  │
//! │  ├── update / restock   └── count                                      │
//! │  └── delete                                                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Statements that must run inside the Sale Recorder's transaction are
//! free functions generic over [`sqlx::SqliteExecutor`], so they accept
//! either the pool or `&mut *tx`.

pub mod admin;
pub mod brand;
pub mod sale;
