//! Core library for Tartib — a bilingual (English/Arabic) content
//! administration system with strictly ordered taxonomies.
//!
//! The pieces, leaf first:
//!
//! - [`store`] — the document-database contract ([`store::DocumentStore`])
//!   with an in-memory backend and an embedded SurrealDB backend. Provides
//!   filtered reads, realtime snapshot subscriptions, atomic batches, and
//!   transactional read-modify-write with optimistic retry.
//! - [`objects`] — object storage for binary assets (diagram images,
//!   template PDFs).
//! - [`content`] — the entity families (categories, subcategories, glossary
//!   terms, diagrams, templates) and the ordering protocol: max+1 order
//!   assignment at creation, swap-based move-up/move-down inside
//!   transactions, atomic cascade deletion, and order-sorted realtime
//!   projections.
//! - [`config`] — data-directory configuration for the CLI and embedders.

pub mod config;
pub mod content;
pub mod objects;
pub mod store;

pub use config::Config;
pub use content::{ContentService, ContentError};
