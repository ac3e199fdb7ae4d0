//! Minimum-version policy checking for declared package dependencies
//!
//! Given an age-based policy (a per-package "freshness window" in months) and
//! the release history of every declared dependency, this crate selects the
//! minimum version each package is allowed to pin and reports whether any
//! environment declares something newer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Parser    │     │   Gateway   │     │   Config    │
//! │ (manifests) │     │ (repodata)  │     │  (policy)   │
//! └──────┬──────┘     └──────┬──────┘     └──────┬──────┘
//!        │                   ▼                   │
//!        │            ┌─────────────┐            │
//!        │            │   Catalog   │            │
//!        │            │ (releases)  │            │
//!        │            └──────┬──────┘            │
//!        ▼                   ▼                   ▼
//! ┌─────────────────────────────────────────────────────┐
//! │          Policy (minimum version selection)         │
//! └──────┬───────────────────────────────────────┬──────┘
//!        ▼                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │   Checker   │                         │   Report    │
//! │ (pass/fail) │                         │   (rows)    │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`version`]: channel version values (segments + pre-release marker)
//! - [`release`]: release records and the deduplicated per-package catalog
//! - [`policy`]: the age-based minimum-version selection engine
//! - [`checker`]: per-environment violation verdicts
//! - [`report`]: presentation-ready report rows
//! - [`parser`]: environment manifest dialects (conda, pixi)
//! - [`registry`]: batched channel gateway (repodata.json)
//! - [`config`]: schema-validated policy documents
//! - [`output`]: plain-text rendering

pub mod checker;
pub mod config;
pub mod output;
pub mod parser;
pub mod policy;
pub mod registry;
pub mod release;
pub mod report;
pub mod version;
