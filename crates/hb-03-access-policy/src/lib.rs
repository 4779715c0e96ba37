//! # Write-Access Policy (hb-03)
//!
//! Decides, per element, whether an operation may touch it.
//!
//! ## Criteria
//!
//! | Criterion | Inputs | Empty policy |
//! |-----------|--------|--------------|
//! | Selection | unique ids, numeric ids, categories, live selection | allows all |
//! | Workset | workset ids, names, open-only flag | allows all |
//!
//! An element is allowed only when both criteria allow it. The workset
//! open-only flag is evaluated before, and independently of, the workset
//! allow-lists. Elements of non-workshared documents pass the workset check.
//!
//! ## Crate Structure
//!
//! - `domain/` - `SelectionRules`, `WorksetRules`, `PolicyDenial`
//! - `ports/` - `SelectionSource`, the live-selection seam
//! - `service.rs` - `WriteAccessPolicy`

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{PolicyDenial, SelectionRules, WorksetRules};
pub use ports::{NoSelection, SelectionSource};
pub use service::WriteAccessPolicy;
