//! # Document Mutator (hb-04)
//!
//! Identity resolution and all-or-nothing mutation of the host document.
//!
//! ## Batch Pipeline
//!
//! ```text
//! ElementLocator[] ──resolve──► NativeElement ──policy──► dedup ──► TransactionScope
//!   unique id first,              WriteAccessPolicy        by id      one per batch,
//!   then name via table                                               rollback on drop
//! ```
//!
//! Push runs the same transaction shape over domain objects: unlinked ones
//! are created, linked ones go through the policy and are updated in place
//! or replaced according to `AdapterMode`.
//!
//! ## Crate Structure
//!
//! - `domain/` - `NativeElement`, `ResolutionTable`, `TieBreak`, `TransactionScope`, errors
//! - `ports/` - `HostDocument`, `Translator`, `DocumentSelection`
//! - `adapters/` - `InMemoryDocument`, `PassthroughTranslator`
//! - `service.rs` - `TransactionalMutator`

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{DocumentCounters, DomainObject, InMemoryDocument, PassthroughTranslator};
pub use domain::{
    ClassCapability, DocumentError, MutationError, NativeElement, ResolutionTable, TieBreak,
    TransactionScope, TranslationError,
};
pub use ports::{DocumentSelection, HostDocument, Translator};
pub use service::TransactionalMutator;
