//! Document and translator adapters.

pub mod in_memory;
pub mod translator;

pub use in_memory::{DocumentCounters, InMemoryDocument};
pub use translator::{DomainObject, PassthroughTranslator};
