pub mod element;
pub mod errors;
pub mod resolution;
pub mod transaction;

pub use element::NativeElement;
pub use errors::{DocumentError, MutationError, TranslationError};
pub use resolution::{ClassCapability, ResolutionTable, TieBreak};
pub use transaction::TransactionScope;
