pub mod outbound;

pub use outbound::{DocumentSelection, HostDocument, Translator};
