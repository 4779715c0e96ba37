//! Pure decision rules. No I/O; the live selection comes in through
//! `SelectionSource`.

pub mod denial;
pub mod selection;
pub mod workset;


pub use denial::PolicyDenial;
pub use selection::SelectionRules;
pub use workset::WorksetRules;
