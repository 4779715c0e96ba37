//! Cross-crate integration flows.

pub mod correlation;
pub mod flows;
pub mod framing;
