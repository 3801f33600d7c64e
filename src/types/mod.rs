//! Core types for the Bedrock modality layer.
//!
//! Canonical request and result types, the parameter constraint system, the
//! conversation content model, and the per-family wire bodies.

mod common;
mod content;
mod message;
mod parameters;
mod requests;
mod responses;
mod tool;

pub use common::*;
pub use content::*;
pub use message::*;
pub use parameters::*;
pub use requests::*;
pub use responses::*;
pub use tool::*;
