//! Handlers for the bundled plugin units
//!
//! Manifests live in the plugins directory; these modules only supply the
//! behavior they bind to.

pub mod arithmetic;
pub mod compare;
pub mod text_case;

pub use compare::Compare;
pub use text_case::TextCase;
