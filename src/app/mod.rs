//! Terminal shell over the coaching session

pub mod input;
pub mod runtime;

pub use runtime::run;
