//! Content filter: validates uploads against their declared category
//! before any expensive work happens.

mod rules;
mod types;

pub use rules::{ContentFilter, ValidationError};
pub use types::FileCategory;
