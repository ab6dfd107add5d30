//! Library components of the loan silver CLI.

pub mod logging;
pub mod pipeline;
