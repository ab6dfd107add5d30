//! Silver table merge engine.
//!
//! The silver table is assembled from two independent join chains:
//!
//! - **Account branch**: account, loan, order, transactions and disp joined
//!   on the account key
//! - **Client branch**: disp, client and card joined on the client keys
//!
//! The client branch is then joined with the account branch. Each of the three
//! units either completes or fails with a [`MergeError`] naming the stage;
//! no partial table is ever returned.

mod engine;
mod error;
mod join;

pub use engine::{BronzeTables, MergeEngine};
pub use error::{JoinFailure, KeySide, MergeError};
pub use join::{SuffixPlan, join_tables};
