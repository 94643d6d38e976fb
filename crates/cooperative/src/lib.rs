//! Purchase orders of a group-buying delivery and enforcement of product quantity limits

mod config;
mod enforce;
mod journal;
mod model;
mod store;

pub use config::*;
pub use enforce::*;
pub use journal::*;
pub use model::*;
pub use store::*;
