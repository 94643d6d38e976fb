//! Allocation of a scarce, integral resource among consumers
//!
//! When the total wished quantity of a product exceeds its limit every order is cut back to a
//! common ceiling. The few units left below one unit per consumer go to the largest requesters.

mod allocate;
mod error;
mod units;

pub use allocate::*;
pub use error::*;
pub use units::*;
