//! Price calculators for everything sold on campus.
//!
//! All functions here are pure: the same inputs always give the same amount,
//! nothing is read from storage and nothing fails. Unknown offerings cost zero,
//! rejecting them is the job of the order layer.

pub mod cafeteria;
pub mod printing;
pub mod rooms;
