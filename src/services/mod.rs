//! Business logic, free of transport concerns.

pub mod account;
pub mod drag;
pub mod lifecycle;
pub mod session;
pub mod sync;
