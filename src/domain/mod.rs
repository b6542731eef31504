//! Domain model: fee rates, breakdown arithmetic, payment records, events.
pub mod breakdown;
pub mod events;
pub mod payment;
pub mod value_objects;
