pub mod api;
pub mod appointments;
pub mod calendar;
pub mod cli;
pub mod client;
pub mod core;
pub mod store;
