//! API handlers

pub mod health;
pub mod index;
pub mod query;
pub mod ui;
