//! Terminal front-end: one module per command group

pub mod alerts;
pub mod portfolio;
pub mod prices;
pub mod setup;
pub mod signals;
pub mod ui;
