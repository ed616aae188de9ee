//! Terminal rendering, one module per view plus shared components.

pub mod alerts;
pub mod common;
pub mod dashboard;
pub mod engine;
pub mod optimisation;
pub mod theme;

pub use theme::Theme;
