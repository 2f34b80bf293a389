//! Distribution tallies and PNG charts for classified commit history.
//!
//! [`tally::Distribution`] counts categories and severities,
//! [`layout`] turns the counts into donut and bar geometry, and
//! [`render`] rasterises both charts with plotters.

pub mod font;
pub mod layout;
pub mod render;
pub mod tally;

pub use render::{render_donut, render_severity_bar};
pub use tally::Distribution;
