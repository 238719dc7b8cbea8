//! Ishikawa (fishbone) diagrams for root cause analysis.
//!
//! Rows of hypotheses are grouped into categories and causes, laid out by
//! [`diagram::layout_fishbone`] into a [`diagram::Canvas`] of positioned
//! primitives, and serialized with [`diagram::render_svg`]. The [`export`]
//! module rasterizes the SVG to PNG or converts it to PDF.

pub mod diagram;
pub mod error;
pub mod export;
pub mod fonts;
pub mod logging;
pub mod theme;
pub mod xml;

pub use error::{Error, Result};
