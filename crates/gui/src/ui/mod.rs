//! Panels around the viewport

pub mod measurements;
pub mod status_bar;
pub mod toolbar;
