pub mod popup;
pub mod tables;
pub mod theme;
