pub mod admin;
pub mod dashboard;
pub mod detail;
pub mod help;
mod map;
mod timeline;
