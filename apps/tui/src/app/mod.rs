// App module for crisis-docs
// Handles application state and the controller actions behind each key

pub mod actions;
mod extraction;
pub mod input;
pub mod state;

pub use input::handle_input;
pub use state::{AdminFocus, App, AppScreen, InputMode};
