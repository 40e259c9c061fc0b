pub(crate) mod helpers;
pub mod screens;

use crate::app::state::App;
use crossterm::event::KeyCode;

pub async fn handle_input(app: &mut App, key: KeyCode) -> color_eyre::Result<()> {
    screens::dispatch_input(app, key).await
}
