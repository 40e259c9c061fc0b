use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

mod admin;
mod dashboard;
mod detail;
mod help;

pub async fn dispatch_input(app: &mut App, key: KeyCode) -> color_eyre::Result<()> {
    if help::handle_help_toggle(app, key) {
        return Ok(());
    }

    match app.screen {
        AppScreen::Dashboard => dashboard::handle_dashboard_input(app, key).await,
        AppScreen::IncidentDetail => detail::handle_detail_input(app, key),
        AppScreen::NotFound => detail::handle_not_found_input(app, key).await,
        AppScreen::Admin => admin::handle_admin_input(app, key).await,
    }

    Ok(())
}
