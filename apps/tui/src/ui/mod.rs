// UI module for crisis-docs
// Handles all UI rendering functions

pub mod screens;
pub mod widgets;

use crate::app::{App, AppScreen};
use ratatui::Frame;

pub fn ui(app: &App, f: &mut Frame<'_>) {
    match app.screen {
        AppScreen::Dashboard => screens::dashboard::render_dashboard(app, f),
        AppScreen::IncidentDetail => {
            screens::dashboard::render_dashboard(app, f);
            screens::detail::render_incident_detail(app, f);
        }
        AppScreen::NotFound => {
            screens::dashboard::render_dashboard(app, f);
            screens::detail::render_not_found(app, f);
        }
        AppScreen::Admin => screens::admin::render_admin(app, f),
    }

    if app.show_help {
        screens::help::render_help_popup(app, f);
    }
}
