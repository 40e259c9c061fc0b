use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_detail_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.close_modal(),
        KeyCode::Up => app.detail_scroll = app.detail_scroll.saturating_sub(1),
        KeyCode::Down => app.detail_scroll = app.detail_scroll.saturating_add(1),
        KeyCode::PageUp => app.detail_scroll = app.detail_scroll.saturating_sub(10),
        KeyCode::PageDown => app.detail_scroll = app.detail_scroll.saturating_add(10),
        KeyCode::Home => app.detail_scroll = 0,
        _ => {}
    }
}

pub async fn handle_not_found_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.close_modal(),
        KeyCode::Char('r') => {
            let id = app.not_found_id.clone().unwrap_or_default();
            app.reload().await;
            app.open_incident(&id);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::AppScreen;

    #[tokio::test]
    async fn reload_retries_the_missing_lookup() {
        let mut app = App::new();
        app.open_incident("17");
        assert_eq!(app.screen, AppScreen::NotFound);

        // no data source is configured, so the retry misses again behind a banner
        handle_not_found_input(&mut app, KeyCode::Char('r')).await;
        assert_eq!(app.screen, AppScreen::NotFound);
        assert!(app.banner.is_some());

        handle_not_found_input(&mut app, KeyCode::Esc).await;
        assert_eq!(app.screen, AppScreen::Dashboard);
    }
}
