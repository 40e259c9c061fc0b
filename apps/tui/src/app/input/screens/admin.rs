use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use crate::app::state::{AdminFocus, App};
use crossterm::event::KeyCode;

pub async fn handle_admin_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => {
            app.leave_admin();
            return;
        }
        KeyCode::Tab => {
            app.admin.focus = match app.admin.focus {
                AdminFocus::Urls => AdminFocus::Files,
                AdminFocus::Files => AdminFocus::Urls,
            };
            return;
        }
        KeyCode::F(2) => {
            app.validate_url().await;
            return;
        }
        KeyCode::F(3) => {
            app.admin.update_main_csv = !app.admin.update_main_csv;
            return;
        }
        KeyCode::F(4) => {
            app.admin.create_backup = !app.admin.create_backup;
            return;
        }
        KeyCode::F(5) => {
            app.start_extraction().await;
            return;
        }
        KeyCode::F(6) => {
            app.refresh_admin().await;
            return;
        }
        _ => {}
    }

    match app.admin.focus {
        AdminFocus::Urls => handle_url_entry(app, key),
        AdminFocus::Files => handle_file_list(app, key).await,
    }
}

fn handle_url_entry(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Enter => app.add_pending_url(),
        KeyCode::Backspace => {
            app.admin.url_input.pop();
        }
        KeyCode::Delete => app.remove_last_url(),
        KeyCode::Char(ch) => app.admin.url_input.push(ch),
        _ => {}
    }
}

async fn handle_file_list(app: &mut App, key: KeyCode) {
    let len = app.admin.files.len();
    match key {
        KeyCode::Up => app.admin.selected_file = wrap_decrement(app.admin.selected_file, len),
        KeyCode::Down => app.admin.selected_file = wrap_increment(app.admin.selected_file, len),
        KeyCode::Enter => app.preview_selected_file().await,
        KeyCode::Char('d') => app.download_selected_file().await,
        KeyCode::Char('q') => app.leave_admin(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::AppScreen;

    #[tokio::test]
    async fn url_entry_collects_lines_and_flags_toggle() {
        let mut app = App::new();
        app.screen = AppScreen::Admin;

        for ch in "https://a.example".chars() {
            handle_admin_input(&mut app, KeyCode::Char(ch)).await;
        }
        handle_admin_input(&mut app, KeyCode::Enter).await;
        handle_admin_input(&mut app, KeyCode::F(3)).await;

        assert_eq!(app.admin.urls, vec!["https://a.example"]);
        assert!(app.admin.url_input.is_empty());
        assert!(!app.admin.update_main_csv);
        assert!(app.admin.create_backup);

        handle_admin_input(&mut app, KeyCode::Delete).await;
        assert!(app.admin.urls.is_empty());
    }

    #[tokio::test]
    async fn escape_returns_to_the_dashboard() {
        let mut app = App::new();
        app.enter_admin();
        assert_eq!(app.screen, AppScreen::Admin);

        handle_admin_input(&mut app, KeyCode::Esc).await;
        assert_eq!(app.screen, AppScreen::Dashboard);
        assert!(app.admin.poller.is_none());
    }
}
