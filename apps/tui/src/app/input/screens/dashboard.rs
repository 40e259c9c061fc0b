use crate::app::input::helpers::page;
use crate::app::state::{App, InputMode};
use crate::views::ActiveView;
use crossterm::event::KeyCode;

pub async fn handle_dashboard_input(app: &mut App, key: KeyCode) {
    match app.input_mode {
        InputMode::Search => handle_search_input(app, key),
        InputMode::GotoId => handle_goto_input(app, key),
        InputMode::Normal => handle_normal_input(app, key).await,
    }
}

/// Search filters live on every keystroke.
fn handle_search_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc | KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            app.input_buffer.pop();
            let term = app.input_buffer.clone();
            app.set_search(&term);
        }
        KeyCode::Char(ch) => {
            app.input_buffer.push(ch);
            let term = app.input_buffer.clone();
            app.set_search(&term);
        }
        _ => {}
    }
}

fn handle_goto_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => {
            app.input_buffer.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            let id = std::mem::take(&mut app.input_buffer);
            app.input_mode = InputMode::Normal;
            if !id.trim().is_empty() {
                app.open_incident(&id);
            }
        }
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(ch) => app.input_buffer.push(ch),
        _ => {}
    }
}

async fn handle_normal_input(app: &mut App, key: KeyCode) {
    let len = app.visible_len();

    match key {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('/') => {
            app.input_buffer = app.store.filter().search_term.clone();
            app.input_mode = InputMode::Search;
        }
        KeyCode::Char('g') => {
            app.input_buffer.clear();
            app.input_mode = InputMode::GotoId;
        }
        KeyCode::Char('t') => app.cycle_type_filter(),
        KeyCode::Char('d') => app.cycle_date_window(),
        KeyCode::Char('c') => app.clear_filters(),
        KeyCode::Char('1') => app.set_view(ActiveView::Grid),
        KeyCode::Char('2') => app.set_view(ActiveView::Map),
        KeyCode::Char('3') => app.set_view(ActiveView::Timeline),
        KeyCode::Right | KeyCode::Tab => app.next_view(),
        KeyCode::Left | KeyCode::BackTab => app.previous_view(),
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        KeyCode::PageUp => app.selected_index = page(app.selected_index, len, -10),
        KeyCode::PageDown => app.selected_index = page(app.selected_index, len, 10),
        KeyCode::Home => app.selected_index = 0,
        KeyCode::End => app.selected_index = len.saturating_sub(1),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('r') => app.reload().await,
        KeyCode::Char('T') => app.toggle_theme().await,
        KeyCode::Char('a') => {
            app.enter_admin();
            app.refresh_admin().await;
        }
        KeyCode::Esc => {
            app.banner = None;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::AppScreen;
    use crate::data::{assemble_incidents, LoadOutcome, RawRow};

    fn app_with(titles: &[&str]) -> App {
        let mut app = App::new();
        let rows: Vec<RawRow> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                RawRow::new()
                    .with("id", &format!("id-{i}"))
                    .with("title", title)
                    .with("type", "aid")
            })
            .collect();
        app.apply_load(LoadOutcome {
            incidents: assemble_incidents(&rows, &[]).incidents,
            warnings: Vec::new(),
            dropped_without_id: 0,
            loaded_at: chrono::Utc::now(),
        });
        app
    }

    async fn type_keys(app: &mut App, keys: &str) {
        for ch in keys.chars() {
            handle_dashboard_input(app, KeyCode::Char(ch)).await;
        }
    }

    #[tokio::test]
    async fn search_mode_filters_while_typing() {
        let mut app = app_with(&["Flour convoy", "Water point", "Flour mill"]);

        handle_dashboard_input(&mut app, KeyCode::Char('/')).await;
        type_keys(&mut app, "flour").await;
        assert_eq!(app.store.filtered(), &[0, 2]);

        // typed characters do not trigger shortcuts while searching
        assert!(app.running);
        handle_dashboard_input(&mut app, KeyCode::Enter).await;
        handle_dashboard_input(&mut app, KeyCode::Char('c')).await;
        assert_eq!(app.store.filtered().len(), 3);
    }

    #[tokio::test]
    async fn goto_opens_by_id() {
        let mut app = app_with(&["One", "Two"]);

        handle_dashboard_input(&mut app, KeyCode::Char('g')).await;
        type_keys(&mut app, "id-1").await;
        handle_dashboard_input(&mut app, KeyCode::Enter).await;

        assert_eq!(app.screen, AppScreen::IncidentDetail);
        assert_eq!(app.detail_incident().map(|i| i.title.as_str()), Some("Two"));
    }

    #[tokio::test]
    async fn view_keys_switch_views() {
        let mut app = app_with(&["One"]);

        handle_dashboard_input(&mut app, KeyCode::Char('3')).await;
        assert_eq!(app.store.view(), ActiveView::Timeline);
        handle_dashboard_input(&mut app, KeyCode::Right).await;
        assert_eq!(app.store.view(), ActiveView::Grid);
        handle_dashboard_input(&mut app, KeyCode::Left).await;
        assert_eq!(app.store.view(), ActiveView::Timeline);
    }

    #[tokio::test]
    async fn quit_stops_the_loop() {
        let mut app = app_with(&[]);
        handle_dashboard_input(&mut app, KeyCode::Char('q')).await;
        assert!(!app.running);
    }
}
