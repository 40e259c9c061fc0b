use chrono::{DateTime, Utc};
use color_eyre::Result;
use throbber_widgets_tui::ThrobberState;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::admin::{
    ExtractedFile, ExtractionStatistics, ExtractionStatus, FilePreview, PollEvent, StatusPoller,
    UrlValidation,
};
use crate::app::actions::AppActions;
use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use crate::config::AppConfig;
use crate::data::LoadOutcome;
use crate::domain::{Incident, IncidentType, Theme};
use crate::error::LoadError;
use crate::filter::DateWindow;
use crate::store::{IncidentStore, ViewCache};
use crate::views::ActiveView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Dashboard,
    IncidentDetail,
    NotFound,
    Admin,
}

/// What keystrokes on the dashboard currently edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    GotoId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminFocus {
    #[default]
    Urls,
    Files,
}

/// Form and result state of the extraction admin screen.
#[derive(Debug, Default)]
pub struct AdminState {
    pub focus: AdminFocus,
    pub url_input: String,
    pub urls: Vec<String>,
    pub update_main_csv: bool,
    pub create_backup: bool,
    pub validation: Option<(String, UrlValidation)>,
    pub status: Option<ExtractionStatus>,
    pub files: Vec<ExtractedFile>,
    pub selected_file: usize,
    pub preview: Option<(String, FilePreview)>,
    pub statistics: Option<ExtractionStatistics>,
    pub alert: Option<String>,
    pub notice: Option<String>,
    pub poller: Option<StatusPoller>,
    pub poll_rx: Option<UnboundedReceiver<PollEvent>>,
}

impl AdminState {
    pub fn new() -> Self {
        Self {
            update_main_csv: true,
            create_backup: true,
            ..Self::default()
        }
    }

    pub fn is_extracting(&self) -> bool {
        self.status.as_ref().is_some_and(|status| status.running)
    }

    pub fn stop_polling(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
        self.poll_rx = None;
    }
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub screen: AppScreen,
    pub show_help: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub store: IncidentStore,
    pub views: ViewCache,
    pub theme: Theme,
    pub selected_index: usize,
    pub type_options: Vec<String>,
    pub detail_id: Option<String>,
    pub detail_scroll: u16,
    pub not_found_id: Option<String>,
    pub status_message: String,
    pub banner: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub load_warnings: usize,
    pub admin: AdminState,
    pub throbber: ThrobberState,
    pub actions: AppActions,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self::with_store(IncidentStore::new())
    }

    /// Wires a store to a fresh view cache.
    pub fn with_store(mut store: IncidentStore) -> Self {
        let views = ViewCache::new();
        store.subscribe(Box::new(views.clone()));

        Self {
            running: true,
            screen: AppScreen::Dashboard,
            show_help: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            store,
            views,
            theme: Theme::default(),
            selected_index: 0,
            type_options: type_options(&[]),
            detail_id: None,
            detail_scroll: 0,
            not_found_id: None,
            status_message: String::new(),
            banner: None,
            loaded_at: None,
            load_warnings: 0,
            admin: AdminState::new(),
            throbber: ThrobberState::default(),
            actions: AppActions::new(),
        }
    }

    /// Connects collaborators, restores the theme and performs the initial load.
    pub async fn initialize(&mut self, config: &AppConfig) -> Result<()> {
        self.actions = AppActions::from_config(config)?;

        match config.database_url() {
            Ok(url) => {
                if let Err(error) = self.actions.connect_settings(&url).await {
                    tracing::warn!(%error, "settings database unavailable, theme will not persist");
                }
            }
            Err(error) => tracing::warn!(%error, "invalid settings database path"),
        }

        if self.actions.db_pool.is_some() {
            match self.actions.load_theme().await {
                Ok(theme) => self.theme = theme,
                Err(error) => tracing::warn!(%error, "failed to read stored theme"),
            }
        }

        self.reload().await;
        Ok(())
    }

    pub async fn reload(&mut self) {
        self.status_message = "Loading incidents...".to_string();
        match self.actions.load_incidents().await {
            Ok(outcome) => self.apply_load(outcome),
            Err(error) => self.apply_load_failure(&error),
        }
    }

    pub fn apply_load(&mut self, outcome: LoadOutcome) {
        self.load_warnings = outcome.warnings.len();
        self.loaded_at = Some(outcome.loaded_at);
        self.banner = None;
        self.type_options = type_options(&outcome.incidents);

        let count = outcome.incidents.len();
        self.store.replace_incidents(outcome.incidents);
        self.clamp_selection();

        self.status_message = if self.load_warnings == 0 {
            format!("Loaded {count} incidents")
        } else {
            format!(
                "Loaded {count} incidents ({} row warnings, see log)",
                self.load_warnings
            )
        };
    }

    /// A failed load leaves nothing on screen but the banner.
    pub fn apply_load_failure(&mut self, error: &LoadError) {
        tracing::error!(%error, "incident load failed");
        self.store.clear();
        self.type_options = type_options(&[]);
        self.selected_index = 0;
        self.banner = Some(format!("Could not load incident data: {error}. Press r to retry."));
        self.status_message.clear();
    }

    pub async fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        if self.actions.db_pool.is_none() {
            return;
        }
        if let Err(error) = self.actions.save_theme(self.theme).await {
            tracing::warn!(%error, "failed to persist theme");
            self.status_message = format!("Theme not saved: {error}");
        }
    }

    pub fn visible_len(&self) -> usize {
        let models = self.views.models();
        match self.store.view() {
            ActiveView::Grid => models.grid.len(),
            ActiveView::Map => models.map.markers.len(),
            ActiveView::Timeline => models.timeline.len(),
        }
    }

    /// Master index of the highlighted entry in the active view.
    pub fn selected_master_index(&self) -> Option<usize> {
        let models = self.views.models();
        match self.store.view() {
            ActiveView::Grid => models.grid.get(self.selected_index).map(|card| card.index),
            ActiveView::Map => models
                .map
                .markers
                .get(self.selected_index)
                .map(|marker| marker.index),
            ActiveView::Timeline => models
                .timeline
                .get(self.selected_index)
                .map(|item| item.index),
        }
    }

    pub fn select_next(&mut self) {
        self.selected_index = wrap_increment(self.selected_index, self.visible_len());
    }

    pub fn select_previous(&mut self) {
        self.selected_index = wrap_decrement(self.selected_index, self.visible_len());
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }

    pub fn set_view(&mut self, view: ActiveView) {
        self.store.set_view(view);
        self.selected_index = 0;
    }

    pub fn next_view(&mut self) {
        let index = wrap_increment(self.store.view().index(), ActiveView::ALL.len());
        self.set_view(ActiveView::from_index(index).unwrap_or_default());
    }

    pub fn previous_view(&mut self) {
        let index = wrap_decrement(self.store.view().index(), ActiveView::ALL.len());
        self.set_view(ActiveView::from_index(index).unwrap_or_default());
    }

    pub fn cycle_type_filter(&mut self) {
        let current = &self.store.filter().type_filter;
        let position = self
            .type_options
            .iter()
            .position(|option| option == current)
            .unwrap_or(0);
        let next = wrap_increment(position, self.type_options.len());
        let kind = self.type_options.get(next).cloned().unwrap_or_default();
        self.store.set_type_filter(&kind);
        self.clamp_selection();
    }

    pub fn cycle_date_window(&mut self) {
        let next: DateWindow = self.store.filter().date_window.next();
        self.store.set_date_window(next);
        self.clamp_selection();
    }

    pub fn set_search(&mut self, term: &str) {
        self.store.set_search(term);
        self.clamp_selection();
    }

    pub fn clear_filters(&mut self) {
        self.store.clear_filters();
        self.input_buffer.clear();
        self.clamp_selection();
    }

    pub fn open_selected(&mut self) {
        let id = self
            .selected_master_index()
            .and_then(|index| self.store.incidents().get(index))
            .map(|incident| incident.id.clone());
        if let Some(id) = id {
            self.open_incident(&id);
        }
    }

    /// Opens the detail modal; an unknown id shows the not-found dialog instead.
    pub fn open_incident(&mut self, id: &str) {
        let id = id.trim();
        if self.store.find_incident(id).is_some() {
            self.detail_id = Some(id.to_string());
            self.detail_scroll = 0;
            self.screen = AppScreen::IncidentDetail;
        } else {
            tracing::info!(%id, "incident lookup missed");
            self.not_found_id = Some(id.to_string());
            self.screen = AppScreen::NotFound;
        }
    }

    pub fn close_modal(&mut self) {
        self.detail_id = None;
        self.not_found_id = None;
        self.screen = AppScreen::Dashboard;
    }

    pub fn detail_incident(&self) -> Option<&Incident> {
        let id = self.detail_id.as_deref()?;
        self.store.find_incident(id).map(|(_, incident)| incident)
    }

    /// Applies everything the status poller sent since the last frame.
    ///
    /// Returns true when an extraction run has just completed.
    pub fn drain_poll_events(&mut self) -> bool {
        let mut finished = false;
        let Some(rx) = self.admin.poll_rx.as_mut() else {
            return false;
        };

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        for event in events {
            match event {
                PollEvent::Status(status) => {
                    self.admin.alert = None;
                    self.admin.status = Some(status);
                }
                PollEvent::Failed(message) => {
                    self.admin.alert = Some(format!("Status check failed: {message}"));
                }
                PollEvent::Finished(status) => {
                    self.admin.notice = Some(status.message.clone());
                    self.admin.status = Some(status);
                    finished = true;
                }
            }
        }

        if self.admin.is_extracting() {
            self.throbber.calc_next();
        }
        finished
    }

    pub fn enter_admin(&mut self) {
        self.screen = AppScreen::Admin;
        self.start_polling(None);
    }

    pub fn leave_admin(&mut self) {
        self.admin.stop_polling();
        self.screen = AppScreen::Dashboard;
    }

    /// `baseline` is the status shown before a run was requested, if any.
    pub fn start_polling(&mut self, baseline: Option<ExtractionStatus>) {
        self.admin.stop_polling();
        match self.actions.poller() {
            Ok(mut poller) => {
                self.admin.poll_rx = Some(poller.start_after(baseline));
                self.admin.poller = Some(poller);
            }
            Err(error) => self.admin.alert = Some(error.to_string()),
        }
    }
}

/// Type filter choices: any, the known types, then other types present in the data.
pub fn type_options(incidents: &[Incident]) -> Vec<String> {
    let mut options = vec![String::new()];
    options.extend(IncidentType::KNOWN.iter().map(|kind| kind.as_str().to_string()));
    for incident in incidents {
        let kind = incident.kind.as_str();
        if !kind.is_empty() && !options.iter().any(|option| option == kind) {
            options.push(kind.to_string());
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{assemble_incidents, RawRow};
    use chrono::{NaiveDate, NaiveDateTime};

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap_or_default()
    }

    fn loaded_app() -> App {
        let mut app = App::with_store(IncidentStore::with_clock(fixed_now));
        let rows = vec![
            RawRow::new()
                .with("id", "w1")
                .with("title", "Well poisoned")
                .with("type", "water")
                .with("date", "2024-06-14"),
            RawRow::new()
                .with("id", "h1")
                .with("title", "Bakery closed")
                .with("type", "hunger")
                .with("date", "2024-01-01"),
            RawRow::new()
                .with("id", "x1")
                .with("title", "Shelter flooded")
                .with("type", "shelter"),
        ];
        let assembled = assemble_incidents(&rows, &[]);
        app.apply_load(LoadOutcome {
            incidents: assembled.incidents,
            warnings: assembled.warnings,
            dropped_without_id: 0,
            loaded_at: Utc::now(),
        });
        app
    }

    #[test]
    fn load_failure_empties_the_store_and_raises_a_banner() {
        let mut app = loaded_app();
        app.apply_load_failure(&LoadError::Status {
            table: "incidents.csv".to_string(),
            status: 503,
        });

        assert!(app.store.incidents().is_empty());
        assert!(app.store.filtered().is_empty());
        assert!(app.banner.as_deref().is_some_and(|b| b.contains("503")));
    }

    #[test]
    fn type_cycle_includes_types_found_in_data() {
        let mut app = loaded_app();
        assert_eq!(app.type_options.last().map(String::as_str), Some("shelter"));

        app.cycle_type_filter();
        assert_eq!(app.store.filter().type_filter, "hunger");
        assert_eq!(app.visible_len(), 1);

        for _ in 0..6 {
            app.cycle_type_filter();
        }
        assert_eq!(app.store.filter().type_filter, "");
    }

    #[test]
    fn selection_opens_the_selected_incident() {
        let mut app = loaded_app();
        app.select_next();
        app.open_selected();

        assert_eq!(app.screen, AppScreen::IncidentDetail);
        assert_eq!(app.detail_incident().map(|i| i.id.as_str()), Some("h1"));
    }

    #[test]
    fn unknown_ids_show_the_not_found_dialog() {
        let mut app = loaded_app();
        app.open_incident("nope");

        assert_eq!(app.screen, AppScreen::NotFound);
        assert_eq!(app.not_found_id.as_deref(), Some("nope"));

        app.close_modal();
        assert_eq!(app.screen, AppScreen::Dashboard);
    }

    #[test]
    fn switching_views_resets_selection_to_the_new_list() {
        let mut app = loaded_app();
        app.select_next();
        app.set_view(ActiveView::Timeline);

        assert_eq!(app.selected_index, 0);
        // the undated incident is not on the timeline
        assert_eq!(app.visible_len(), 2);
        assert_eq!(
            app.selected_master_index()
                .and_then(|i| app.store.incidents().get(i))
                .map(|i| i.id.as_str()),
            Some("h1")
        );
    }

    #[test]
    fn narrowing_filters_clamps_the_selection() {
        let mut app = loaded_app();
        app.select_previous();
        assert_eq!(app.selected_index, 2);

        app.set_search("well");
        assert_eq!(app.selected_index, 0);
    }
}
