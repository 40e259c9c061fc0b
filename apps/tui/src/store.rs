use chrono::{Local, NaiveDateTime};

use crate::domain::Incident;
use crate::filter::{DateWindow, FilterState};
use crate::views::{
    grid_cards, map_markers, stats_summary, timeline_items, ActiveView, Card, MapModel,
    StatsSummary, TimelineItem,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Loaded,
    FilterChanged,
    ViewChanged,
}

/// Read-only view of the store handed to listeners.
pub struct Snapshot<'a> {
    pub incidents: &'a [Incident],
    pub filtered: &'a [usize],
    pub view: ActiveView,
}

pub trait StoreListener {
    fn on_change(&mut self, event: StoreEvent, snapshot: &Snapshot<'_>);
}

type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Master and filtered incident sets plus the filter and view selection.
///
/// Every mutation recomputes synchronously and then notifies listeners.
pub struct IncidentStore {
    incidents: Vec<Incident>,
    filtered: Vec<usize>,
    filter: FilterState,
    view: ActiveView,
    clock: Clock,
    listeners: Vec<Box<dyn StoreListener>>,
}

impl std::fmt::Debug for IncidentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncidentStore")
            .field("incidents", &self.incidents.len())
            .field("filtered", &self.filtered.len())
            .field("filter", &self.filter)
            .field("view", &self.view)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for IncidentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IncidentStore {
    pub fn new() -> Self {
        Self::with_clock(local_now)
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            incidents: Vec::new(),
            filtered: Vec::new(),
            filter: FilterState::default(),
            view: ActiveView::default(),
            clock,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn StoreListener>) {
        self.listeners.push(listener);
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn filtered(&self) -> &[usize] {
        &self.filtered
    }

    pub const fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub const fn view(&self) -> ActiveView {
        self.view
    }

    /// First incident with the id, in master order.
    pub fn find_incident(&self, id: &str) -> Option<(usize, &Incident)> {
        self.incidents
            .iter()
            .enumerate()
            .find(|(_, incident)| incident.id == id)
    }

    pub fn replace_incidents(&mut self, incidents: Vec<Incident>) {
        self.incidents = incidents;
        self.recompute();
        self.notify(StoreEvent::Loaded);
    }

    pub fn clear(&mut self) {
        self.replace_incidents(Vec::new());
    }

    pub fn set_search(&mut self, term: &str) {
        if self.filter.search_term == term {
            return;
        }
        self.filter.search_term = term.to_string();
        self.refilter();
    }

    pub fn set_type_filter(&mut self, kind: &str) {
        if self.filter.type_filter == kind {
            return;
        }
        self.filter.type_filter = kind.to_string();
        self.refilter();
    }

    pub fn set_date_window(&mut self, window: DateWindow) {
        if self.filter.date_window == window {
            return;
        }
        self.filter.date_window = window;
        self.refilter();
    }

    pub fn clear_filters(&mut self) {
        if !self.filter.is_active() {
            return;
        }
        self.filter = FilterState::default();
        self.refilter();
    }

    pub fn set_view(&mut self, view: ActiveView) {
        if self.view == view {
            return;
        }
        self.view = view;
        self.notify(StoreEvent::ViewChanged);
    }

    fn refilter(&mut self) {
        self.recompute();
        self.notify(StoreEvent::FilterChanged);
    }

    fn recompute(&mut self) {
        let now = (self.clock)();
        self.filtered = self.filter.apply(&self.incidents, now);
        tracing::debug!(
            shown = self.filtered.len(),
            total = self.incidents.len(),
            "filtered incident set recomputed"
        );
    }

    fn notify(&mut self, event: StoreEvent) {
        let snapshot = Snapshot {
            incidents: &self.incidents,
            filtered: &self.filtered,
            view: self.view,
        };
        for listener in &mut self.listeners {
            listener.on_change(event, &snapshot);
        }
    }
}

/// Rendered models for each view; only the active view is rebuilt.
#[derive(Debug, Default, Clone)]
pub struct ViewModels {
    pub grid: Vec<Card>,
    pub map: MapModel,
    pub timeline: Vec<TimelineItem>,
    pub stats: StatsSummary,
    /// How many times each view model has been rebuilt, by `ActiveView::index`.
    pub builds: [usize; 3],
}

impl ViewModels {
    pub fn rebuild(&mut self, view: ActiveView, incidents: &[Incident], filtered: &[usize]) {
        match view {
            ActiveView::Grid => self.grid = grid_cards(incidents, filtered),
            ActiveView::Map => self.map = map_markers(incidents, filtered),
            ActiveView::Timeline => self.timeline = timeline_items(incidents, filtered),
        }
        self.builds[view.index()] += 1;
    }
}

/// Store listener that keeps [`ViewModels`] in sync and shares them with the UI.
#[derive(Debug, Clone, Default)]
pub struct ViewCache {
    models: std::rc::Rc<std::cell::RefCell<ViewModels>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn models(&self) -> std::cell::Ref<'_, ViewModels> {
        self.models.borrow()
    }
}

impl StoreListener for ViewCache {
    fn on_change(&mut self, event: StoreEvent, snapshot: &Snapshot<'_>) {
        let mut models = self.models.borrow_mut();
        match event {
            StoreEvent::Loaded | StoreEvent::FilterChanged => {
                models.stats = stats_summary(snapshot.incidents, snapshot.filtered);
                models.rebuild(snapshot.view, snapshot.incidents, snapshot.filtered);
            }
            StoreEvent::ViewChanged => {
                models.rebuild(snapshot.view, snapshot.incidents, snapshot.filtered);
            }
        }
    }
}
