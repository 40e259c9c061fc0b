use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use std::time::Duration;

use crate::app::{handle_input, App};
use crate::cli::CliArgs;
use crate::store::ViewModels;
use crate::ui;
use crate::views::{monthly_counts, ActiveView, StatsSummary};

// Key poll timeout; also the cadence poller events are drained at
const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Run the dashboard without a terminal: apply the CLI filters and print the result
pub async fn run_headless(app: &mut App, args: &CliArgs) -> Result<()> {
    if let Some(banner) = &app.banner {
        return Err(color_eyre::eyre::eyre!("{banner}"));
    }

    let filter = args.filter();
    app.set_search(&filter.search_term);
    app.store.set_type_filter(&filter.type_filter);
    app.store.set_date_window(filter.date_window);
    app.set_view(args.view.unwrap_or_default());

    let report = build_headless_report(app);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_headless_text(&report);
    }

    Ok(())
}

fn render_headless_text(report: &HeadlessReport) {
    let stats = &report.stats;

    println!("\nCrisis Documentation");
    println!("====================");
    println!("Source: {}", report.source);
    println!("Showing {} of {} incidents", stats.shown, stats.total);
    println!("Verified: {}", stats.verified);
    println!("Deaths: {}  Injured: {}", stats.deaths, stats.injured);

    if !report.filters.is_empty() {
        println!("Filters: {}", report.filters.join(", "));
    }

    println!("\nBy type:");
    for (kind, count) in &stats.by_type {
        println!("- {kind}: {count}");
    }

    println!("\n{} view:", report.view);
    for item in &report.items {
        println!(
            "- {} | {} | {} | {} | {}",
            item.id, item.date, item.kind, item.title, item.location
        );
    }

    if report.view == ActiveView::Map.label() && report.skipped > 0 {
        println!("({} incidents without coordinates not shown)", report.skipped);
    }

    if !report.months.is_empty() {
        println!("\nPer month:");
        for (month, count) in &report.months {
            println!("- {month}: {count}");
        }
    }
}

fn build_headless_report(app: &App) -> HeadlessReport {
    let models = app.views.models();
    let view = app.store.view();
    let filter = app.store.filter();

    let mut filters = Vec::new();
    if !filter.search_term.trim().is_empty() {
        filters.push(format!("search \"{}\"", filter.search_term.trim()));
    }
    if !filter.type_filter.is_empty() {
        filters.push(format!("type {}", filter.type_filter));
    }
    if let Some(days) = filter.date_window.lookback_days() {
        filters.push(format!("last {days} days"));
    } else if filter.date_window != crate::filter::DateWindow::Any {
        filters.push(filter.date_window.label().to_lowercase());
    }

    HeadlessReport {
        source: app
            .actions
            .loader
            .as_ref()
            .map(|loader| loader.source().to_string())
            .unwrap_or_default(),
        loaded_at: app.loaded_at.map(|at| at.to_rfc3339()),
        view: view.label(),
        filters,
        stats: models.stats.clone(),
        items: headless_items(app, &models, view),
        skipped: models.map.skipped,
        months: if view == ActiveView::Timeline {
            monthly_counts(&models.timeline)
        } else {
            Vec::new()
        },
    }
}

fn headless_items(app: &App, models: &ViewModels, view: ActiveView) -> Vec<HeadlessItem> {
    let indices: Vec<usize> = match view {
        ActiveView::Grid => models.grid.iter().map(|card| card.index).collect(),
        ActiveView::Map => models.map.markers.iter().map(|m| m.index).collect(),
        ActiveView::Timeline => models.timeline.iter().map(|item| item.index).collect(),
    };

    indices
        .into_iter()
        .filter_map(|index| app.store.incidents().get(index))
        .map(|incident| HeadlessItem {
            id: incident.id.clone(),
            title: incident.title.clone(),
            kind: incident.kind.as_str().to_string(),
            date: incident.date.clone(),
            location: incident.location.name.clone(),
            coordinates: incident
                .location
                .coordinates
                .map(|point| [point.lng, point.lat]),
            verified: incident.verified.as_str(),
        })
        .collect()
}

#[derive(serde::Serialize)]
struct HeadlessReport {
    source: String,
    loaded_at: Option<String>,
    view: &'static str,
    filters: Vec<String>,
    stats: StatsSummary,
    items: Vec<HeadlessItem>,
    skipped: usize,
    months: Vec<(String, u64)>,
}

#[derive(serde::Serialize)]
struct HeadlessItem {
    id: String,
    title: String,
    #[serde(rename = "type")]
    kind: String,
    date: String,
    location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    coordinates: Option<[f64; 2]>,
    verified: &'static str,
}

/// Run the main application event loop
pub async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(event::poll(EVENT_POLL_TIMEOUT), Ok(true)) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Err(error) = handle_input(app, key.code).await {
                        tracing::error!(%error, "input handling failed");
                        app.status_message = format!("Error: {error}");
                    }
                    if !app.running {
                        break;
                    }
                }
                // resizes are picked up by the next draw
                Ok(_) | Err(_) => {}
            }
        }

        if app.drain_poll_events() {
            app.refresh_admin().await;
        }
    }

    app.admin.stop_polling();
    Ok(())
}
