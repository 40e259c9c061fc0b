use clap::{CommandFactory, Parser};

use crate::domain::IncidentType;
use crate::filter::{DateWindow, FilterState};
use crate::views::ActiveView;

#[derive(Debug, Default, Parser)]
#[command(
    name = "crisis-docs",
    version,
    about = "Terminal dashboard for documented crisis incidents"
)]
pub struct CliArgs {
    /// Print a summary of the filtered incidents and exit
    #[arg(long)]
    pub headless: bool,

    /// Print headless output as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Directory or http(s) base URL holding the incident tables
    #[arg(long, value_name = "PATH|URL")]
    pub data: Option<String>,

    /// Override settings database path
    #[arg(long, value_name = "PATH")]
    pub db: Option<String>,

    /// Override extraction backend address
    #[arg(long = "admin-url", value_name = "URL")]
    pub admin_url: Option<String>,

    /// Override log file path
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,

    /// Headless: free-text search
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Headless: exact incident type
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<String>,

    /// Headless: date window (today, week, month, quarter)
    #[arg(long, value_name = "WINDOW", value_parser = parse_date_window)]
    pub date: Option<DateWindow>,

    /// Headless: view to print (grid, map, timeline)
    #[arg(long, value_name = "VIEW", value_parser = parse_view)]
    pub view: Option<ActiveView>,
}

fn parse_date_window(value: &str) -> Result<DateWindow, String> {
    DateWindow::parse(value).ok_or_else(|| format!("unknown date window {value:?}"))
}

fn parse_view(value: &str) -> Result<ActiveView, String> {
    ActiveView::parse(value).ok_or_else(|| format!("unknown view {value:?}"))
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(data) = &self.data {
            std::env::set_var("DATA_SOURCE", data);
        }
        if let Some(db) = &self.db {
            std::env::set_var("SETTINGS_DB", db);
        }
        if let Some(url) = &self.admin_url {
            std::env::set_var("ADMIN_API_URL", url);
        }
        if let Some(path) = &self.log_file {
            std::env::set_var("LOG_FILE", path);
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    /// Filter selection requested on the command line.
    pub fn filter(&self) -> FilterState {
        FilterState {
            search_term: self.search.clone().unwrap_or_default(),
            type_filter: self
                .kind
                .as_deref()
                .map(|kind| IncidentType::parse(kind).as_str().to_string())
                .unwrap_or_default(),
            date_window: self.date.unwrap_or_default(),
        }
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_filters_parse() {
        let args = CliArgs::try_parse_from([
            "crisis-docs",
            "--headless",
            "--search",
            "well",
            "--type",
            "Water",
            "--date",
            "week",
            "--view",
            "timeline",
        ])
        .unwrap();

        let filter = args.filter();
        assert!(args.headless);
        assert_eq!(filter.search_term, "well");
        assert_eq!(filter.type_filter, "water");
        assert_eq!(filter.date_window, DateWindow::Week);
        assert_eq!(args.view, Some(ActiveView::Timeline));
    }

    #[test]
    fn other_types_keep_their_case() {
        let args = CliArgs::try_parse_from(["crisis-docs", "--type", " Displacement "]).unwrap();
        assert_eq!(args.filter().type_filter, "Displacement");
    }

    #[test]
    fn unknown_date_window_is_rejected() {
        assert!(CliArgs::try_parse_from(["crisis-docs", "--date", "year"]).is_err());
    }

    #[test]
    fn help_mentions_overrides() {
        let help = CliArgs::help_text();
        assert!(help.contains("--admin-url"));
        assert!(help.contains("--data"));
    }
}
