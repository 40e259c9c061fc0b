use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use reqwest::Url;

use crate::data::assembler::{assemble_incidents, RowWarning};
use crate::data::rows::{parse_table, ParsedTable};
use crate::domain::Incident;
use crate::error::LoadError;

/// Where the two source tables live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Http(Url),
    Directory(PathBuf),
}

impl DataSource {
    pub fn parse(value: &str) -> Result<Self, LoadError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(LoadError::InvalidSource(value.to_string()));
        }

        if value.starts_with("http://") || value.starts_with("https://") {
            let mut base = value.to_string();
            if !base.ends_with('/') {
                base.push('/');
            }
            return Url::parse(&base)
                .map(Self::Http)
                .map_err(|_| LoadError::InvalidSource(value.to_string()));
        }

        Ok(Self::Directory(PathBuf::from(value)))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::Directory(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableNames {
    pub incidents: String,
    pub details: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            incidents: "incidents.csv".to_string(),
            details: "casualties-details.csv".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub incidents: Vec<Incident>,
    pub warnings: Vec<RowWarning>,
    pub dropped_without_id: usize,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct IncidentLoader {
    source: DataSource,
    tables: TableNames,
    http: reqwest::Client,
}

impl IncidentLoader {
    pub fn new(source: DataSource, tables: TableNames) -> Self {
        Self {
            source,
            tables,
            http: reqwest::Client::new(),
        }
    }

    pub const fn source(&self) -> &DataSource {
        &self.source
    }

    /// Fetches both tables one after the other and assembles the incident set.
    ///
    /// A failure on either table fails the whole load.
    pub async fn load(&self) -> Result<LoadOutcome, LoadError> {
        tracing::info!(source = %self.source, "loading incident tables");

        let incidents_table = self.fetch_table(&self.tables.incidents).await?;
        let details_table = self.fetch_table(&self.tables.details).await?;

        let mut warnings: Vec<RowWarning> = Vec::new();
        for (table, parsed) in [
            ("incidents", &incidents_table),
            ("casualty details", &details_table),
        ] {
            warnings.extend(parsed.warnings.iter().map(|warning| RowWarning {
                table,
                row: warning.row,
                field: String::new(),
                message: warning.message.clone(),
            }));
        }

        let assembled = assemble_incidents(&incidents_table.rows, &details_table.rows);
        warnings.extend(assembled.warnings);

        tracing::info!(
            incidents = assembled.incidents.len(),
            details = details_table.rows.len(),
            warnings = warnings.len(),
            "incident tables loaded"
        );

        Ok(LoadOutcome {
            incidents: assembled.incidents,
            warnings,
            dropped_without_id: assembled.dropped_without_id,
            loaded_at: Utc::now(),
        })
    }

    async fn fetch_table(&self, name: &str) -> Result<ParsedTable, LoadError> {
        let text = match &self.source {
            DataSource::Http(base) => self.fetch_remote(base, name).await?,
            DataSource::Directory(dir) => {
                let path = dir.join(name);
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| LoadError::Io {
                        table: name.to_string(),
                        source,
                    })?
            }
        };

        parse_table(&text).map_err(|source| LoadError::Csv {
            table: name.to_string(),
            source,
        })
    }

    async fn fetch_remote(&self, base: &Url, name: &str) -> Result<String, LoadError> {
        let mut url = base
            .join(name)
            .map_err(|_| LoadError::InvalidSource(format!("{base}{name}")))?;
        url.query_pairs_mut()
            .append_pair("v", &cache_buster().to_string());

        tracing::debug!(%url, "fetching table");

        let transport = |source: reqwest::Error| LoadError::Transport {
            table: name.to_string(),
            source,
        };

        let response = self.http.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                table: name.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(transport)
    }
}

fn cache_buster() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const INCIDENTS: &str = "\
ID,Title,Date,Location Name,Location Coordinates Lng,Location Coordinates Lat,Type,Casualties Deaths,Casualties Details IDs
1,Water point hit,2024-05-01,Khan Younis,34.30,31.34,water,3,C1
,No id,2024-05-02,Rafah,,,aid,,
2,Convoy blocked,2024-05-03,Rafah,,,aid,,
";

    const DETAILS: &str = "\
reference_id,incident_id,name,age,published_name
C1,,Yousef,12,true
C2,2,Mariam,,false
";

    fn write_tables(dir: &std::path::Path) {
        fs::write(dir.join("incidents.csv"), INCIDENTS).unwrap();
        fs::write(dir.join("casualties-details.csv"), DETAILS).unwrap();
    }

    #[test]
    fn source_kind_is_picked_from_prefix() {
        assert!(matches!(
            DataSource::parse("https://example.org/data"),
            Ok(DataSource::Http(url)) if url.as_str() == "https://example.org/data/"
        ));
        assert!(matches!(
            DataSource::parse("./data"),
            Ok(DataSource::Directory(_))
        ));
        assert!(DataSource::parse("  ").is_err());
    }

    #[tokio::test]
    async fn loads_and_links_tables_from_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_tables(dir.path());

        let loader = IncidentLoader::new(
            DataSource::Directory(dir.path().to_path_buf()),
            TableNames::default(),
        );
        let outcome = loader.load().await.unwrap();

        assert_eq!(outcome.incidents.len(), 2);
        assert_eq!(outcome.dropped_without_id, 1);
        assert_eq!(outcome.incidents[0].details()[0].name, "Yousef");
        assert_eq!(outcome.incidents[1].details()[0].name, "Mariam");
    }

    #[tokio::test]
    async fn missing_second_table_fails_the_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("incidents.csv"), INCIDENTS).unwrap();

        let loader = IncidentLoader::new(
            DataSource::Directory(dir.path().to_path_buf()),
            TableNames::default(),
        );
        let result = loader.load().await;

        assert!(matches!(result, Err(LoadError::Io { table, .. }) if table == "casualties-details.csv"));
    }

    async fn serve_tables(statuses: [(&'static str, &'static str); 2]) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let mut request_lines = Vec::new();
            for (status, body) in statuses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let mut buffer = vec![0_u8; 4096];
                let read = socket.read(&mut buffer).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buffer[..read]).to_string();
                request_lines.push(request.lines().next().unwrap_or_default().to_string());
                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: text/csv\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
            request_lines
        });

        (format!("http://{addr}/data"), handle)
    }

    #[tokio::test]
    async fn http_fetches_are_sequential_and_cache_busted() {
        let (base, server) = serve_tables([("200 OK", INCIDENTS), ("200 OK", DETAILS)]).await;

        let loader = IncidentLoader::new(DataSource::parse(&base).unwrap(), TableNames::default());
        let outcome = loader.load().await.unwrap();
        let requests = server.await.unwrap();

        assert_eq!(outcome.incidents.len(), 2);
        assert!(requests[0].starts_with("GET /data/incidents.csv?v="));
        assert!(requests[1].starts_with("GET /data/casualties-details.csv?v="));
    }

    #[tokio::test]
    async fn http_error_status_is_a_transport_failure() {
        let (base, _server) = serve_tables([("200 OK", INCIDENTS), ("404 Not Found", "")]).await;

        let loader = IncidentLoader::new(DataSource::parse(&base).unwrap(), TableNames::default());
        let result = loader.load().await;

        assert!(matches!(result, Err(LoadError::Status { status: 404, .. })));
    }
}
