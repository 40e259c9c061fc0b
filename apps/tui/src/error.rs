use thiserror::Error;

/// Failure to obtain one of the source tables. Aborts the whole load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch {table}: {source}")]
    Transport {
        table: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {table}: HTTP {status}")]
    Status { table: String, status: u16 },

    #[error("failed to read {table}: {source}")]
    Io {
        table: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{table} is not valid CSV: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid data source {0:?}")]
    InvalidSource(String),
}

/// Any failed call against the extraction backend.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Api(String),

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("No URLs provided")]
    NoUrls,

    #[error("invalid backend address {0:?}")]
    InvalidBaseUrl(String),

    #[error("failed to save download: {0}")]
    Io(#[from] std::io::Error),
}
