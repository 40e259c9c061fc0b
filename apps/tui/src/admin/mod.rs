//! Client side of the extraction backend: REST calls and status polling.

pub mod client;
pub mod poller;

pub use client::{
    AdminClient, ExtractedFile, ExtractionStarted, ExtractionStatistics, ExtractionStatus,
    FilePreview, UrlValidation,
};
pub use poller::{PollEvent, StatusPoller};
