use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::admin::client::{AdminClient, ExtractionStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    Status(ExtractionStatus),
    /// A single status request failed; polling carries on.
    Failed(String),
    /// A run that was observed in progress has finished.
    Finished(ExtractionStatus),
}

/// Periodically fetches `/api/status` until stopped or a run completes.
///
/// At most one polling task exists per poller; starting again replaces it.
#[derive(Debug)]
pub struct StatusPoller {
    client: AdminClient,
    interval: Duration,
    task: Option<(CancellationToken, JoinHandle<()>)>,
}

impl StatusPoller {
    pub const fn new(client: AdminClient, interval: Duration) -> Self {
        Self {
            client,
            interval,
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_finished())
    }

    pub fn start(&mut self) -> mpsc::UnboundedReceiver<PollEvent> {
        self.start_after(None)
    }

    /// Starts polling for a run requested while `baseline` was the last known status.
    ///
    /// An idle status that differs from the baseline counts as a finished run,
    /// so runs that start and end between two ticks are not missed.
    pub fn start_after(
        &mut self,
        baseline: Option<ExtractionStatus>,
    ) -> mpsc::UnboundedReceiver<PollEvent> {
        self.stop();

        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let handle = tokio::spawn(poll_status(
            self.client.clone(),
            self.interval,
            baseline.as_ref().map(RunMarker::of),
            token.clone(),
            tx,
        ));
        tracing::debug!(interval_ms = self.interval.as_millis(), "status polling started");

        self.task = Some((token, handle));
        rx
    }

    pub fn stop(&mut self) {
        if let Some((token, handle)) = self.task.take() {
            token.cancel();
            handle.abort();
            tracing::debug!("status polling stopped");
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The status fields a completed or failed run rewrites.
#[derive(Debug, PartialEq, Eq)]
struct RunMarker {
    message: String,
    last_extraction: Option<String>,
    output_file: Option<String>,
}

impl RunMarker {
    fn of(status: &ExtractionStatus) -> Self {
        Self {
            message: status.message.clone(),
            last_extraction: status.last_extraction.clone(),
            output_file: status.output_file.clone(),
        }
    }
}

async fn poll_status(
    client: AdminClient,
    interval: Duration,
    mut baseline: Option<RunMarker>,
    token: CancellationToken,
    tx: mpsc::UnboundedSender<PollEvent>,
) {
    let mut ticker = tokio::time::interval(interval);
    let mut seen_running = false;

    loop {
        tokio::select! {
            () = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let event = match client.status().await {
            Ok(status) => {
                let marker = RunMarker::of(&status);
                let changed = baseline.as_ref().is_some_and(|seen| *seen != marker);
                if !status.running && (seen_running || changed) {
                    PollEvent::Finished(status)
                } else {
                    seen_running |= status.running;
                    baseline.get_or_insert(marker);
                    PollEvent::Status(status)
                }
            }
            Err(error) => {
                tracing::warn!(%error, "status poll failed");
                PollEvent::Failed(error.to_string())
            }
        };

        let finished = matches!(event, PollEvent::Finished(_));
        if tx.send(event).is_err() || finished {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::client::test_server::serve;

    fn status(running: bool, progress: u8) -> (&'static str, String) {
        (
            "200 OK",
            format!(r#"{{"running":{running},"progress":{progress},"message":"m","total_urls":2,"processed_urls":1}}"#),
        )
    }

    #[tokio::test]
    async fn stops_by_itself_when_a_run_completes() {
        let (base, _) = serve(vec![status(true, 50), status(true, 90), status(false, 100)]).await;
        let client = AdminClient::new(&base).unwrap();
        let mut poller = StatusPoller::new(client, Duration::from_millis(10));

        let mut rx = poller.start();
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], PollEvent::Status(s) if s.progress == 50));
        assert!(matches!(&events[2], PollEvent::Finished(s) if s.progress == 100));
        poller.stop();
    }

    #[tokio::test]
    async fn run_finished_between_ticks_is_detected_from_the_baseline() {
        let before = ExtractionStatus {
            message: "Ready".to_string(),
            ..ExtractionStatus::default()
        };
        let done = r#"{"running":false,"progress":100,"message":"Extraction completed! 2 articles processed.","total_urls":2,"processed_urls":2,"last_extraction":"2024-06-01T10:00:00","output_file":"web_extraction_1.csv"}"#;
        let (base, _) = serve(vec![("200 OK", done.to_string())]).await;
        let client = AdminClient::new(&base).unwrap();
        let mut poller = StatusPoller::new(client, Duration::from_millis(10));

        let mut rx = poller.start_after(Some(before));
        assert!(matches!(
            rx.recv().await,
            Some(PollEvent::Finished(s)) if s.output_file.as_deref() == Some("web_extraction_1.csv")
        ));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn fast_failure_only_changes_the_message() {
        let before = ExtractionStatus {
            message: "Ready".to_string(),
            ..ExtractionStatus::default()
        };
        let failed = r#"{"running":false,"progress":0,"message":"Extraction failed: timeout","total_urls":1,"processed_urls":0}"#;
        let (base, _) = serve(vec![("200 OK", failed.to_string())]).await;
        let client = AdminClient::new(&base).unwrap();
        let mut poller = StatusPoller::new(client, Duration::from_millis(10));

        let mut rx = poller.start_after(Some(before));
        assert!(matches!(rx.recv().await, Some(PollEvent::Finished(s)) if s.message.starts_with("Extraction failed")));
    }

    #[tokio::test]
    async fn idle_backend_keeps_polling_until_stopped() {
        let (base, _) = serve(vec![status(false, 0), status(false, 0), status(false, 0)]).await;
        let client = AdminClient::new(&base).unwrap();
        let mut poller = StatusPoller::new(client, Duration::from_millis(10));

        let mut rx = poller.start();
        assert!(matches!(rx.recv().await, Some(PollEvent::Status(_))));
        assert!(poller.is_running());

        poller.stop();
        assert!(!poller.is_running());
        while rx.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn failures_are_reported_without_stopping() {
        let (base, _) = serve(vec![
            ("500 Internal Server Error", String::new()),
            status(true, 10),
            status(false, 100),
        ])
        .await;
        let client = AdminClient::new(&base).unwrap();
        let mut poller = StatusPoller::new(client, Duration::from_millis(10));

        let mut rx = poller.start();
        assert!(matches!(rx.recv().await, Some(PollEvent::Failed(_))));
        assert!(matches!(rx.recv().await, Some(PollEvent::Status(_))));
        assert!(matches!(rx.recv().await, Some(PollEvent::Finished(_))));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn restarting_replaces_the_previous_task() {
        let client = AdminClient::new("http://127.0.0.1:9").unwrap();
        let mut poller = StatusPoller::new(client, Duration::from_secs(60));

        let mut first = poller.start();
        let _second = poller.start();

        // the first channel closes once its task is cancelled
        assert!(first.recv().await.is_none());
        poller.stop();
    }
}
