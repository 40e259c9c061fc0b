use crate::admin::client::clean_urls;
use crate::app::state::App;

impl App {
    /// Queues the typed URL; blank input is ignored.
    pub fn add_pending_url(&mut self) {
        let url = self.admin.url_input.trim().to_string();
        if url.is_empty() {
            return;
        }
        self.admin.urls.push(url);
        self.admin.url_input.clear();
    }

    pub fn remove_last_url(&mut self) {
        self.admin.urls.pop();
    }

    /// Queued URLs plus whatever is still in the input line.
    pub fn pending_urls(&self) -> Vec<String> {
        let mut urls = self.admin.urls.clone();
        urls.push(self.admin.url_input.clone());
        clean_urls(&urls)
    }

    pub async fn validate_url(&mut self) {
        let url = match self.admin.url_input.trim() {
            "" => self.admin.urls.last().cloned().unwrap_or_default(),
            typed => typed.to_string(),
        };
        if url.is_empty() {
            self.admin.alert = Some("Enter a URL to validate".to_string());
            return;
        }

        let client = match self.actions.admin() {
            Ok(client) => client.clone(),
            Err(error) => {
                self.admin.alert = Some(error.to_string());
                return;
            }
        };

        match client.validate_url(&url).await {
            Ok(result) => {
                self.admin.alert = None;
                self.admin.validation = Some((url, result));
            }
            Err(error) => self.admin.alert = Some(format!("Validation failed: {error}")),
        }
    }

    pub async fn start_extraction(&mut self) {
        let client = match self.actions.admin() {
            Ok(client) => client.clone(),
            Err(error) => {
                self.admin.alert = Some(error.to_string());
                return;
            }
        };

        let urls = self.pending_urls();
        let result = client
            .start_extraction(&urls, self.admin.update_main_csv, self.admin.create_backup)
            .await;

        match result {
            Ok(started) => {
                self.admin.alert = None;
                self.admin.notice = Some(if started.message.is_empty() {
                    format!("Extraction started for {} URLs", urls.len())
                } else {
                    started.message
                });
                self.admin.urls.clear();
                self.admin.url_input.clear();
                let baseline = self.admin.status.clone();
                self.start_polling(Some(baseline.unwrap_or_default()));
            }
            Err(error) => {
                tracing::warn!(%error, "extraction request rejected");
                self.admin.alert = Some(error.to_string());
            }
        }
    }

    /// Reloads the extracted-file list and the statistics panel.
    pub async fn refresh_admin(&mut self) {
        let client = match self.actions.admin() {
            Ok(client) => client.clone(),
            Err(error) => {
                self.admin.alert = Some(error.to_string());
                return;
            }
        };

        match client.files().await {
            Ok(files) => {
                self.admin.files = files;
                if self.admin.selected_file >= self.admin.files.len() {
                    self.admin.selected_file = self.admin.files.len().saturating_sub(1);
                }
            }
            Err(error) => {
                self.admin.alert = Some(format!("Could not list files: {error}"));
                return;
            }
        }

        match client.statistics().await {
            Ok(statistics) => self.admin.statistics = Some(statistics),
            Err(error) => self.admin.alert = Some(format!("Could not load statistics: {error}")),
        }
    }

    pub async fn preview_selected_file(&mut self) {
        let Some(filename) = self.selected_file_name() else {
            return;
        };
        let client = match self.actions.admin() {
            Ok(client) => client.clone(),
            Err(error) => {
                self.admin.alert = Some(error.to_string());
                return;
            }
        };

        match client.preview(&filename).await {
            Ok(preview) => self.admin.preview = Some((filename, preview)),
            Err(error) => self.admin.alert = Some(format!("Preview failed: {error}")),
        }
    }

    pub async fn download_selected_file(&mut self) {
        let Some(filename) = self.selected_file_name() else {
            return;
        };
        let client = match self.actions.admin() {
            Ok(client) => client.clone(),
            Err(error) => {
                self.admin.alert = Some(error.to_string());
                return;
            }
        };

        let dest = self.actions.download_dir().to_path_buf();
        match client.download(&filename, &dest).await {
            Ok(path) => self.admin.notice = Some(format!("Saved {}", path.display())),
            Err(error) => self.admin.alert = Some(format!("Download failed: {error}")),
        }
    }

    fn selected_file_name(&self) -> Option<String> {
        self.admin
            .files
            .get(self.admin.selected_file)
            .map(|file| file.filename.clone())
    }
}
