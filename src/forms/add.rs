//! Add-feed form lifecycle.

use crate::api::{ApiError, Feed, NewFeed};
use crate::registry::FeedList;

/// Input capture and submission state for the add form.
///
/// Name uniqueness is enforced server-side; the only local check is that
/// neither field is empty (the registry requires both).
#[derive(Debug, Default)]
pub struct AddFeedForm {
    pub name: String,
    pub url: String,
    in_flight: bool,
    success: bool,
    error: Option<String>,
}

impl AddFeedForm {
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Clear everything; called when the form is opened.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Arm a submission and return the draft to POST.
    ///
    /// Returns `None` while a previous submit is still outstanding (the
    /// concurrency guard: no second network call until the first resolves)
    /// or when a required field is empty, which sets a form error instead.
    pub fn begin_submit(&mut self) -> Option<NewFeed> {
        if self.in_flight {
            return None;
        }
        if self.name.is_empty() || self.url.is_empty() {
            self.success = false;
            self.error = Some("name and url are required".to_string());
            return None;
        }

        self.success = false;
        self.error = None;
        self.in_flight = true;
        Some(NewFeed {
            name: self.name.clone(),
            url: self.url.clone(),
        })
    }

    /// Apply the outcome of a submission.
    ///
    /// On success the canonical server record is appended to the shared
    /// collection and the inputs are cleared for the next entry. On failure
    /// the inputs stay as typed for correction and the error's display form
    /// is surfaced (the server message verbatim for rejections). Both arms
    /// re-arm the form.
    pub fn finish(&mut self, list: &mut FeedList, result: Result<Feed, ApiError>) {
        self.in_flight = false;
        match result {
            Ok(feed) => {
                tracing::info!(name = %feed.name, "Feed created");
                list.commit_created(feed);
                self.name.clear();
                self.url.clear();
                self.success = true;
                self.error = None;
            }
            Err(err) => {
                tracing::debug!(error = %err, "Feed create failed");
                self.success = false;
                self.error = Some(err.to_string());
            }
        }
    }
}
