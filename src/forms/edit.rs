//! Edit-feed form lifecycle.

use crate::api::{ApiError, Feed, FeedPatch};
use crate::registry::FeedList;

/// Editable snapshot of the selected feed plus submission state.
///
/// The draft is a value copy: typing into it never touches the shared
/// collection. The entry only changes through `commit_updated` after the
/// server confirms, so a rejected edit leaves the authoritative list
/// untouched.
#[derive(Debug, Default)]
pub struct EditFeedForm {
    target: Option<String>,
    pub url: String,
    pub content_type: String,
    pub marked_for_deletion: bool,
    in_flight: bool,
    success: bool,
    error: Option<String>,
}

impl EditFeedForm {
    /// Name of the feed being edited, if any. Immutable: it is the join key
    /// between the draft and the collection entry.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Snapshot the newly selected feed into the draft.
    ///
    /// Called by the coordinator on every selection transition: the previous
    /// draft is discarded, the status flags reset. With `None` the form goes
    /// inert (no submit target).
    pub fn on_selection_changed(&mut self, feed: Option<&Feed>) {
        match feed {
            Some(feed) => {
                self.target = Some(feed.name.clone());
                self.url = feed.url.clone();
                self.content_type = feed.content_type.clone();
                self.marked_for_deletion = feed.marked_for_deletion;
            }
            None => {
                self.target = None;
                self.url.clear();
                self.content_type.clear();
                self.marked_for_deletion = false;
            }
        }
        self.in_flight = false;
        self.success = false;
        self.error = None;
    }

    /// Arm a submission and return the key and patch to PUT.
    ///
    /// `None` while a previous submit is outstanding or when no feed is
    /// selected.
    pub fn begin_submit(&mut self) -> Option<(String, FeedPatch)> {
        if self.in_flight || self.target.is_none() {
            return None;
        }
        let name = self.target.clone()?;

        self.success = false;
        self.error = None;
        self.in_flight = true;
        Some((
            name,
            FeedPatch {
                url: self.url.clone(),
                content_type: self.content_type.clone(),
                marked_for_deletion: self.marked_for_deletion,
            },
        ))
    }

    /// Apply the outcome of a submission.
    ///
    /// Success merges the patch into the shared entry; failure surfaces the
    /// error and keeps the draft for retry. Both arms re-arm the form.
    pub fn finish(
        &mut self,
        list: &mut FeedList,
        name: &str,
        patch: &FeedPatch,
        result: Result<(), ApiError>,
    ) {
        self.in_flight = false;
        match result {
            Ok(()) => {
                tracing::info!(name = %name, "Feed updated");
                list.commit_updated(name, patch);
                self.success = true;
                self.error = None;
            }
            Err(err) => {
                tracing::debug!(name = %name, error = %err, "Feed update failed");
                self.success = false;
                self.error = Some(err.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(name: &str, url: &str) -> Feed {
        Feed {
            name: name.to_string(),
            url: url.to_string(),
            content_type: "application/rss+xml".to_string(),
            marked_for_deletion: false,
        }
    }

    fn selected_form() -> (EditFeedForm, FeedList) {
        let mut list = FeedList::new();
        list.commit_loaded(vec![feed("n1", "a")]);
        let mut form = EditFeedForm::default();
        let selected = list.begin_edit("n1").cloned();
        form.on_selection_changed(selected.as_ref());
        (form, list)
    }

    #[test]
    fn test_snapshot_copies_mutable_fields() {
        let (form, _) = selected_form();
        assert_eq!(form.target(), Some("n1"));
        assert_eq!(form.url, "a");
        assert_eq!(form.content_type, "application/rss+xml");
        assert!(!form.marked_for_deletion);
    }

    #[test]
    fn test_draft_edits_do_not_touch_collection() {
        let (mut form, list) = selected_form();
        form.url = "b".to_string();
        assert_eq!(list.feeds()[0].url, "a");
    }

    #[test]
    fn test_reselection_discards_dirty_draft() {
        let (mut form, mut list) = selected_form();
        form.url = "dirty".to_string();
        list.commit_created(feed("n2", "c"));
        let selected = list.begin_edit("n2").cloned();
        form.on_selection_changed(selected.as_ref());
        assert_eq!(form.target(), Some("n2"));
        assert_eq!(form.url, "c");
        assert!(form.error().is_none());
    }

    #[test]
    fn test_inert_without_selection() {
        let mut form = EditFeedForm::default();
        form.on_selection_changed(None);
        assert!(form.begin_submit().is_none());
    }

    #[test]
    fn test_successful_update_merges_into_collection() {
        let (mut form, mut list) = selected_form();
        form.url = "b".to_string();
        let (name, patch) = form.begin_submit().unwrap();
        form.finish(&mut list, &name, &patch, Ok(()));

        assert_eq!(list.feeds()[0].url, "b");
        assert!(form.success());
        assert!(!form.in_flight());
    }

    #[test]
    fn test_second_submit_while_in_flight_is_a_noop() {
        let (mut form, _) = selected_form();
        assert!(form.begin_submit().is_some());
        assert!(form.begin_submit().is_none());
    }

    #[test]
    fn test_failed_update_is_idempotent() {
        let (mut form, mut list) = selected_form();
        form.url = "b".to_string();

        for _ in 0..2 {
            let (name, patch) = form.begin_submit().unwrap();
            form.finish(
                &mut list,
                &name,
                &patch,
                Err(ApiError::Rejected("bad url".to_string())),
            );
            // Identical error state each round, collection never mutated.
            assert_eq!(form.error(), Some("bad url"));
            assert!(!form.success());
            assert!(!form.in_flight());
            assert_eq!(list.feeds()[0].url, "a");
            assert_eq!(form.url, "b"); // draft retained for retry
        }
    }
}
