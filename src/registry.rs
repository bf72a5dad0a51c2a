//! Locally held copy of the remote collection, plus selection state.
//!
//! [`FeedList`] is the single source of truth observed by the list view and
//! both forms. Its fields are private: readers get slices and references,
//! writers go through the `begin_*`/`commit_*` methods, so the collection is
//! never replaced or indexed into from outside while a submit is resolving.

use crate::api::{ApiError, Feed, FeedClient, FeedPatch};

/// Which form, if any, is currently open.
///
/// Selecting a feed and opening the add form are mutually exclusive: every
/// transition below establishes one or the other, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Adding,
    Editing,
}

/// The fetched collection, the current selection, and the mode flag.
#[derive(Debug, Default)]
pub struct FeedList {
    feeds: Vec<Feed>,
    selected: Option<usize>,
    mode: Mode,
}

impl FeedList {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn feeds(&self) -> &[Feed] {
        &self.feeds
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The currently selected feed, if the mode is `Editing`.
    pub fn selected(&self) -> Option<&Feed> {
        self.selected.and_then(|i| self.feeds.get(i))
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Fetch the whole collection and replace the local copy on success.
    ///
    /// On failure the collection stays whatever it was (typically empty at
    /// startup) and the error is returned for the list view to display. No
    /// automatic retry.
    pub async fn load(&mut self, client: &FeedClient) -> Result<(), ApiError> {
        let feeds = client.list().await?;
        tracing::debug!(count = feeds.len(), "Loaded feed collection");
        self.commit_loaded(feeds);
        Ok(())
    }

    /// Replace the collection wholesale with a completed fetch.
    ///
    /// Selection and mode reset too: a replace invalidates any index held
    /// against the old collection.
    pub fn commit_loaded(&mut self, feeds: Vec<Feed>) {
        self.feeds = feeds;
        self.selected = None;
        self.mode = Mode::Idle;
    }

    // ========================================================================
    // Selection transitions
    // ========================================================================

    /// Open the add form: clears any selection.
    pub fn begin_add(&mut self) {
        self.selected = None;
        self.mode = Mode::Adding;
    }

    /// Select the named feed for editing.
    ///
    /// Membership is required: an unknown name returns `None` and leaves the
    /// state untouched. On success the selected feed is returned so the
    /// caller can notify the edit form synchronously.
    pub fn begin_edit(&mut self, name: &str) -> Option<&Feed> {
        let index = self.feeds.iter().position(|f| f.name == name)?;
        self.selected = Some(index);
        self.mode = Mode::Editing;
        self.feeds.get(index)
    }

    /// Close whatever form is open.
    pub fn close_form(&mut self) {
        self.selected = None;
        self.mode = Mode::Idle;
    }

    // ========================================================================
    // Commits (called only after server confirmation)
    // ========================================================================

    /// Append a feed confirmed by the server. New entries always go to the
    /// end; no other ordering is maintained.
    pub fn commit_created(&mut self, feed: Feed) {
        self.feeds.push(feed);
    }

    /// Merge the mutable fields into the entry with the matching name.
    ///
    /// Edits always target an existing member, so a miss is an inconsistency:
    /// it is logged and dropped rather than applied.
    pub fn commit_updated(&mut self, name: &str, patch: &FeedPatch) {
        match self.feeds.iter_mut().find(|f| f.name == name) {
            Some(feed) => {
                feed.url = patch.url.clone();
                feed.content_type = patch.content_type.clone();
                feed.marked_for_deletion = patch.marked_for_deletion;
            }
            None => {
                tracing::warn!(name = %name, "Update confirmed for a feed not in the collection, dropping");
            }
        }
    }

    /// Set the deletion flag on the entry with the matching name after a
    /// confirmed DELETE. The entry itself stays: removal is the server
    /// sweeper's job.
    pub fn commit_marked(&mut self, name: &str) {
        match self.feeds.iter_mut().find(|f| f.name == name) {
            Some(feed) => feed.marked_for_deletion = true,
            None => {
                tracing::warn!(name = %name, "Deletion confirmed for a feed not in the collection, dropping");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(name: &str) -> Feed {
        Feed {
            name: name.to_string(),
            url: format!("http://example.com/{}", name),
            content_type: "application/rss+xml".to_string(),
            marked_for_deletion: false,
        }
    }

    fn list_with(names: &[&str]) -> FeedList {
        let mut list = FeedList::new();
        list.commit_loaded(names.iter().map(|n| feed(n)).collect());
        list
    }

    #[test]
    fn test_begin_add_clears_selection() {
        let mut list = list_with(&["a", "b"]);
        list.begin_edit("a").unwrap();
        list.begin_add();
        assert_eq!(list.mode(), Mode::Adding);
        assert!(list.selected().is_none());
    }

    #[test]
    fn test_begin_edit_selects_member() {
        let mut list = list_with(&["a", "b"]);
        let selected = list.begin_edit("b").unwrap();
        assert_eq!(selected.name, "b");
        assert_eq!(list.mode(), Mode::Editing);
        assert_eq!(list.selected().unwrap().name, "b");
    }

    #[test]
    fn test_begin_edit_unknown_name_is_noop() {
        let mut list = list_with(&["a"]);
        list.begin_add();
        assert!(list.begin_edit("missing").is_none());
        // State untouched by the failed transition.
        assert_eq!(list.mode(), Mode::Adding);
        assert!(list.selected().is_none());
    }

    #[test]
    fn test_commit_created_appends() {
        let mut list = list_with(&["a"]);
        list.commit_created(feed("b"));
        let names: Vec<_> = list.feeds().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_commit_updated_merges_only_matching_entry() {
        let mut list = list_with(&["a", "b"]);
        let patch = FeedPatch {
            url: "http://example.com/new".to_string(),
            content_type: "application/atom+xml".to_string(),
            marked_for_deletion: true,
        };
        list.commit_updated("a", &patch);

        let a = &list.feeds()[0];
        assert_eq!(a.name, "a"); // key untouched
        assert_eq!(a.url, "http://example.com/new");
        assert_eq!(a.content_type, "application/atom+xml");
        assert!(a.marked_for_deletion);

        let b = &list.feeds()[1];
        assert_eq!(b.url, "http://example.com/b");
        assert!(!b.marked_for_deletion);
    }

    #[test]
    fn test_commit_updated_unknown_name_is_noop() {
        let mut list = list_with(&["a"]);
        let before = list.feeds().to_vec();
        let patch = FeedPatch {
            url: "x".to_string(),
            content_type: "y".to_string(),
            marked_for_deletion: false,
        };
        list.commit_updated("missing", &patch);
        assert_eq!(list.feeds(), &before[..]);
    }

    #[test]
    fn test_commit_marked_sets_flag_only() {
        let mut list = list_with(&["a", "b"]);
        list.commit_marked("b");
        assert!(!list.feeds()[0].marked_for_deletion);
        assert!(list.feeds()[1].marked_for_deletion);
        assert_eq!(list.len(), 2); // advisory: nothing is removed
    }

    #[test]
    fn test_commit_loaded_resets_selection_and_mode() {
        let mut list = list_with(&["a"]);
        list.begin_edit("a").unwrap();
        list.commit_loaded(vec![feed("c")]);
        assert_eq!(list.mode(), Mode::Idle);
        assert!(list.selected().is_none());
        assert_eq!(list.feeds()[0].name, "c");
    }

    #[test]
    fn test_selection_survives_append() {
        let mut list = list_with(&["a", "b"]);
        list.begin_edit("b").unwrap();
        list.commit_created(feed("c"));
        assert_eq!(list.selected().unwrap().name, "b");
    }
}
