//! Form workflows for the add and edit dialogs.
//!
//! Each form owns its input fields and a small status trio: an in-flight
//! guard, a success flag, and an optional error message. The lifecycle is
//! split in two so the network call can happen elsewhere (a spawned task):
//! `begin_submit` arms the guard and hands back the request payload,
//! `finish` applies the outcome and commits to the shared [`FeedList`]
//! on confirmed success only, never optimistically.
//!
//! [`FeedList`]: crate::registry::FeedList

mod add;
mod edit;

pub use add::AddFeedForm;
pub use edit::EditFeedForm;
