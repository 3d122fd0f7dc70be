//! Client-side editing of notes: heading/body drafts, debounced saving and
//! an HTTP client for the note actions.

mod client;
mod debounce;
mod draft;
mod editor;
mod error;

pub use client::{Note, NotesClient, User};
pub use debounce::{Debouncer, DEFAULT_DELAY};
pub use draft::{NoteDraft, HEADING_PLACEHOLDER};
pub use editor::{NoteEditor, NoteSink};
pub use error::{Error, Result};
