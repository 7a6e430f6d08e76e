//! Data models for the application.

mod note;
mod user;

pub use note::{Note, NoteInput};
pub use user::{GoogleUser, UserInfo};
