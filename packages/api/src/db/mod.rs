//! # Database module — notes storage
//!
//! Handlers reach notes only through the [`NoteStore`] trait, held in
//! [`AppState`](crate::state::AppState) as an `Arc<dyn NoteStore>`.
//!
//! - [`PgNoteStore`]: parameterised queries against the `notes` table. The pool
//!   comes from [`connect`]; [`migrate`] applies `packages/api/migrations`.
//! - [`MemoryNoteStore`]: a process-local store used by tests and as the fallback
//!   when `DATABASE_URL` is unset.

mod memory;
mod notes;
mod pool;

pub use memory::MemoryNoteStore;
pub use notes::{NoteStore, PgNoteStore};
pub use pool::{connect, migrate};
