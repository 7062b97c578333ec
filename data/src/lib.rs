//! Action & recipe model.
//!
//! Pure data plus validation. The engine consumes a [`Plan`] built from a
//! validated [`Library`]; it never reads or writes the document itself.

mod action;
pub use action::{Action, DEFAULT_COOLDOWN};
mod error;
pub use error::ModelError;
mod fixed;
pub use fixed::FixedRole;
mod key;
pub use key::{Key, KeyCombo, Modifiers, NamedKey, NumpadKey};
mod library;
pub use library::{Document, Library, Plan};
mod recipe;
pub use recipe::{Recipe, MAX_QUANTITY};
