//! Automatic trigger-word reactions.
//!
//! - `emoji`: parsed emoji tokens
//! - `model`: per-guild data model and its persisted form
//! - `registry`: serialized per-guild mutations
//! - `matcher`: whole-word trigger matching and URL suppression
//! - `resolver`: emoji resolution against the visible emoji directory
//! - `dispatcher`: the per-message reaction state machine

pub mod dispatcher;
pub mod emoji;
pub mod matcher;
pub mod model;
pub mod registry;
pub mod resolver;

pub use dispatcher::{ApplyOutcome, DispatchOutcome, ReactionApplier, ReactionDispatcher};
pub use emoji::EmojiToken;
pub use registry::{AddOutcome, Registry, RemoveOutcome};
pub use resolver::{CustomEmoji, EmojiDirectory, Resolution};
