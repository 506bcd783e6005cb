//! Shared state-model types for the Lantern engine.
//!
//! Everything the engine persists or logs is expressible with the types in
//! this crate: string-backed identifiers, the [`StateValue`] tagged sum, and
//! the [`StateChange`]/[`ActionResult`] records that are the only legal
//! currency for world mutation.

pub mod change;
pub mod ids;
pub mod reference;
pub mod value;

pub use change::{ActionResult, AttributeKey, SideEffect, StateChange};
pub use ids::{AttributeId, DaemonId, FuseId, GlobalId, ItemId, LocationId, VerbId};
pub use reference::{EntityReference, ParentEntity};
pub use value::{OpaqueError, OpaqueValue, StateValue};
