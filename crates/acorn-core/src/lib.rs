//! The acorn entity graph.
//!
//! An [`Environment`] owns an arena of entities (layers and sprites)
//! and groups under one root layer, and a model mapping names to all
//! of them. Entities carry a frame clock for scheduled events, an
//! event handler for listeners, and a change log that records every
//! tracked mutation; serialization writes those logs back out as an
//! [`acorn_cfg::Document`].
//!
//! Entity classes pair a constructor with explicit setter and handler
//! tables, so configuration fields only ever reach an entity through
//! a setter registered for them by name.

/// Classes: constructors plus setter and handler tables.
pub mod class;
/// Per-entity frame clocks and timers.
pub mod clock;
/// Entities and their identifiers.
pub mod entity;
/// The environment: arena, model, update and draw loops.
pub mod environment;
/// Error types.
pub mod error;
/// Events, listeners, and per-entity event state.
pub mod event;
/// Rendering seams.
pub mod graphics;
/// Sprite groups.
pub mod group;
/// Ranged values.
pub mod meter;

pub use class::{ClassKind, ClassRegistry, EntityClass, HandlerFn, Resolved, SetterFn};
pub use clock::{Clock, Timer, TimerHook, TimerId};
pub use entity::{Entity, EntityId, GroupId, NodeKind, UpdateFn, UpdateMethod};
pub use environment::{DuplicatePolicy, Environment, ModelEntry};
pub use error::{CoreError, CoreResult};
pub use event::{Event, EventHandler, Listener};
pub use graphics::{Canvas, Graphics, ImageGraphics};
pub use group::Group;
pub use meter::Meter;
