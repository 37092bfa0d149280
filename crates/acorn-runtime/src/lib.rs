//! Building live acorn environments from configuration documents.
//!
//! A [`Context`] carries registered classes and interfaces; its
//! [`Context::build`] walks a decoded [`acorn_cfg::Document`] and
//! produces a populated [`acorn_core::Environment`]. Name resolution
//! lives in [`resolve`], and [`Interface`] maps configuration fields
//! onto command tables.

/// The document-to-environment builder.
pub mod context;
/// Build errors.
pub mod error;
/// Interfaces: command tables bound through configuration.
pub mod interface;
/// Name resolution against the model.
pub mod resolve;

pub use context::{
    BuildOptions, Context, ADD_TO_MODEL_KEY, CLASS_KEY, GROUPS_SECTION, LAYERS_SECTION,
    PARENT_LAYER_KEY, POPULATE_SECTION,
};
pub use error::{BuildError, BuildResult};
pub use interface::{Interface, InterfaceFn};
pub use resolve::{resolve, resolve_token, spread};
