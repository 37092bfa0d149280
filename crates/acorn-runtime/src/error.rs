use acorn_core::CoreError;

/// Alias for `Result<T, BuildError>`.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors produced while building an environment from a document.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// An entity item has no `class` field.
    #[error("item \"{0}\" has no class field")]
    MissingClass(String),

    /// An entity item names a class that is not registered.
    #[error("item \"{item}\" names unknown class \"{class}\"")]
    UnknownClass {
        /// The offending item.
        item: String,
        /// The unregistered class name.
        class: String,
    },

    /// A name was expected to resolve to a model entry and did not.
    #[error("name \"{0}\" does not resolve to a model entry")]
    UnresolvedName(String),

    /// A layer names a parent that is not a registered layer.
    #[error("layer \"{item}\" names parent \"{parent}\", which is not a registered layer")]
    BadParent {
        /// The layer being parented.
        item: String,
        /// The bad parent name.
        parent: String,
    },

    /// An interface binding uses a field with no command and no
    /// matching class setter.
    #[error("interface \"{interface}\" has no command \"{method}\"")]
    UnknownInterfaceMethod {
        /// The interface the binding addresses.
        interface: String,
        /// The unrecognized field.
        method: String,
    },

    /// An error raised by the entity graph itself.
    #[error(transparent)]
    Core(#[from] CoreError),
}
