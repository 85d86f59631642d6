//! Error types for the Galaxy3D scene engine
//!
//! This module defines the error types used throughout the engine,
//! including graph construction, cloning, path resolution and instantiation.

use std::fmt;

/// Result type for Galaxy3D scene operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reason a path failed to resolve to an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The first segment names no root entity instance
    UnknownRoot(String),

    /// A `..` segment was applied to an entity without a parent
    NoParent,

    /// No child entity matches the segment
    ChildNotFound(String),

    /// A bare child segment matched more than one child
    AmbiguousChild {
        /// Child ID that was looked up
        name: String,
        /// Number of matching children
        count: usize,
    },

    /// A `name:index` segment addressed past the last match
    IndexOutOfRange {
        /// Child ID that was looked up
        name: String,
        /// Requested index
        index: usize,
        /// Number of matching children
        count: usize,
    },

    /// The resolved entity has no component with the requested original ID
    ComponentNotFound(String),

    /// A single-segment path matched several live instances
    Ambiguous {
        /// Resource ID that was looked up
        name: String,
        /// Number of matching instances
        count: usize,
    },

    /// A single-segment path matched no live instance
    NotFound(String),

    /// The path text does not follow the path grammar
    InvalidSyntax(String),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::UnknownRoot(name) => write!(f, "root entity '{}' not found", name),
            PathError::NoParent => write!(f, "'..' used where there are no more parents"),
            PathError::ChildNotFound(name) => write!(f, "child with ID '{}' not found", name),
            PathError::AmbiguousChild { name, count } => write!(
                f,
                "found {} children with ID '{}', use 'child_id:child_index' to disambiguate",
                count, name
            ),
            PathError::IndexOutOfRange { name, index, count } => write!(
                f,
                "index {} out of range, found {} children with ID '{}'",
                index, count, name
            ),
            PathError::ComponentNotFound(name) => write!(f, "component '{}' not found", name),
            PathError::Ambiguous { name, count } => write!(
                f,
                "target '{}' is ambiguous because there are {} instances, use a relative or absolute path",
                name, count
            ),
            PathError::NotFound(name) => write!(f, "target '{}' not found", name),
            PathError::InvalidSyntax(reason) => write!(f, "invalid path: {}", reason),
        }
    }
}

/// Galaxy3D scene engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Internal failure unrelated to resource data (lock poisoning, etc.)
    BackendError(String),

    /// Invalid resource (unknown ID, duplicate ID, dangling pointer, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, services, subsystems)
    InitializationFailed(String),

    /// The dependency graph contains a cycle; the chain lists the IDs closing it
    CycleDetected(Vec<String>),

    /// An instance property could not be applied to its cloned component
    CloneValidationFailed(String),

    /// A path could not be resolved to exactly one instance
    PathResolutionFailed {
        /// Path as written in the resource
        path: String,
        /// Why the path failed
        reason: PathError,
    },

    /// A component instance returned an error from its init hook
    ComponentInitFailed {
        /// ID of the component instance that failed
        component: String,
        /// Error returned by the component
        source: Box<Error>,
    },
}

impl Error {
    /// Build a [`Error::PathResolutionFailed`] value
    pub fn path(path: impl Into<String>, reason: PathError) -> Self {
        Error::PathResolutionFailed { path: path.into(), reason }
    }

    /// The path failure reason, if this is a path resolution error
    pub fn path_error(&self) -> Option<&PathError> {
        match self {
            Error::PathResolutionFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::CycleDetected(chain) => write!(f, "Cycle detected: {}", chain.join(" -> ")),
            Error::CloneValidationFailed(msg) => write!(f, "Clone validation failed: {}", msg),
            Error::PathResolutionFailed { path, reason } => {
                write!(f, "Error resolving path '{}': {}", path, reason)
            }
            Error::ComponentInitFailed { component, source } => {
                write!(f, "Failed to init component '{}': {}", component, source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ComponentInitFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

// ===== ERROR MACROS =====

/// Log an error message and build an [`Error::InvalidResource`] from it
///
/// # Example
///
/// ```no_run
/// # use galaxy_3d_scene::engine_err;
/// let id = "Wheel";
/// let err = engine_err!("galaxy3d::ResourceManager", "Resource '{}' not found", id);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::InvalidResource(message)
    }};
}

/// Log an error message and return early with an [`Error::InvalidResource`]
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
