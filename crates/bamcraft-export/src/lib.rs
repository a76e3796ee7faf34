//! bamcraft export pipeline
//!
//! Converts an authored scene into an immutable virtual scene graph ready
//! for a binary container writer:
//! - scene graph building with LOD, tags, instancing and billboards
//! - triangulated-mesh vertex welding and index-buffer sizing
//! - render-state resolution (conventional or packed physically-based)
//! - texture stage derivation with path/packaging policy
//! - armature flattening and particle-instance expansion
//!
//! All caches live on one [`ExportSession`] and are scoped to a single
//! export run.

pub mod geometry;
pub mod graph;
pub mod json;
pub mod material;
pub mod particles;
pub mod paths;
pub mod session;
pub mod settings;
pub mod skeleton;
pub mod stats;
pub mod texture;
pub mod transform;

pub use graph::{GraphSink, VirtualNode};
pub use session::ExportSession;
pub use settings::{BamVersion, ExportSettings, TextureMode};
pub use stats::ExportStats;

/// Outcome of converting something that may legitimately produce nothing.
///
/// Callers and tests can tell "nothing to attach" apart from "conversion
/// failed": failures are `Err`, this type only carries the success side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// A converted result to attach
    Converted(T),
    /// Nothing to attach, with the reason why
    Skipped(&'static str),
}

impl<T> Resolution<T> {
    /// The converted value, if any
    pub fn converted(self) -> Option<T> {
        match self {
            Resolution::Converted(value) => Some(value),
            Resolution::Skipped(_) => None,
        }
    }

    /// Whether this outcome was skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self, Resolution::Skipped(_))
    }
}
