//! Stable resource identifiers
//!
//! Export caches are keyed by these, never by display names. Names can be
//! renamed or collide between datablocks; the host hands out one stable id
//! per underlying resource instead.

use serde::{Deserialize, Serialize};

macro_rules! resource_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            /// Create a new id
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw id value
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:016X}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

resource_id!(
    /// Identity of one mesh datablock (shared by every object instancing it)
    MeshId
);

resource_id!(
    /// Identity of one material resource
    MaterialId
);

resource_id!(
    /// Identity of one image resource
    ImageId
);
