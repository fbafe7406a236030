use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(i: usize) -> Self {
                Self(i as u32)
            }
        }
    };
}

arena_id!(
    /// Handle of a camera in the scene.
    CameraId
);
arena_id!(
    /// Handle of a per-image building footprint.
    BuildingId
);
arena_id!(
    /// Handle of a detected roof-edge segment on one image.
    SegmentId
);
arena_id!(
    /// Handle of a cluster of footprints depicting one physical building.
    BuildingGroupId
);
arena_id!(
    /// Handle of a cluster of segments depicting one physical roof edge.
    EdgeGroupId
);
