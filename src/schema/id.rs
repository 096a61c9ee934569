use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype.
///
/// Ids are plain values: holding one never keeps the referenced record
/// alive, and every lookup through one may come back empty.
macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// A fresh random (v4) id, for records created by an author.
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// An id drawn from the given randomness source, so that a
            /// pinned seed reproduces the same ids.
            pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
                let bytes: [u8; 16] = rng.gen();
                Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(
    /// Identifies a [`Character`](super::character::Character).
    CharacterId
);
id_newtype!(TraitId);
id_newtype!(GoalId);
id_newtype!(FlawId);
id_newtype!(RelationshipId);
id_newtype!(
    /// Identifies a [`Setting`](super::setting::Setting).
    SettingId
);
id_newtype!(LocationId);
id_newtype!(
    /// Identifies a [`Plot`](super::plot::Plot).
    PlotId
);
id_newtype!(BeatId);
id_newtype!(ThemeId);
id_newtype!(EventId);
id_newtype!(
    /// Identifies a [`StoryNode`](super::story::StoryNode) within a graph.
    NodeId
);
id_newtype!(
    /// Identifies a [`StoryBranch`](super::story::StoryBranch) within a graph.
    BranchId
);
