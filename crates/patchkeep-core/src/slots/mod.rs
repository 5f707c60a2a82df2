//! Patch slot governance for the runtime archive directory.
//!
//! Archive chunks are named `chunk<N>.<ext>` (base archives) or
//! `chunk<N>patch<M>.<ext>` (patch archives). Slot ownership bands:
//!
//! | name kind | index      | owner                    | action   |
//! |-----------|------------|--------------------------|----------|
//! | base      | `0..=29`   | the game                 | keep     |
//! | base      | `30..`     | stale output of ours     | delete   |
//! | patch     | `200..=300`| this tool                | delete   |
//! | patch     | otherwise  | the game or other tools  | keep     |

pub mod name;
pub mod reclaim;

pub use name::{BASE_RESERVED_MAX, OWNED_PATCH_SLOTS, SlotAction, SlotName, parse_slot_name};
pub use reclaim::{PatchSlotReclaimer, ReclaimReport};
