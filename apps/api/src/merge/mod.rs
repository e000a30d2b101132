// Profile merge engine.
//
// Pipeline for one call:
//   ExtractedProfileData -> normalize -> resolver (per entity type, against
//   the candidate's stored records) -> executor (one store transaction)
//   -> MergeTally -> MergeResult
//
// Stored records are only ever created or skipped, never updated. Basic info
// is filled field by field, and only where the stored value is empty.

pub mod basic_info;
pub mod executor;
pub mod handlers;
pub mod lock;
pub mod normalize;
pub mod resolver;
pub mod result;
pub mod synonyms;

pub use executor::{merge_profile, MergeError};
pub use lock::MergeLock;
pub use result::{EntityCounts, EntityKind, MergeResult};
