//! Named resource cache.
//!
//! Maps string keys (usually asset paths) to driver payloads so each asset is
//! decoded once. Lookups never touch the driver; misses, replacements and
//! removals delegate to the active driver's load/free primitives.

mod cache;

pub use cache::{hash, ResourceCache, BUCKET_COUNT, HASH_MULTIPLIER, MAX_KEY_LEN};
