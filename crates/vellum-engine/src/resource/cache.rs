use std::any::Any;
use std::collections::VecDeque;

use crate::driver::{Driver, Payload};
use crate::error::{EngineError, Result};

/// Number of hash chains.
pub const BUCKET_COUNT: usize = 10;

/// Multiplier of the rolling string hash.
pub const HASH_MULTIPLIER: u32 = 31;

/// Longest accepted key, in bytes.
pub const MAX_KEY_LEN: usize = 100;

/// Bucket index of `key`: `h = h * 31 + byte` over the key's bytes, modulo
/// [`BUCKET_COUNT`].
pub fn hash(key: &str) -> usize {
    let h = key
        .bytes()
        .fold(0u32, |h, b| h.wrapping_mul(HASH_MULTIPLIER).wrapping_add(u32::from(b)));
    h as usize % BUCKET_COUNT
}

#[derive(Debug)]
struct ResourceNode {
    key: String,
    payload: Payload,
}

/// Name-keyed store of driver payloads.
///
/// Each bucket is a chain with the most recently inserted node at its head.
/// Decoding and freeing are delegated to the driver passed into each
/// mutating call; the cache only owns the nodes.
#[derive(Debug)]
pub struct ResourceCache {
    buckets: [VecDeque<ResourceNode>; BUCKET_COUNT],
    len: usize,
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceCache {
    pub fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| VecDeque::new()),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(hash(key), key).is_some()
    }

    /// Keys in bucket order, each chain from head to tail.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().flatten().map(|n| n.key.as_str())
    }

    /// Looks `key` up without touching the driver.
    pub fn get(&self, key: &str) -> Option<&dyn Any> {
        let bucket = hash(key);
        self.position(bucket, key)
            .map(|i| &*self.buckets[bucket][i].payload)
    }

    /// Returns the cached payload for `key`, asking the driver to load it on a miss.
    pub fn load(&mut self, key: &str, driver: &mut dyn Driver) -> Result<&dyn Any> {
        check_key(key)?;
        let bucket = hash(key);

        let index = match self.position(bucket, key) {
            Some(i) => i,
            None => {
                let owned = self.reserve_node(bucket, key)?;
                let payload = driver.load_resource(key).map_err(|source| {
                    log::warn!("resource: failed to load {key:?}: {source:#}");
                    EngineError::LoadFailed { key: key.to_string(), source }
                })?;
                log::debug!("resource: loaded {key:?} into bucket {bucket}");
                self.push_head(bucket, owned, payload);
                0
            }
        };

        Ok(&*self.buckets[bucket][index].payload)
    }

    /// Stores `payload` under `key`. An existing entry keeps its node; its old
    /// payload is handed back to the driver.
    pub fn add_or_replace(
        &mut self,
        key: &str,
        payload: Payload,
        driver: &mut dyn Driver,
    ) -> Result<()> {
        if let Err(e) = check_key(key) {
            driver.free_resource(payload);
            return Err(e);
        }
        let bucket = hash(key);

        if let Some(i) = self.position(bucket, key) {
            let old = std::mem::replace(&mut self.buckets[bucket][i].payload, payload);
            driver.free_resource(old);
            log::debug!("resource: replaced {key:?}");
            return Ok(());
        }

        match self.reserve_node(bucket, key) {
            Ok(owned) => {
                self.push_head(bucket, owned, payload);
                Ok(())
            }
            Err(e) => {
                driver.free_resource(payload);
                Err(e)
            }
        }
    }

    /// Unlinks `key` and frees its payload.
    pub fn delete(&mut self, key: &str, driver: &mut dyn Driver) -> Result<()> {
        let bucket = hash(key);
        let node = self
            .position(bucket, key)
            .and_then(|i| self.buckets[bucket].remove(i))
            .ok_or_else(|| EngineError::not_found(format!("resource {key:?}")))?;

        self.len -= 1;
        driver.free_resource(node.payload);
        Ok(())
    }

    /// Frees every payload and empties all buckets. Returns how many were freed.
    pub fn clear_all(&mut self, driver: &mut dyn Driver) -> usize {
        let mut freed = 0;
        for bucket in &mut self.buckets {
            for node in bucket.drain(..) {
                driver.free_resource(node.payload);
                freed += 1;
            }
        }
        self.len = 0;
        if freed > 0 {
            log::debug!("resource: cleared {freed} resource(s)");
        }
        freed
    }

    fn position(&self, bucket: usize, key: &str) -> Option<usize> {
        self.buckets[bucket].iter().position(|n| n.key == key)
    }

    /// Allocates everything a new node needs up front, so a driver payload is
    /// never produced for a node that cannot be stored.
    fn reserve_node(&mut self, bucket: usize, key: &str) -> Result<String> {
        let failed = |_| EngineError::AllocationFailure { what: "resource node" };
        self.buckets[bucket].try_reserve(1).map_err(failed)?;
        let mut owned = String::new();
        owned.try_reserve_exact(key.len()).map_err(failed)?;
        owned.push_str(key);
        Ok(owned)
    }

    fn push_head(&mut self, bucket: usize, key: String, payload: Payload) {
        self.buckets[bucket].push_front(ResourceNode { key, payload });
        self.len += 1;
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.len() > MAX_KEY_LEN {
        return Err(EngineError::KeyTooLong {
            key: key.to_string(),
            max: MAX_KEY_LEN,
        });
    }
    Ok(())
}
