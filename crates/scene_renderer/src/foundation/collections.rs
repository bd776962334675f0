//! Specialized collection types
//!
//! Generational handle tables. A slot that has been freed and reused gets a
//! new version, so a handle that outlived its resource never aliases a newer
//! one.

pub use slotmap::{new_key_type, Key, KeyData, SlotMap};

/// Handle-keyed resource table
pub type HandleMap<K, V> = SlotMap<K, V>;

/// Pack a table key into an opaque `u64` handle value
pub fn key_to_raw<K: Key>(key: K) -> u64 {
    key.data().as_ffi()
}

/// Recover a table key from an opaque `u64` handle value
///
/// Values that never came from [`key_to_raw`] yield a key that simply does not
/// resolve in any table.
pub fn raw_to_key<K: Key>(raw: u64) -> K {
    K::from(KeyData::from_ffi(raw))
}
