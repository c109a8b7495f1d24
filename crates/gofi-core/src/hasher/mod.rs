pub mod keyed;

pub use keyed::{hash_bytes, hash_file, KeyedDigest, FINGERPRINT_KEY};
