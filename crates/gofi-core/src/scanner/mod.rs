pub mod fingerprint;
pub mod sniff;
pub mod walk;

pub use fingerprint::{fingerprint, ContentStatus, Fingerprint, SIZE_CEILING};
pub use sniff::{detect_type, sniff_mime};
pub use walk::{walk, WalkStats};
