use std::fmt;

use md5::{Digest, Md5};
use uuid::Uuid;

/// Stable identifier for a module, derived from its name.
///
/// The value is the MD5 digest of the UTF-8 name laid out the way .NET's `Guid(byte[])`
/// constructor reads it (the first three fields little-endian), so identifiers line up
/// with ones produced by other generators for the same module name. Rendering is always
/// uppercase and hyphenated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(Uuid);

impl ProjectId {
    pub fn for_name(name: &str) -> Self {
        let digest = Md5::digest(name.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest);
        Self(Uuid::from_bytes_le(bytes))
    }

    /// `{XXXXXXXX-...}` form used inside project and solution descriptors.
    pub fn braced(&self) -> String {
        format!("{{{self}}}")
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0.hyphenated())
    }
}
