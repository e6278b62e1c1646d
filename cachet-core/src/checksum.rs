//! MD5 checksums used for key parts and ETags.
//!
//! MD5 is used as a stable content fingerprint, not for security: keys must
//! stay identical across processes and releases.

use md5::{Digest, Md5};

/// Returns the lowercase hex MD5 digest of `data`.
///
/// ```
/// assert_eq!(cachet_core::md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
/// ```
pub fn md5_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(Md5::digest(data.as_ref()))
}

/// Running MD5 checksum over several inputs.
///
/// Feeding `a` then `b` yields the same digest as feeding `ab` at once.
#[derive(Clone, Default)]
pub struct Checksum(Md5);

impl Checksum {
    /// Creates an empty checksum.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds more data into the checksum.
    pub fn update(&mut self, data: impl AsRef<[u8]>) {
        self.0.update(data.as_ref());
    }

    /// Finishes the checksum, returning the lowercase hex digest.
    pub fn hexdigest(self) -> String {
        hex::encode(self.0.finalize())
    }
}

impl std::fmt::Debug for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Checksum").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_checksum_matches_concatenation() {
        let mut checksum = Checksum::new();
        checksum.update("gzip");
        checksum.update("en-us");
        assert_eq!(checksum.hexdigest(), md5_hex("gzipen-us"));
    }
}
