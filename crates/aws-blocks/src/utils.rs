//! Utilities for working with blocks.

/// Returns the base64 encoded sha256 digest of `bytes`, in the form S3
/// expects for `x-amz-checksum-sha256`.
pub fn sha256_base64(bytes: &[u8]) -> String {
    log::trace!("determining sha256 of {} bytes", bytes.len());
    let digest = ring::digest::digest(&ring::digest::SHA256, bytes);
    data_encoding::BASE64.encode(digest.as_ref())
}
