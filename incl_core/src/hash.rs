use sha1::Digest;
use sha1::Sha1;

/// Lowercase hex SHA-1 digest of `bytes`. This is the stamp written after
/// `%end-include` and compared against the block content on later runs.
pub fn content_hash(bytes: &[u8]) -> String {
	hex::encode(Sha1::digest(bytes))
}
