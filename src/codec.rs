use super::Error;

/// Core trait that every envelope codec implements, to turn plaintexts into armored
/// envelopes and back again.
pub trait Codec {
	/// Encrypt `plaintext` under a freshly generated IV, and return the armored envelope.
	///
	/// # Errors
	///
	/// Will return [`Error::Encryption`] or [`Error::Encoding`] in the (extremely
	/// unlikely) event something goes horribly wrong.
	fn encode(&self, plaintext: impl AsRef<[u8]>) -> Result<String, Error>;

	/// Open an armored envelope.
	///
	/// Envelopes usually arrive from untrusted places, so this never fails loudly: anything
	/// that isn't a well-formed envelope sealed under this codec's key (bad base64, bad JSON,
	/// missing fields, a forged or corrupted ciphertext, the wrong key) comes back as `None`.
	fn decode(&self, armored: impl AsRef<[u8]>) -> Option<Vec<u8>>;
}
