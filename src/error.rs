#[derive(Debug, thiserror::Error, thiserror_ext::Construct)]
#[non_exhaustive]
pub enum Error {
	#[error("configuration error: {0}")]
	Config(String),

	#[error("failed to decrypt ciphertext")]
	Decryption,

	#[error("envelope decoding failure: {0}")]
	Decoding(String),

	#[error("failed to encrypt plaintext")]
	Encryption,

	#[error("envelope encoding failure: {0}")]
	Encoding(String),

	#[error("invalid key length: expected {expected} bytes, got {actual}")]
	InvalidKeyLength { expected: usize, actual: usize },

	#[error("invalid IV length: expected {expected} bytes, got {actual}")]
	InvalidNonceLength { expected: usize, actual: usize },

	#[error("no encryption key configured")]
	MissingKey,

	#[error("unknown configuration group {0:?}")]
	UnknownGroup(String),

	#[error("unsupported cipher: {0}")]
	UnsupportedCipher(String),

	#[error("unsupported engine: {0}")]
	UnsupportedEngine(String),
}
