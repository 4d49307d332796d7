use super::{Cipher, Codec, EngineKind, Envelope, Error, Key};

/// A [`Codec`] built on the AEAD ciphers that libsodium offers.
///
/// One key, one [`Cipher`], no other state: a `SodiumCodec` can be shared between as many
/// threads as you like.  Every call to [`encode`](Codec::encode) draws a new random IV, which
/// travels inside the envelope next to the ciphertext.
///
/// # Example
///
/// ```rust
/// use envelope_codec::{Cipher, Codec, Error, SodiumCodec};
/// # fn main() -> Result<(), Error> {
///
/// let key = envelope_codec::generate_key(Cipher::XChaCha20Poly1305Ietf);
/// let codec = SodiumCodec::new(Cipher::XChaCha20Poly1305Ietf, key)?;
///
/// let envelope = codec.encode(b"Hello, world!")?;
/// assert_eq!(Some(b"Hello, world!".to_vec()), codec.decode(&envelope));
///
/// // Anything that isn't an envelope of ours is simply "nothing"
/// assert_eq!(None, codec.decode("not an envelope"));
///
/// // Including envelopes sealed under someone else's key
/// let stranger = SodiumCodec::new(
///     Cipher::XChaCha20Poly1305Ietf,
///     envelope_codec::generate_key(Cipher::XChaCha20Poly1305Ietf),
/// )?;
/// assert_eq!(None, stranger.decode(&envelope));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct SodiumCodec {
	cipher: Cipher,
	key: Key,
}

impl SodiumCodec {
	/// Create a new [`SodiumCodec`].
	///
	/// # Errors
	///
	/// * [`Error::MissingKey`] if `key` is empty.
	/// * [`Error::InvalidKeyLength`] if `key` isn't the length `cipher` needs.
	/// * [`Error::UnsupportedCipher`] if `cipher` isn't an AEAD.
	#[tracing::instrument(level = "debug", skip(key))]
	pub fn new(cipher: Cipher, key: impl Into<Key>) -> Result<Self, Error> {
		let key = validate_key(cipher, EngineKind::Sodium, key.into())?;

		tracing::debug!(%cipher, "Sodium codec ready");

		Ok(Self { cipher, key })
	}

	pub fn cipher(&self) -> Cipher {
		self.cipher
	}

	/// Encrypt `plaintext` under the given IV.
	///
	/// Reusing an IV with the same key, for different plaintexts, destroys both the
	/// confidentiality and the integrity of everything encrypted under it.  This exists to
	/// reproduce known-answer vectors; use [`Codec::encode`] for everything else.
	#[cfg(any(test, feature = "explicit-iv"))]
	pub fn encode_with_iv(
		&self,
		plaintext: impl AsRef<[u8]>,
		iv: impl AsRef<[u8]>,
	) -> Result<String, Error> {
		self.seal(plaintext.as_ref(), iv.as_ref())
	}

	#[tracing::instrument(level = "debug", skip_all, fields(cipher = %self.cipher))]
	fn seal(&self, plaintext: &[u8], iv: &[u8]) -> Result<String, Error> {
		let sealed = self.cipher.seal(self.key.expose_secret(), iv, plaintext)?;

		Envelope::new(iv, &sealed).to_armor()
	}

	#[tracing::instrument(level = "debug", skip_all, fields(cipher = %self.cipher))]
	fn try_decode(&self, armored: &[u8]) -> Result<Vec<u8>, Error> {
		let envelope = Envelope::from_armor(armored)?;

		let iv = envelope.iv()?;
		if iv.len() != self.cipher.nonce_len() {
			return Err(Error::decoding(format!("iv is {} bytes", iv.len())));
		}

		self.cipher
			.open(self.key.expose_secret(), &iv, &envelope.value()?)
	}
}

impl Codec for SodiumCodec {
	fn encode(&self, plaintext: impl AsRef<[u8]>) -> Result<String, Error> {
		let iv = random_iv(self.cipher);

		self.seal(plaintext.as_ref(), &iv)
	}

	fn decode(&self, armored: impl AsRef<[u8]>) -> Option<Vec<u8>> {
		self.try_decode(armored.as_ref())
			.inspect_err(|e| tracing::debug!(error = %e, "Envelope rejected"))
			.ok()
	}
}

pub(crate) fn random_iv(cipher: Cipher) -> Vec<u8> {
	use rand::{RngCore, rng};

	let mut iv = vec![0u8; cipher.nonce_len()];
	rng().fill_bytes(&mut iv);

	iv
}

pub(crate) fn validate_key(cipher: Cipher, engine: EngineKind, key: Key) -> Result<Key, Error> {
	if cipher.engine() != engine {
		return Err(Error::unsupported_cipher(format!(
			"{cipher} is not available in the {engine} engine"
		)));
	}

	if key.is_empty() {
		return Err(Error::MissingKey);
	}

	if key.len() != cipher.key_len() {
		return Err(Error::InvalidKeyLength {
			expected: cipher.key_len(),
			actual: key.len(),
		});
	}

	Ok(key)
}
