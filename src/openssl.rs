use aes::Aes256;
use cbc::cipher::{BlockDecryptMut as _, BlockEncryptMut as _, KeyIvInit as _, block_padding::Pkcs7};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{
	Cipher, Codec, EngineKind, Envelope, Error, Key,
	sodium::{random_iv, validate_key},
};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// A [`Codec`] for envelopes in the format of the OpenSSL-backed engine.
///
/// CBC mode has no integrity protection of its own, so these envelopes carry a third field,
/// `mac`: the hex HMAC-SHA256, keyed with the encryption key, of the base64 IV followed by the
/// base64 ciphertext.  The MAC is checked (in constant time) before any decryption is
/// attempted.
///
/// Prefer [`SodiumCodec`](super::SodiumCodec) for new data; this exists so that envelopes
/// written by the openssl engine stay readable.
#[derive(Clone, Debug)]
pub struct OpensslCodec {
	cipher: Cipher,
	key: Key,
}

impl OpensslCodec {
	/// Create a new [`OpensslCodec`].
	///
	/// # Errors
	///
	/// * [`Error::MissingKey`] if `key` is empty.
	/// * [`Error::InvalidKeyLength`] if `key` isn't the length `cipher` needs.
	/// * [`Error::UnsupportedCipher`] for anything but [`Cipher::Aes256Cbc`].
	#[tracing::instrument(level = "debug", skip(key))]
	pub fn new(cipher: Cipher, key: impl Into<Key>) -> Result<Self, Error> {
		let key = validate_key(cipher, EngineKind::Openssl, key.into())?;

		tracing::debug!(%cipher, "Openssl codec ready");

		Ok(Self { cipher, key })
	}

	pub fn cipher(&self) -> Cipher {
		self.cipher
	}

	/// Encrypt `plaintext` under the given IV.
	///
	/// CBC leaks which plaintexts share a prefix when an IV is reused; this exists to
	/// reproduce known-answer vectors, and nothing else.
	#[cfg(any(test, feature = "explicit-iv"))]
	pub fn encode_with_iv(
		&self,
		plaintext: impl AsRef<[u8]>,
		iv: impl AsRef<[u8]>,
	) -> Result<String, Error> {
		self.seal(plaintext.as_ref(), iv.as_ref())
	}

	fn mac(&self, iv: &str, value: &str) -> Result<String, Error> {
		let mut mac =
			HmacSha256::new_from_slice(self.key.expose_secret()).map_err(|_| Error::Encryption)?;
		mac.update(iv.as_bytes());
		mac.update(value.as_bytes());

		Ok(mac
			.finalize()
			.into_bytes()
			.iter()
			.map(|b| format!("{b:02x}"))
			.collect())
	}

	#[tracing::instrument(level = "debug", skip_all, fields(cipher = %self.cipher))]
	fn seal(&self, plaintext: &[u8], iv: &[u8]) -> Result<String, Error> {
		self.cipher.check_nonce(iv)?;

		let ciphertext = Aes256CbcEnc::new_from_slices(self.key.expose_secret(), iv)
			.map_err(|_| Error::Encryption)?
			.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

		let envelope = Envelope::new(iv, &ciphertext);
		let mac = self.mac(&envelope.iv, &envelope.value)?;

		envelope.with_mac(mac).to_armor()
	}

	#[tracing::instrument(level = "debug", skip_all, fields(cipher = %self.cipher))]
	fn try_decode(&self, armored: &[u8]) -> Result<Vec<u8>, Error> {
		let envelope = Envelope::from_armor(armored)?;

		let Some(mac) = envelope.mac.as_deref() else {
			return Err(Error::decoding("missing mac"));
		};

		let expected = self
			.mac(&envelope.iv, &envelope.value)
			.map_err(|_| Error::Decryption)?;
		if !constant_time_eq::constant_time_eq(expected.as_bytes(), mac.as_bytes()) {
			return Err(Error::Decryption);
		}

		let iv = envelope.iv()?;
		if iv.len() != self.cipher.nonce_len() {
			return Err(Error::decoding(format!("iv is {} bytes", iv.len())));
		}

		Aes256CbcDec::new_from_slices(self.key.expose_secret(), &iv)
			.map_err(|_| Error::Decryption)?
			.decrypt_padded_vec_mut::<Pkcs7>(&envelope.value()?)
			.map_err(|_| Error::Decryption)
	}
}

impl Codec for OpensslCodec {
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
