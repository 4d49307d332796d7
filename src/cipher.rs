use aes_gcm::Aes256Gcm;
use chacha20poly1305::{
	ChaCha20Poly1305, XChaCha20Poly1305,
	aead::{Aead, KeyInit, Nonce},
};
use std::{fmt, str::FromStr};

use super::{EngineKind, Error, legacy};

/// The cipher an envelope is sealed with.
///
/// All of these take a 32 byte key.  The AEAD ciphers append a 16 byte tag to the ciphertext;
/// [`Cipher::Aes256Cbc`] has no tag of its own, and is authenticated by a separate HMAC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Cipher {
	/// AES-256 in Galois/Counter mode, 96-bit nonce.
	Aes256Gcm,
	/// The original ChaCha20-Poly1305, 64-bit nonce.
	ChaCha20Poly1305,
	/// ChaCha20-Poly1305 as per RFC 8439, 96-bit nonce.
	ChaCha20Poly1305Ietf,
	/// XChaCha20-Poly1305, 192-bit nonce.
	XChaCha20Poly1305Ietf,
	/// AES-256 in CBC mode with PKCS#7 padding, 128-bit IV.
	Aes256Cbc,
}

impl Cipher {
	pub const ALL: [Cipher; 5] = [
		Cipher::Aes256Gcm,
		Cipher::ChaCha20Poly1305,
		Cipher::ChaCha20Poly1305Ietf,
		Cipher::XChaCha20Poly1305Ietf,
		Cipher::Aes256Cbc,
	];

	pub const fn name(self) -> &'static str {
		match self {
			Cipher::Aes256Gcm => "AES-256-GCM",
			Cipher::ChaCha20Poly1305 => "ChaCha20-Poly1305",
			Cipher::ChaCha20Poly1305Ietf => "ChaCha20-Poly1305-IETF",
			Cipher::XChaCha20Poly1305Ietf => "XChaCha20-Poly1305-IETF",
			Cipher::Aes256Cbc => "AES-256-CBC",
		}
	}

	pub const fn key_len(self) -> usize {
		32
	}

	pub const fn nonce_len(self) -> usize {
		match self {
			Cipher::Aes256Gcm | Cipher::ChaCha20Poly1305Ietf => 12,
			Cipher::ChaCha20Poly1305 => legacy::NONCE_LEN,
			Cipher::XChaCha20Poly1305Ietf => 24,
			Cipher::Aes256Cbc => 16,
		}
	}

	/// The engine that knows how to use this cipher.
	pub const fn engine(self) -> EngineKind {
		match self {
			Cipher::Aes256Cbc => EngineKind::Openssl,
			_ => EngineKind::Sodium,
		}
	}

	pub(crate) fn check_nonce(self, nonce: &[u8]) -> Result<(), Error> {
		if nonce.len() == self.nonce_len() {
			Ok(())
		} else {
			Err(Error::InvalidNonceLength {
				expected: self.nonce_len(),
				actual: nonce.len(),
			})
		}
	}

	/// Encrypt and authenticate `plaintext`, returning the ciphertext with the tag appended.
	///
	/// Only the AEAD ciphers can be used here.
	pub(crate) fn seal(self, key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
		self.check_nonce(nonce)?;

		match self {
			Cipher::Aes256Gcm => seal_with::<Aes256Gcm>(key, nonce, plaintext),
			Cipher::ChaCha20Poly1305 => legacy::seal(key, nonce, plaintext),
			Cipher::ChaCha20Poly1305Ietf => seal_with::<ChaCha20Poly1305>(key, nonce, plaintext),
			Cipher::XChaCha20Poly1305Ietf => seal_with::<XChaCha20Poly1305>(key, nonce, plaintext),
			Cipher::Aes256Cbc => Err(Error::unsupported_cipher(self.name())),
		}
	}

	/// Verify and decrypt a ciphertext produced by [`Cipher::seal`].
	pub(crate) fn open(self, key: &[u8], nonce: &[u8], sealed: &[u8]) -> Result<Vec<u8>, Error> {
		self.check_nonce(nonce)?;

		match self {
			Cipher::Aes256Gcm => open_with::<Aes256Gcm>(key, nonce, sealed),
			Cipher::ChaCha20Poly1305 => legacy::open(key, nonce, sealed),
			Cipher::ChaCha20Poly1305Ietf => open_with::<ChaCha20Poly1305>(key, nonce, sealed),
			Cipher::XChaCha20Poly1305Ietf => open_with::<XChaCha20Poly1305>(key, nonce, sealed),
			Cipher::Aes256Cbc => Err(Error::unsupported_cipher(self.name())),
		}
	}
}

// Nonce lengths have been checked by the caller, so `Nonce::from_slice` can't panic.
fn seal_with<A: Aead + KeyInit>(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
	let cipher = A::new_from_slice(key).map_err(|_| Error::Encryption)?;

	cipher
		.encrypt(Nonce::<A>::from_slice(nonce), plaintext)
		.map_err(|_| Error::Encryption)
}

fn open_with<A: Aead + KeyInit>(key: &[u8], nonce: &[u8], sealed: &[u8]) -> Result<Vec<u8>, Error> {
	let cipher = A::new_from_slice(key).map_err(|_| Error::Decryption)?;

	cipher
		.decrypt(Nonce::<A>::from_slice(nonce), sealed)
		.map_err(|_| Error::Decryption)
}

impl fmt::Display for Cipher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Cipher {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Error> {
		Cipher::ALL
			.into_iter()
			.find(|c| c.name().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| Error::unsupported_cipher(s))
	}
}
