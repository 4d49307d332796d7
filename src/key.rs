use secrecy::{ExposeSecret as _, SecretSlice};

use super::Cipher;

/// Secret key material for a [`Codec`](super::Codec).
///
/// The bytes are zeroed when the key is dropped, and never show up in `Debug` output.  Length
/// is not checked here; that happens when a codec is built, against the requirements of the
/// chosen [`Cipher`].
#[derive(Debug)]
pub struct Key(SecretSlice<u8>);

impl Key {
	pub fn new(k: impl Into<Vec<u8>>) -> Self {
		let k: Vec<u8> = k.into();
		Self(k.into())
	}

	pub fn expose_secret(&self) -> &[u8] {
		self.0.expose_secret()
	}

	pub fn len(&self) -> usize {
		self.expose_secret().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Clone for Key {
	fn clone(&self) -> Self {
		Self::new(self.expose_secret())
	}
}

impl From<Vec<u8>> for Key {
	fn from(k: Vec<u8>) -> Self {
		Self::new(k)
	}
}

impl From<&[u8]> for Key {
	fn from(k: &[u8]) -> Self {
		Self::new(k)
	}
}

impl<const N: usize> From<[u8; N]> for Key {
	fn from(k: [u8; N]) -> Self {
		Self::new(k)
	}
}

impl<const N: usize> From<&[u8; N]> for Key {
	fn from(k: &[u8; N]) -> Self {
		Self::new(&k[..])
	}
}

/// String keys are used as-is; their UTF-8 bytes become the key.
impl From<&str> for Key {
	fn from(k: &str) -> Self {
		Self::new(k.as_bytes())
	}
}

/// Create a random key of the right length for `cipher`.
///
/// Handy for tests and for bootstrapping a configuration; in real deployments the key usually
/// lives in a secret store and is loaded through [`Config`](super::Config).
#[tracing::instrument(level = "debug")]
pub fn generate_key(cipher: Cipher) -> Key {
	use rand::{RngCore, rng};

	let mut k = vec![0u8; cipher.key_len()];

	rng().fill_bytes(&mut k);

	Key::new(k)
}
