//! The original ChaCha20-Poly1305 construction, with a 64-bit nonce.
//!
//! This predates RFC 8439 and differs from it in two ways: the nonce is 8 bytes (the
//! remaining state words hold a 64-bit block counter), and the Poly1305 input is *not* padded
//! to 16-byte boundaries.  The MAC covers `ad || le64(ad.len()) || ct || le64(ct.len())`.
//! Envelopes are never sealed with associated data, so `ad` is always empty.
use chacha20::{
	ChaCha20Legacy,
	cipher::{KeyIvInit as _, StreamCipher as _},
};
use poly1305::{Poly1305, universal_hash::KeyInit as _};

use super::Error;

pub(crate) const NONCE_LEN: usize = 8;
pub(crate) const TAG_LEN: usize = 16;

/// Set up the keystream, and key Poly1305 with the first half of block zero.  The stream is
/// left positioned at block one, which is where the message keystream starts.
fn init(key: &[u8], nonce: &[u8], err: fn() -> Error) -> Result<(ChaCha20Legacy, Poly1305), Error> {
	let mut stream = ChaCha20Legacy::new_from_slices(key, nonce).map_err(|_| err())?;

	let mut block0 = [0u8; 64];
	stream.apply_keystream(&mut block0);

	let mac = Poly1305::new_from_slice(&block0[..32]).map_err(|_| err())?;
	block0.fill(0);

	Ok((stream, mac))
}

fn tag(mac: Poly1305, ciphertext: &[u8]) -> poly1305::Tag {
	let mut data = Vec::with_capacity(ciphertext.len() + 16);
	data.extend_from_slice(&0u64.to_le_bytes());
	data.extend_from_slice(ciphertext);
	data.extend_from_slice(&(ciphertext.len() as u64).to_le_bytes());

	mac.compute_unpadded(&data)
}

#[tracing::instrument(level = "trace", skip_all)]
pub(crate) fn seal(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
	let (mut stream, mac) = init(key, nonce, || Error::Encryption)?;

	let mut sealed = plaintext.to_vec();
	stream.apply_keystream(&mut sealed);

	let tag = tag(mac, &sealed);
	sealed.extend_from_slice(tag.as_slice());

	Ok(sealed)
}

#[tracing::instrument(level = "trace", skip_all)]
pub(crate) fn open(key: &[u8], nonce: &[u8], sealed: &[u8]) -> Result<Vec<u8>, Error> {
	if sealed.len() < TAG_LEN {
		return Err(Error::Decryption);
	}

	let (ciphertext, expected) = sealed.split_at(sealed.len() - TAG_LEN);
	let (mut stream, mac) = init(key, nonce, || Error::Decryption)?;

	if !constant_time_eq::constant_time_eq(tag(mac, ciphertext).as_slice(), expected) {
		return Err(Error::Decryption);
	}

	let mut plaintext = ciphertext.to_vec();
	stream.apply_keystream(&mut plaintext);

	Ok(plaintext)
}
