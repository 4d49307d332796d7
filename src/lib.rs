//! Authenticated encryption envelopes, for data that has to survive a trip through untrusted
//! hands.
//!
//! Web applications keep handing secrets to places they don't control: session data in
//! cookies, state parameters through OAuth providers, sensitive columns into a database that
//! half the company can read.  An *envelope* is the form those secrets travel in: the
//! ciphertext and the IV it was encrypted with, wrapped up as JSON and then base64, so it can
//! go anywhere text can go.  When an envelope comes back, it is only opened if it is intact
//! and was sealed with the same key; anything else (truncated, corrupted, forged, or simply
//! not an envelope at all) just comes back as `None`, rather than an error that the caller
//! has to remember to handle.
//!
//! Misconfiguration, on the other hand, is loud.  Every [`Codec`] checks its key against the
//! needs of its [`Cipher`] when it is created, so a wrong-sized or absent key stops the show
//! at startup, not at the first request.
//!
//! # Engines and ciphers
//!
//! The [`SodiumCodec`] seals envelopes with one of the AEAD ciphers libsodium offers
//! (AES-256-GCM, the original ChaCha20-Poly1305, ChaCha20-Poly1305-IETF, or
//! XChaCha20-Poly1305-IETF).  If you have a choice, use XChaCha20-Poly1305-IETF: its nonces
//! are long enough to be picked at random without any worry about collisions.
//!
//! The [`OpensslCodec`] reads and writes envelopes in the format of the OpenSSL-backed
//! engine (AES-256-CBC, with an HMAC-SHA256 over the whole thing), for data that was
//! encrypted that way in the first place.
//!
//! # Configuration
//!
//! Most applications will describe their codecs in a [`Config`] (one named group per
//! purpose) and build an [`Encrypt`] for each group when they start up.  There is no global
//! instance: pass the [`Encrypt`] to whoever needs it.
mod cipher;
mod codec;
mod config;
mod engine;
mod envelope;
mod error;
mod key;
mod legacy;
mod openssl;
mod sodium;

pub use cipher::Cipher;
pub use codec::Codec;
pub use config::{Config, GroupConfig};
pub use engine::{Encrypt, Engine, EngineKind};
pub use error::Error;
pub use key::{Key, generate_key};
pub use openssl::OpensslCodec;
pub use sodium::SodiumCodec;

use envelope::Envelope;

#[cfg(test)]
mod tests {
	use std::sync::Once;
	use tracing_subscriber::{layer::SubscriberExt as _, registry::Registry};

	/// The 32 byte key the published known-answer vectors were produced with.
	pub(crate) const KEY32: &[u8; 32] = b"01234567890123456789012345678901";

	static INIT: Once = Once::new();

	pub(crate) fn init() {
		INIT.call_once(|| {
			let layer = tracing_tree::HierarchicalLayer::default()
				.with_writer(tracing_subscriber::fmt::TestWriter::new())
				.with_indent_lines(true)
				.with_indent_amount(2)
				.with_targets(true);

			let sub = Registry::default().with(layer);
			tracing::subscriber::set_global_default(sub).unwrap();
		});
	}
}
