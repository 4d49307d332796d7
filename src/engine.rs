use std::{fmt, str::FromStr};

use super::{Cipher, Codec, Config, Error, Key, OpensslCodec, SodiumCodec};

/// The families of primitives an envelope can be produced with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineKind {
	/// Authenticated ciphers, as offered by libsodium.
	Sodium,
	/// AES-CBC with an HMAC, as produced with OpenSSL.
	Openssl,
}

impl EngineKind {
	pub const fn name(self) -> &'static str {
		match self {
			EngineKind::Sodium => "Sodium",
			EngineKind::Openssl => "Openssl",
		}
	}

	/// The cipher used when a configuration doesn't name one.
	pub const fn default_cipher(self) -> Cipher {
		match self {
			EngineKind::Sodium => Cipher::Aes256Gcm,
			EngineKind::Openssl => Cipher::Aes256Cbc,
		}
	}
}

impl fmt::Display for EngineKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for EngineKind {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Error> {
		match s.trim().to_ascii_lowercase().as_str() {
			"sodium" => Ok(EngineKind::Sodium),
			"openssl" => Ok(EngineKind::Openssl),
			_ => Err(Error::unsupported_engine(s)),
		}
	}
}

/// A codec from one of the engines.
#[derive(Clone, Debug)]
pub enum Engine {
	Sodium(SodiumCodec),
	Openssl(OpensslCodec),
}

impl Engine {
	pub fn kind(&self) -> EngineKind {
		match self {
			Engine::Sodium(_) => EngineKind::Sodium,
			Engine::Openssl(_) => EngineKind::Openssl,
		}
	}

	pub fn cipher(&self) -> Cipher {
		match self {
			Engine::Sodium(c) => c.cipher(),
			Engine::Openssl(c) => c.cipher(),
		}
	}
}

impl Codec for Engine {
	fn encode(&self, plaintext: impl AsRef<[u8]>) -> Result<String, Error> {
		match self {
			Engine::Sodium(c) => c.encode(plaintext),
			Engine::Openssl(c) => c.encode(plaintext),
		}
	}

	fn decode(&self, armored: impl AsRef<[u8]>) -> Option<Vec<u8>> {
		match self {
			Engine::Sodium(c) => c.decode(armored),
			Engine::Openssl(c) => c.decode(armored),
		}
	}
}

/// The codec for one named configuration group.
///
/// Build one of these per group at startup (a broken configuration fails right there, long
/// before any data is encrypted), then hand clones to whatever needs to seal or open
/// envelopes.
///
/// # Example
///
/// ```rust
/// use envelope_codec::{Codec, Config, Encrypt, Error};
/// # fn main() -> Result<(), Error> {
///
/// let config = Config::from_toml_str(r#"
///     [default]
///     type = "sodium"
///     key = "01234567890123456789012345678901"
///
///     [legacy]
///     type = "openssl"
///     key = "01234567890123456789012345678901"
/// "#)?;
///
/// let encrypt = Encrypt::from_config(&config, "default")?;
/// assert_eq!("Sodium (default)", encrypt.to_string());
///
/// let envelope = encrypt.encode("some session data")?;
/// assert_eq!(Some(b"some session data".to_vec()), encrypt.decode(&envelope));
///
/// // Groups don't share envelopes, even with the same key
/// let legacy = Encrypt::from_config(&config, "legacy")?;
/// assert_eq!(None, legacy.decode(&envelope));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Encrypt {
	group: String,
	engine: Engine,
}

impl Encrypt {
	/// Create a codec for `group` directly, without going through a [`Config`].
	///
	/// When `cipher` is `None`, the engine's default cipher is used.
	#[tracing::instrument(level = "debug", skip(key))]
	pub fn new(
		group: impl Into<String> + fmt::Debug,
		kind: EngineKind,
		cipher: Option<Cipher>,
		key: impl Into<Key>,
	) -> Result<Self, Error> {
		let cipher = cipher.unwrap_or(kind.default_cipher());

		let engine = match kind {
			EngineKind::Sodium => Engine::Sodium(SodiumCodec::new(cipher, key)?),
			EngineKind::Openssl => Engine::Openssl(OpensslCodec::new(cipher, key)?),
		};

		Ok(Self {
			group: group.into(),
			engine,
		})
	}

	/// Create a codec from the named group of `config`.
	///
	/// # Errors
	///
	/// * [`Error::UnknownGroup`] if there is no such group.
	/// * [`Error::UnsupportedEngine`] if the group's `type` isn't a known engine.
	/// * [`Error::UnsupportedCipher`] if the group's `cipher` isn't one the engine knows.
	/// * [`Error::MissingKey`] or [`Error::InvalidKeyLength`] if the key is absent or unfit.
	#[tracing::instrument(level = "debug", skip(config))]
	pub fn from_config(config: &Config, group: &str) -> Result<Self, Error> {
		let settings = config
			.group(group)
			.ok_or_else(|| Error::unknown_group(group))?;

		let kind: EngineKind = settings.engine.parse()?;
		let cipher = settings
			.cipher
			.as_deref()
			.map(str::parse::<Cipher>)
			.transpose()?;
		let key = settings.key().ok_or(Error::MissingKey)?;

		Self::new(group, kind, cipher, key)
	}

	pub fn group(&self) -> &str {
		&self.group
	}

	pub fn engine(&self) -> &Engine {
		&self.engine
	}
}

impl Codec for Encrypt {
	fn encode(&self, plaintext: impl AsRef<[u8]>) -> Result<String, Error> {
		self.engine.encode(plaintext)
	}

	fn decode(&self, armored: impl AsRef<[u8]>) -> Option<Vec<u8>> {
		self.engine.decode(armored)
	}
}

impl fmt::Display for Encrypt {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.engine.kind(), self.group)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tests::{KEY32, init};

	fn config(body: &str) -> Config {
		Config::from_toml_str(body).unwrap()
	}

	#[test]
	fn display() {
		init();
		let encrypt = Encrypt::new("default", EngineKind::Sodium, None, KEY32).unwrap();

		assert_eq!("Sodium (default)", encrypt.to_string());

		let encrypt = Encrypt::new("cookies", EngineKind::Openssl, None, KEY32).unwrap();

		assert_eq!("Openssl (cookies)", encrypt.to_string());
	}

	#[test]
	fn default_ciphers() {
		init();

		let sodium = Encrypt::new("a", EngineKind::Sodium, None, KEY32).unwrap();
		assert_eq!(Cipher::Aes256Gcm, sodium.engine().cipher());

		let openssl = Encrypt::new("b", EngineKind::Openssl, None, KEY32).unwrap();
		assert_eq!(Cipher::Aes256Cbc, openssl.engine().cipher());
	}

	#[test]
	fn default_cipher_answers() {
		init();
		let config = config(
			r#"
			[default]
			type = "sodium"
			key = "01234567890123456789012345678901"
			"#,
		);

		let encrypt = Encrypt::from_config(&config, "default").unwrap();
		let Engine::Sodium(codec) = encrypt.engine() else {
			panic!("expected the sodium engine");
		};

		assert_eq!(
			"eyJpdiI6Ik1URXhNVEV4TVRFeE1URXgiLCJ2YWx1ZSI6ImxSVXgwWDBNQklkSXRUOGw5cGIwVmtMSm96XC9GIn0=",
			codec.encode_with_iv("test2", "111111111111").unwrap()
		);
	}

	#[test]
	fn from_config_round_trip() {
		init();
		let config = config(
			r#"
			[default]
			type = "sodium"
			key = "01234567890123456789012345678901"
			cipher = "xchacha20-poly1305-ietf"
			"#,
		);

		let encrypt = Encrypt::from_config(&config, "default").unwrap();
		assert_eq!(Cipher::XChaCha20Poly1305Ietf, encrypt.engine().cipher());
		assert_eq!("default", encrypt.group());

		let armored = encrypt.encode(b"hello").unwrap();
		assert_eq!(Some(b"hello".to_vec()), encrypt.decode(&armored));
	}

	#[test]
	fn unknown_group() {
		init();
		let config = config("");

		let result = Encrypt::from_config(&config, "default");
		assert!(matches!(result, Err(Error::UnknownGroup(g)) if g == "default"));
	}

	#[test]
	fn non_existent_engine() {
		init();
		let config = config(
			r#"
			[default]
			type = "doesnotexist"
			key = "01234567890123456789012345678901"
			cipher = "aes-256-gcm"
			"#,
		);

		let result = Encrypt::from_config(&config, "default");
		assert!(matches!(result, Err(Error::UnsupportedEngine(e)) if e == "doesnotexist"));
	}

	#[test]
	fn absent_key() {
		init();
		let config = config(
			r#"
			[default]
			type = "sodium"
			cipher = "aes-256-gcm"
			"#,
		);

		let result = Encrypt::from_config(&config, "default");
		assert!(matches!(result, Err(Error::MissingKey)));
	}

	#[test]
	fn short_key() {
		init();
		let config = config(
			r#"
			[default]
			type = "sodium"
			key = "1234"
			cipher = "aes-256-gcm"
			"#,
		);

		let result = Encrypt::from_config(&config, "default");
		assert!(matches!(result, Err(Error::InvalidKeyLength { .. })));
	}

	#[test]
	fn cipher_from_the_wrong_engine() {
		init();
		let config = config(
			r#"
			[default]
			type = "openssl"
			key = "01234567890123456789012345678901"
			cipher = "chacha20-poly1305"
			"#,
		);

		let result = Encrypt::from_config(&config, "default");
		assert!(matches!(result, Err(Error::UnsupportedCipher(_))));
	}

	#[test]
	fn unknown_cipher() {
		init();
		let config = config(
			r#"
			[default]
			type = "sodium"
			key = "01234567890123456789012345678901"
			cipher = "des"
			"#,
		);

		let result = Encrypt::from_config(&config, "default");
		assert!(matches!(result, Err(Error::UnsupportedCipher(c)) if c == "des"));
	}

	#[test]
	fn engine_names() {
		assert_eq!(EngineKind::Sodium, "SODIUM".parse::<EngineKind>().unwrap());
		assert_eq!(EngineKind::Openssl, "openssl".parse::<EngineKind>().unwrap());
		assert!(matches!(
			"mcrypt".parse::<EngineKind>(),
			Err(Error::UnsupportedEngine(_))
		));
	}
}
