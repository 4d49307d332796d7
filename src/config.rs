use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Deserializer};
use std::{collections::BTreeMap, path::Path};

use super::{Error, Key};

/// Settings for one named group: which engine, which key, which cipher.
///
/// ```toml
/// [default]
/// type = "sodium"
/// key = "01234567890123456789012345678901"
/// cipher = "xchacha20-poly1305-ietf"
/// ```
#[derive(Debug, Deserialize)]
pub struct GroupConfig {
	#[serde(rename = "type")]
	pub engine: String,

	#[serde(default, deserialize_with = "deserialize_key")]
	key: Option<SecretString>,

	#[serde(default)]
	pub cipher: Option<String>,
}

fn deserialize_key<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SecretString>, D::Error> {
	Ok(Option::<String>::deserialize(d)?.map(SecretString::from))
}

impl GroupConfig {
	pub fn new(engine: impl Into<String>, key: Option<&str>, cipher: Option<&str>) -> Self {
		Self {
			engine: engine.into(),
			key: key.map(|k| SecretString::from(k.to_string())),
			cipher: cipher.map(str::to_string),
		}
	}

	/// The configured key material, if there is any.
	pub fn key(&self) -> Option<Key> {
		self.key.as_ref().map(|k| Key::from(k.expose_secret()))
	}
}

/// Every configured group, by name.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Config {
	groups: BTreeMap<String, GroupConfig>,
}

impl Config {
	pub fn from_toml_str(s: &str) -> Result<Self, Error> {
		toml::from_str(s).map_err(|e| Error::config(format!("invalid TOML: {e}")))
	}

	pub fn from_json_str(s: &str) -> Result<Self, Error> {
		serde_json::from_str(s).map_err(|e| Error::config(format!("invalid JSON: {e}")))
	}

	/// Read a configuration file, in TOML or JSON according to its extension.
	#[tracing::instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
	pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
		let path = path.as_ref();

		let raw = std::fs::read_to_string(path)
			.map_err(|e| Error::config(format!("failed to read {}: {e}", path.display())))?;

		let config = match path.extension().and_then(|e| e.to_str()) {
			Some("toml") => Self::from_toml_str(&raw)?,
			Some("json") => Self::from_json_str(&raw)?,
			_ => {
				return Err(Error::config(format!(
					"unsupported config format: {}",
					path.display()
				)));
			},
		};

		tracing::debug!(groups = config.groups.len(), "Loaded encryption config");

		Ok(config)
	}

	pub fn group(&self, name: &str) -> Option<&GroupConfig> {
		self.groups.get(name)
	}

	pub fn group_names(&self) -> impl Iterator<Item = &str> {
		self.groups.keys().map(String::as_str)
	}

	pub fn insert(&mut self, name: impl Into<String>, group: GroupConfig) {
		self.groups.insert(name.into(), group);
	}
}
