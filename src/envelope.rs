use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::io;

use super::Error;

/// The serialized form of an encrypted value.
///
/// On the wire this is a compact JSON object, `{"iv":"...","value":"..."}` (plus `"mac"` for
/// envelopes produced by the openssl engine), with every field base64 encoded, and the whole
/// JSON text base64 encoded again so it can travel in cookies, query strings and text
/// columns.  Slashes inside JSON strings are written as `\/`, which keeps the output
/// byte-for-byte identical to envelopes already out there in the wild.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Envelope {
	pub(crate) iv: String,
	pub(crate) value: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub(crate) mac: Option<String>,
}

impl Envelope {
	pub(crate) fn new(iv: &[u8], value: &[u8]) -> Self {
		Self {
			iv: STANDARD.encode(iv),
			value: STANDARD.encode(value),
			mac: None,
		}
	}

	pub(crate) fn with_mac(self, mac: String) -> Self {
		Self {
			mac: Some(mac),
			..self
		}
	}

	pub(crate) fn iv(&self) -> Result<Vec<u8>, Error> {
		STANDARD
			.decode(&self.iv)
			.map_err(|e| Error::decoding(format!("iv: {e}")))
	}

	pub(crate) fn value(&self) -> Result<Vec<u8>, Error> {
		STANDARD
			.decode(&self.value)
			.map_err(|e| Error::decoding(format!("value: {e}")))
	}

	/// Serialize to JSON, then wrap the JSON in base64.
	pub(crate) fn to_armor(&self) -> Result<String, Error> {
		let mut json = Vec::<u8>::new();
		let mut ser = serde_json::Serializer::with_formatter(&mut json, SlashEscaping);

		self.serialize(&mut ser)
			.map_err(|e| Error::encoding(e.to_string()))?;

		Ok(STANDARD.encode(&json))
	}

	pub(crate) fn from_armor(armored: &[u8]) -> Result<Self, Error> {
		let json = STANDARD
			.decode(armored)
			.map_err(|e| Error::decoding(format!("armor: {e}")))?;

		serde_json::from_slice(&json).map_err(|e| Error::decoding(format!("json: {e}")))
	}
}

/// Compact JSON, except that `/` is escaped inside strings.
struct SlashEscaping;

impl serde_json::ser::Formatter for SlashEscaping {
	fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
	where
		W: ?Sized + io::Write,
	{
		let mut parts = fragment.split('/');

		if let Some(first) = parts.next() {
			writer.write_all(first.as_bytes())?;
		}

		for part in parts {
			writer.write_all(b"\\/")?;
			writer.write_all(part.as_bytes())?;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn json_of(armored: &str) -> String {
		String::from_utf8(STANDARD.decode(armored).unwrap()).unwrap()
	}

	#[test]
	fn field_order_and_compactness() {
		let armored = Envelope::new(b"000000000000", b"abc").to_armor().unwrap();

		assert_eq!(
			r#"{"iv":"MDAwMDAwMDAwMDAw","value":"YWJj"}"#,
			json_of(&armored)
		);
	}

	#[test]
	fn slashes_are_escaped() {
		// base64 of 0xff 0xff 0xff is "////"
		let armored = Envelope::new(b"iv", &[0xff, 0xff, 0xff]).to_armor().unwrap();

		assert_eq!(r#"{"iv":"aXY=","value":"\/\/\/\/"}"#, json_of(&armored));
	}

	#[test]
	fn mac_comes_last() {
		let armored = Envelope::new(b"iv", b"v")
			.with_mac("abcd".to_string())
			.to_armor()
			.unwrap();

		assert_eq!(r#"{"iv":"aXY=","value":"dg==","mac":"abcd"}"#, json_of(&armored));
	}

	#[test]
	fn reads_escaped_and_unescaped_slashes() {
		let escaped = STANDARD.encode(r#"{"iv":"aXY=","value":"\/\/\/\/"}"#);
		let plain = STANDARD.encode(r#"{"value":"////","iv":"aXY="}"#);

		let a = Envelope::from_armor(escaped.as_bytes()).unwrap();
		let b = Envelope::from_armor(plain.as_bytes()).unwrap();

		assert_eq!(a, b);
		assert_eq!(vec![0xffu8, 0xff, 0xff], a.value().unwrap());
		assert_eq!(b"iv".to_vec(), a.iv().unwrap());
	}

	#[test]
	fn rejects_garbage() {
		assert!(matches!(
			Envelope::from_armor(b":/invalid?1"),
			Err(Error::Decoding(_))
		));
		assert!(matches!(
			Envelope::from_armor(STANDARD.encode("asdasd").as_bytes()),
			Err(Error::Decoding(_))
		));
	}

	#[test]
	fn rejects_missing_fields() {
		let armored = STANDARD.encode(r#"{"iv":"aXY="}"#);

		assert!(matches!(
			Envelope::from_armor(armored.as_bytes()),
			Err(Error::Decoding(_))
		));
	}

	#[test]
	fn rejects_non_string_fields() {
		let armored = STANDARD.encode(r#"{"iv":12,"value":"dg=="}"#);

		assert!(matches!(
			Envelope::from_armor(armored.as_bytes()),
			Err(Error::Decoding(_))
		));
	}

	#[test]
	fn bad_inner_base64() {
		let armored = STANDARD.encode(r#"{"iv":"!!!","value":"dg=="}"#);
		let envelope = Envelope::from_armor(armored.as_bytes()).unwrap();

		assert!(matches!(envelope.iv(), Err(Error::Decoding(_))));
	}
}
