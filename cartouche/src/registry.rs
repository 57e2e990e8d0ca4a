//! The pluggable frame-type registry
//!
//! The container codec does not know what any frame body *means*; it only knows how
//! many bytes it occupies. Interpreting a body is delegated to a [`BodyDecoder`]
//! registered for the frame's ID. The registry is handed to [`Tag::read`](crate::Tag::read)
//! by the caller, so the container logic stays independent of how many or which frame
//! types are known.

use crate::error::{CartoucheError, ErrorKind, Result};
use crate::frame::header::FrameId;
use crate::macros::err;
use crate::util::text::{TextEncoding, decode_text, latin1_decode};

use std::collections::HashMap;

/// A decoded frame body
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum FrameContent {
	/// The body of a text information frame: an encoding byte followed by a string
	Text {
		/// The encoding declared by the body's first byte
		encoding: TextEncoding,
		/// The decoded string, trailing nul terminators stripped
		value: String,
	},
	/// The body of a URL link frame: a Latin-1 string with no encoding byte
	Url(String),
	/// An opaque body that is accepted as-is
	Binary(Vec<u8>),
}

/// A strategy for interpreting the bodies of one frame type
///
/// Returning an error marks the frame invalid; it never aborts reading the tag
/// (outside [`ParsingMode::Strict`](crate::config::ParsingMode::Strict)).
pub trait BodyDecoder: Send + Sync {
	/// Attempt to interpret a raw frame body
	///
	/// # Errors
	///
	/// The bytes do not form a well-formed body for this frame type.
	fn decode(&self, id: &FrameId, body: &[u8]) -> Result<FrameContent>;
}

/// Decodes text information frames ("T---"): encoding byte + string
#[derive(Copy, Clone, Debug, Default)]
pub struct TextDecoder;

impl BodyDecoder for TextDecoder {
	fn decode(&self, _id: &FrameId, body: &[u8]) -> Result<FrameContent> {
		let [encoding_byte, text @ ..] = body else {
			err!(BadFrameLength);
		};

		let Some(encoding) = TextEncoding::from_u8(*encoding_byte) else {
			err!(BadFrameContent("unknown text encoding"));
		};

		let value = decode_text(encoding, text)?;
		Ok(FrameContent::Text { encoding, value })
	}
}

/// Decodes URL link frames ("W---"): a bare Latin-1 string
#[derive(Copy, Clone, Debug, Default)]
pub struct UrlDecoder;

impl BodyDecoder for UrlDecoder {
	fn decode(&self, _id: &FrameId, body: &[u8]) -> Result<FrameContent> {
		if body.is_empty() {
			err!(BadFrameLength);
		}

		let mut url = latin1_decode(body);
		while url.ends_with('\0') {
			url.pop();
		}

		Ok(FrameContent::Url(url))
	}
}

/// Accepts any body verbatim
///
/// Useful for frame types whose sub-structure the application doesn't care about but
/// whose presence should still count as valid.
#[derive(Copy, Clone, Debug, Default)]
pub struct BinaryDecoder;

impl BodyDecoder for BinaryDecoder {
	fn decode(&self, _id: &FrameId, body: &[u8]) -> Result<FrameContent> {
		Ok(FrameContent::Binary(body.to_vec()))
	}
}

/// Standard text information frame IDs
const TEXT_FRAME_IDS: [&str; 38] = [
	"TALB", "TBPM", "TCOM", "TCON", "TCOP", "TDAT", "TDLY", "TENC", "TEXT", "TFLT", "TIME",
	"TIT1", "TIT2", "TIT3", "TKEY", "TLAN", "TLEN", "TMED", "TOAL", "TOFN", "TOLY", "TOPE",
	"TORY", "TOWN", "TPE1", "TPE2", "TPE3", "TPE4", "TPOS", "TPUB", "TRCK", "TRDA", "TRSN",
	"TRSO", "TSIZ", "TSRC", "TSSE", "TYER",
];

/// Standard URL link frame IDs
const URL_FRAME_IDS: [&str; 8] = [
	"WCOM", "WCOP", "WOAF", "WOAR", "WOAS", "WORS", "WPAY", "WPUB",
];

/// Frame IDs whose sub-structure is accepted verbatim
const BINARY_FRAME_IDS: [&str; 10] = [
	"APIC", "COMM", "GEOB", "MCDI", "PCNT", "POPM", "PRIV", "TXXX", "UFID", "WXXX",
];

/// Maps frame IDs to body-decoding strategies
///
/// A frame whose ID has no registered decoder, or whose decoder rejects the body, is
/// classified invalid when the tag is read.
///
/// # Examples
///
/// ```rust
/// use cartouche::{BinaryDecoder, FrameId, FrameRegistry};
///
/// # fn main() -> cartouche::error::Result<()> {
/// // The default registry knows the standard frame types
/// let registry = FrameRegistry::default();
/// assert!(registry.decoder(&FrameId::new("TIT2")?).is_some());
///
/// // Application-specific frame types can be added
/// let mut registry = FrameRegistry::default();
/// registry.register(&FrameId::new("XSOU")?, BinaryDecoder);
/// # Ok(()) }
/// ```
pub struct FrameRegistry {
	decoders: HashMap<String, Box<dyn BodyDecoder>>,
}

impl Default for FrameRegistry {
	/// A registry knowing the standard frame types: text information frames decode
	/// through [`TextDecoder`], URL link frames through [`UrlDecoder`], and the
	/// structured binary frames (APIC, GEOB, PRIV, ...) are accepted verbatim.
	fn default() -> Self {
		default_registry()
	}
}

impl FrameRegistry {
	/// Create a registry with no decoders
	///
	/// Every frame read through an empty registry is classified invalid.
	pub fn new() -> Self {
		Self {
			decoders: HashMap::new(),
		}
	}

	/// Register a decoder for a frame ID, replacing any existing one
	pub fn register<D>(&mut self, id: &FrameId, decoder: D)
	where
		D: BodyDecoder + 'static,
	{
		self.decoders
			.insert(id.as_str().to_owned(), Box::new(decoder));
	}

	/// Get the decoder registered for an ID, if any
	pub fn decoder(&self, id: &FrameId) -> Option<&dyn BodyDecoder> {
		self.decoders.get(id.as_str()).map(Box::as_ref)
	}

	pub(crate) fn decode(&self, id: &FrameId, body: &[u8]) -> Result<FrameContent> {
		let Some(decoder) = self.decoder(id) else {
			return Err(CartoucheError::new(ErrorKind::UnsupportedFrameId(
				id.as_str().to_owned(),
			)));
		};

		decoder.decode(id, body)
	}
}

impl std::fmt::Debug for FrameRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut ids: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
		ids.sort_unstable();

		f.debug_struct("FrameRegistry").field("ids", &ids).finish()
	}
}

/// Builds the registry of standard frame types
pub(crate) fn default_registry() -> FrameRegistry {
	let mut registry = FrameRegistry::new();

	for id in TEXT_FRAME_IDS {
		registry
			.decoders
			.insert(id.to_owned(), Box::new(TextDecoder));
	}

	for id in URL_FRAME_IDS {
		registry.decoders.insert(id.to_owned(), Box::new(UrlDecoder));
	}

	for id in BINARY_FRAME_IDS {
		registry
			.decoders
			.insert(id.to_owned(), Box::new(BinaryDecoder));
	}

	registry
}

#[cfg(test)]
mod tests {
	use super::{FrameContent, FrameRegistry};
	use crate::frame::header::FrameId;
	use crate::util::text::TextEncoding;

	#[test_log::test]
	fn text_decoding() {
		let registry = FrameRegistry::default();
		let id = FrameId::new("TALB").unwrap();

		let decoded = registry.decode(&id, b"\x00Built For Speed\0").unwrap();
		assert_eq!(
			decoded,
			FrameContent::Text {
				encoding: TextEncoding::Latin1,
				value: String::from("Built For Speed"),
			}
		);

		// Missing encoding byte
		assert!(registry.decode(&id, b"").is_err());
		// Encoding byte out of range
		assert!(registry.decode(&id, b"\x42oops").is_err());
	}

	#[test_log::test]
	fn url_decoding() {
		let registry = FrameRegistry::default();
		let id = FrameId::new("WOAR").unwrap();

		let decoded = registry.decode(&id, b"http://example.com\0").unwrap();
		assert_eq!(decoded, FrameContent::Url(String::from("http://example.com")));
	}

	#[test_log::test]
	fn unknown_id_is_an_error() {
		let registry = FrameRegistry::default();
		let id = FrameId::new("ZZZZ").unwrap();

		assert!(registry.decode(&id, b"anything").is_err());
	}
}
