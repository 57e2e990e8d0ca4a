//! Text encodings usable in frame bodies

use crate::error::{CartoucheError, ErrorKind, Result};
use crate::macros::err;

/// The text encodings this version of the format allows in frame bodies
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum TextEncoding {
	/// ISO-8859-1, a.k.a. Latin-1
	Latin1 = 0,
	/// UTF-16 with a byte order mark
	Utf16 = 1,
}

impl TextEncoding {
	/// Get a `TextEncoding` from a u8, must be in range 0..=1
	pub fn from_u8(byte: u8) -> Option<Self> {
		match byte {
			0 => Some(Self::Latin1),
			1 => Some(Self::Utf16),
			_ => None,
		}
	}
}

/// Decode a string of the given encoding, stripping any trailing nul terminators
///
/// # Errors
///
/// The bytes are not a valid string of the given encoding.
pub fn decode_text(encoding: TextEncoding, bytes: &[u8]) -> Result<String> {
	let mut text = match encoding {
		TextEncoding::Latin1 => latin1_decode(bytes),
		TextEncoding::Utf16 => utf16_decode(bytes)?,
	};

	while text.ends_with('\0') {
		text.pop();
	}

	Ok(text)
}

pub(crate) fn latin1_decode(bytes: &[u8]) -> String {
	// Latin-1 maps 1:1 onto the first 256 Unicode code points
	bytes.iter().map(|&b| char::from(b)).collect()
}

pub(crate) fn utf16_decode(bytes: &[u8]) -> Result<String> {
	if bytes.len() < 2 || bytes.len() % 2 != 0 {
		err!(TextDecode("UTF-16 string has an invalid length"));
	}

	let unverified: Vec<u16> = match (bytes[0], bytes[1]) {
		(0xFF, 0xFE) => bytes[2..]
			.chunks_exact(2)
			.map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
			.collect(),
		(0xFE, 0xFF) => bytes[2..]
			.chunks_exact(2)
			.map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
			.collect(),
		_ => err!(TextDecode("UTF-16 string is missing a byte order mark")),
	};

	char::decode_utf16(unverified)
		.collect::<std::result::Result<String, _>>()
		.map_err(|_| CartoucheError::new(ErrorKind::TextDecode("invalid UTF-16 sequence")))
}

#[cfg(test)]
mod tests {
	use super::{TextEncoding, decode_text};

	#[test_log::test]
	fn latin1() {
		let decoded = decode_text(TextEncoding::Latin1, b"Stray Cat Strut\0").unwrap();
		assert_eq!(decoded, "Stray Cat Strut");
	}

	#[test_log::test]
	fn utf16_both_byte_orders() {
		let le = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
		let be = [0xFE, 0xFF, 0x00, b'h', 0x00, b'i'];

		assert_eq!(decode_text(TextEncoding::Utf16, &le).unwrap(), "hi");
		assert_eq!(decode_text(TextEncoding::Utf16, &be).unwrap(), "hi");
	}

	#[test_log::test]
	fn utf16_missing_bom() {
		assert!(decode_text(TextEncoding::Utf16, &[b'h', 0x00]).is_err());
	}

	#[test_log::test]
	fn utf16_unpaired_surrogate() {
		let unpaired = [0xFF, 0xFE, 0x00, 0xD8];
		assert!(decode_text(TextEncoding::Utf16, &unpaired).is_err());
	}
}
