//! The 10-byte per-frame header

use crate::error::{CartoucheError, ErrorKind, Result};

use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// A 4-character frame identifier
///
/// Identifiers consist of the characters `'A'..='Z'` and `'0'..='9'` only. The first
/// byte of an identifier can therefore never be zero, which is what makes the padding
/// sentinel (a zero byte where an identifier should start) unambiguous.
#[derive(PartialEq, Clone, Debug, Eq, Hash)]
pub struct FrameId(Cow<'static, str>);

impl FrameId {
	/// Attempts to create a `FrameId` from an ID string
	///
	/// # Errors
	///
	/// * `id` contains invalid characters (must be 'A'..='Z' and '0'..='9')
	/// * `id` is an invalid length (must be 4)
	///
	/// # Examples
	///
	/// ```rust
	/// use cartouche::FrameId;
	///
	/// assert!(FrameId::new("TIT2").is_ok());
	/// assert!(FrameId::new("bad!").is_err());
	/// ```
	pub fn new<I>(id: I) -> Result<Self>
	where
		I: Into<Cow<'static, str>>,
	{
		let id = id.into();
		Self::verify_id(&id)?;

		if id.len() != 4 {
			return Err(CartoucheError::new(ErrorKind::BadFrameId(
				id.into_owned().into_bytes(),
			)));
		}

		Ok(Self(id))
	}

	pub(crate) fn from_wire(bytes: [u8; 4]) -> Result<Self> {
		let Ok(id_str) = std::str::from_utf8(&bytes) else {
			return Err(CartoucheError::new(ErrorKind::BadFrameId(bytes.to_vec())));
		};

		Self::new(id_str.to_owned())
	}

	fn verify_id(id_str: &str) -> Result<()> {
		for c in id_str.chars() {
			if !c.is_ascii_uppercase() && !c.is_ascii_digit() {
				return Err(CartoucheError::new(ErrorKind::BadFrameId(
					id_str.as_bytes().to_vec(),
				)));
			}
		}

		Ok(())
	}

	/// Extracts the string from the ID
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for FrameId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Flags that apply to a single frame
///
/// These round-trip as declared; this codec does not act on them (it neither
/// decompresses nor decrypts frame bodies).
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameFlags {
	/// Preserve this frame if it is unknown and the tag is altered
	pub tag_alter_preservation: bool,
	/// Preserve this frame if it is unknown and the file, excluding the tag, is altered
	pub file_alter_preservation: bool,
	/// The content of this frame is intended to be read only
	pub read_only: bool,
	/// The frame body is zlib-compressed
	pub compression: bool,
	/// The frame body is encrypted
	pub encryption: bool,
	/// The frame belongs to a group of frames
	pub grouping_identity: bool,
}

impl FrameFlags {
	pub(crate) fn from_bytes(bytes: [u8; 2]) -> Self {
		Self {
			tag_alter_preservation: bytes[0] & 0x80 == 0x80,
			file_alter_preservation: bytes[0] & 0x40 == 0x40,
			read_only: bytes[0] & 0x20 == 0x20,
			compression: bytes[1] & 0x80 == 0x80,
			encryption: bytes[1] & 0x40 == 0x40,
			grouping_identity: bytes[1] & 0x20 == 0x20,
		}
	}

	/// Get the 2-byte representation of the flags
	pub fn as_bytes(&self) -> [u8; 2] {
		let mut bytes = [0, 0];

		if self.tag_alter_preservation {
			bytes[0] |= 0x80;
		}

		if self.file_alter_preservation {
			bytes[0] |= 0x40;
		}

		if self.read_only {
			bytes[0] |= 0x20;
		}

		if self.compression {
			bytes[1] |= 0x80;
		}

		if self.encryption {
			bytes[1] |= 0x40;
		}

		if self.grouping_identity {
			bytes[1] |= 0x20;
		}

		bytes
	}
}

/// A frame header
///
/// These are rarely constructed by hand. Usually they are created in the background
/// when making a new [`Frame`](crate::Frame).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameHeader {
	pub(crate) id: FrameId,
	pub(crate) size: u32,
	/// The frame's flags
	pub flags: FrameFlags,
}

impl FrameHeader {
	/// The number of bytes a frame header occupies on the wire
	pub const SIZE: u32 = 10;

	/// Create a new `FrameHeader` with a zero body size
	///
	/// NOTE: Once the header is created, the ID becomes immutable.
	pub fn new(id: FrameId, flags: FrameFlags) -> Self {
		Self { id, size: 0, flags }
	}

	/// Get the ID of the frame
	pub fn id(&self) -> &FrameId {
		&self.id
	}

	/// The declared size of the frame body, excluding these 10 header bytes
	///
	/// Unlike the tag header's size, this is stored as a plain big-endian integer.
	pub fn size(&self) -> u32 {
		self.size
	}

	/// Read a candidate frame header and classify it as frame-start or padding-start
	///
	/// This is a one-byte-lookahead probe: a zero byte where a frame identifier should
	/// start means the frame data has ended and the padding begun, in which case `None`
	/// is returned with exactly that one byte consumed. Otherwise the remaining 9
	/// header bytes are read.
	pub(crate) fn parse<R>(reader: &mut R) -> Result<Option<Self>>
	where
		R: Read,
	{
		let probe = reader.read_u8()?;
		if probe == 0 {
			log::trace!("Encountered the padding sentinel");
			return Ok(None);
		}

		let mut rest = [0; 9];
		reader.read_exact(&mut rest)?;

		let id = FrameId::from_wire([probe, rest[0], rest[1], rest[2]])?;
		let size = u32::from_be_bytes([rest[3], rest[4], rest[5], rest[6]]);
		let flags = FrameFlags::from_bytes([rest[7], rest[8]]);

		Ok(Some(Self { id, size, flags }))
	}

	pub(crate) fn write_to<W>(&self, writer: &mut W) -> Result<()>
	where
		W: Write,
	{
		writer.write_all(self.id.as_str().as_bytes())?;
		writer.write_u32::<BigEndian>(self.size)?;
		writer.write_all(&self.flags.as_bytes())?;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::{FrameFlags, FrameHeader, FrameId};

	use std::io::Cursor;

	#[test_log::test]
	fn frame_id_validation() {
		assert!(FrameId::new("TAL").is_err());
		assert!(FrameId::new("TALBX").is_err());
		assert!(FrameId::new("talb").is_err());
		assert_eq!(FrameId::new("TALB").unwrap().as_str(), "TALB");
	}

	#[test_log::test]
	fn probe_detects_padding_sentinel() {
		let mut reader = Cursor::new([0x00, 0x00, 0x00]);
		assert!(FrameHeader::parse(&mut reader).unwrap().is_none());
		// Only the sentinel byte itself may be consumed
		assert_eq!(reader.position(), 1);
	}

	#[test_log::test]
	fn parse_frame_header() {
		let bytes = [
			b'T', b'I', b'T', b'2', 0x00, 0x00, 0x01, 0x00, 0b1010_0000, 0b0100_0000,
		];
		let header = FrameHeader::parse(&mut Cursor::new(bytes))
			.unwrap()
			.unwrap();

		assert_eq!(header.id().as_str(), "TIT2");
		assert_eq!(header.size(), 256);
		assert_eq!(
			header.flags,
			FrameFlags {
				tag_alter_preservation: true,
				read_only: true,
				encryption: true,
				..FrameFlags::default()
			}
		);
	}

	#[test_log::test]
	fn flags_round_trip() {
		let flags = FrameFlags {
			file_alter_preservation: true,
			compression: true,
			grouping_identity: true,
			..FrameFlags::default()
		};

		assert_eq!(FrameFlags::from_bytes(flags.as_bytes()), flags);
	}
}
