//! The optional extended header

use crate::error::Result;
use crate::macros::err;

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

const CRC_FLAG: u16 = 0x8000;

// The declared size excludes the 4-byte size field itself
const SIZE_WITHOUT_CRC: u32 = 6;
const SIZE_WITH_CRC: u32 = 10;

/// The optional extended header
///
/// Present iff the [`TagHeader`](crate::TagHeader)'s `extended_header` flag is set. It
/// carries data that is not vital to reading the tag: a hint about the padding size and
/// an optional CRC-32 of the frame data.
///
/// Unlike the tag header's size field, the extended header's on-wire size field is a
/// **plain** big-endian integer, not syncsafe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedHeader {
	padding_size_hint: u32,
	crc: Option<u32>,
	dirty: bool,
}

impl ExtendedHeader {
	/// Create a new extended header with no CRC and a zero padding hint
	pub fn new() -> Self {
		Self {
			padding_size_hint: 0,
			crc: None,
			dirty: true,
		}
	}

	pub(crate) fn parse<R>(reader: &mut R) -> Result<Self>
	where
		R: Read,
	{
		log::debug!("Parsing extended header");

		let size = reader.read_u32::<BigEndian>()?;
		if size != SIZE_WITHOUT_CRC && size != SIZE_WITH_CRC {
			err!(BadExtendedHeaderSize);
		}

		let flags = reader.read_u16::<BigEndian>()?;
		let crc_present = flags & CRC_FLAG == CRC_FLAG;

		// The declared size and the CRC flag encode the same fact twice
		if crc_present != (size == SIZE_WITH_CRC) {
			err!(BadExtendedHeaderSize);
		}

		let padding_size_hint = reader.read_u32::<BigEndian>()?;

		let mut crc = None;
		if crc_present {
			crc = Some(reader.read_u32::<BigEndian>()?);
		}

		Ok(Self {
			padding_size_hint,
			crc,
			dirty: false,
		})
	}

	pub(crate) fn write_to<W>(&mut self, writer: &mut W) -> Result<()>
	where
		W: Write,
	{
		let (size, flags) = match self.crc {
			Some(_) => (SIZE_WITH_CRC, CRC_FLAG),
			None => (SIZE_WITHOUT_CRC, 0),
		};

		writer.write_u32::<BigEndian>(size)?;
		writer.write_u16::<BigEndian>(flags)?;
		writer.write_u32::<BigEndian>(self.padding_size_hint)?;

		if let Some(crc) = self.crc {
			writer.write_u32::<BigEndian>(crc)?;
		}

		self.dirty = false;
		Ok(())
	}

	/// The total number of bytes the extended header occupies on the wire,
	/// including its own size field
	pub fn size(&self) -> u32 {
		match self.crc {
			Some(_) => 4 + SIZE_WITH_CRC,
			None => 4 + SIZE_WITHOUT_CRC,
		}
	}

	/// The amount of padding the tag claims to end with
	///
	/// This is a hint recorded at write time; the padding buffer owned by
	/// [`Tag`](crate::Tag) is authoritative.
	pub fn padding_size_hint(&self) -> u32 {
		self.padding_size_hint
	}

	/// Set the padding size hint
	pub fn set_padding_size_hint(&mut self, padding_size_hint: u32) {
		if self.padding_size_hint != padding_size_hint {
			self.padding_size_hint = padding_size_hint;
			self.dirty = true;
		}
	}

	/// The CRC-32 of the frame data, if one was stored
	///
	/// The value round-trips as data; this codec does not compute or verify it.
	pub fn crc(&self) -> Option<u32> {
		self.crc
	}

	/// Set or clear the stored CRC-32
	pub fn set_crc(&mut self, crc: Option<u32>) {
		if self.crc != crc {
			self.crc = crc;
			self.dirty = true;
		}
	}

	/// Whether any field has been mutated since the extended header was last serialized
	pub fn is_dirty(&self) -> bool {
		self.dirty
	}
}

impl Default for ExtendedHeader {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::ExtendedHeader;

	use std::io::Cursor;

	#[test_log::test]
	fn round_trip_without_crc() {
		let mut header = ExtendedHeader::new();
		header.set_padding_size_hint(256);

		let mut bytes = Vec::new();
		header.write_to(&mut bytes).unwrap();
		assert_eq!(bytes.len() as u32, header.size());
		assert!(!header.is_dirty());

		let reparsed = ExtendedHeader::parse(&mut Cursor::new(bytes)).unwrap();
		assert_eq!(reparsed.padding_size_hint(), 256);
		assert_eq!(reparsed.crc(), None);
		assert_eq!(reparsed.size(), 10);
	}

	#[test_log::test]
	fn round_trip_with_crc() {
		let mut header = ExtendedHeader::new();
		header.set_crc(Some(0xDEAD_BEEF));

		let mut bytes = Vec::new();
		header.write_to(&mut bytes).unwrap();
		assert_eq!(bytes.len() as u32, header.size());

		let reparsed = ExtendedHeader::parse(&mut Cursor::new(bytes)).unwrap();
		assert_eq!(reparsed.crc(), Some(0xDEAD_BEEF));
		assert_eq!(reparsed.size(), 14);
	}

	#[test_log::test]
	fn reject_bad_size() {
		// Declared size 8 is neither 6 nor 10
		let bytes = [0, 0, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0];
		assert!(ExtendedHeader::parse(&mut Cursor::new(bytes)).is_err());
	}

	#[test_log::test]
	fn reject_crc_flag_size_mismatch() {
		// Size claims a CRC, the flags don't
		let bytes = [0, 0, 0, 10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
		assert!(ExtendedHeader::parse(&mut Cursor::new(bytes)).is_err());
	}
}
