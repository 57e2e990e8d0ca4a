//! The fixed 10-byte header at the start of every tag

use crate::error::Result;
use crate::macros::err;
use crate::util::synchsafe;

use std::io::{Read, Write};

/// The 3-byte magic identifier every tag starts with
pub(crate) const IDENTIFIER: [u8; 3] = *b"ID3";

const MAJOR_VERSION: u8 = 3;

/// Flags that apply to the entire tag
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct TagFlags {
	/// Whether or not the tag content is unsynchronised
	///
	/// The flag round-trips; this codec does not apply the unsynchronisation scheme
	/// to tag content.
	pub unsynchronisation: bool,
	/// Whether an [`ExtendedHeader`](crate::ExtendedHeader) follows the tag header
	///
	/// This flag and the extended header itself are toggled as a unit through
	/// [`Tag::set_extended_header`](crate::Tag::set_extended_header).
	pub extended_header: bool,
	/// Indicates the tag is in an experimental stage
	pub experimental: bool,
}

impl TagFlags {
	/// Get the byte representation of the flags
	pub fn as_byte(&self) -> u8 {
		let mut byte = 0;

		if self.unsynchronisation {
			byte |= 0x80;
		}

		if self.extended_header {
			byte |= 0x40;
		}

		if self.experimental {
			byte |= 0x20;
		}

		byte
	}

	pub(crate) fn from_byte(byte: u8) -> Self {
		// The low 5 bits are reserved, ignore them
		Self {
			unsynchronisation: byte & 0x80 == 0x80,
			extended_header: byte & 0x40 == 0x40,
			experimental: byte & 0x20 == 0x20,
		}
	}
}

/// The fixed tag header
///
/// This holds the format version, the tag-wide flags, and the declared size of the rest
/// of the tag. The size **excludes** these 10 header bytes but includes the extended
/// header, all frames, and the padding, and is kept in sync with the tag's actual
/// content by [`Tag::prepare_buffers`](crate::Tag::prepare_buffers).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagHeader {
	version_minor: u8,
	flags: TagFlags,
	tag_size: u32,
	dirty: bool,
}

impl TagHeader {
	/// The number of bytes the header occupies on the wire
	pub const SIZE: u32 = 10;

	/// Create a new header for an empty tag
	///
	/// The header starts out dirty; it has never been serialized.
	pub fn new() -> Self {
		Self {
			version_minor: 0,
			flags: TagFlags::default(),
			tag_size: 0,
			dirty: true,
		}
	}

	pub(crate) fn parse<R>(reader: &mut R) -> Result<Self>
	where
		R: Read,
	{
		log::debug!("Parsing tag header");

		let mut header = [0; 10];
		reader.read_exact(&mut header)?;

		if header[..3] != IDENTIFIER {
			err!(FakeTag);
		}

		if header[3] != MAJOR_VERSION {
			err!(BadVersion(header[3], header[4]));
		}

		let version_minor = header[4];
		let flags = TagFlags::from_byte(header[5]);
		let tag_size = synchsafe::decode_u28([header[6], header[7], header[8], header[9]])?;

		Ok(Self {
			version_minor,
			flags,
			tag_size,
			dirty: false,
		})
	}

	pub(crate) fn write_to<W>(&mut self, writer: &mut W) -> Result<()>
	where
		W: Write,
	{
		let size = synchsafe::encode_u28(self.tag_size)?;

		writer.write_all(&IDENTIFIER)?;
		writer.write_all(&[MAJOR_VERSION, self.version_minor, self.flags.as_byte()])?;
		writer.write_all(&size)?;

		self.dirty = false;
		Ok(())
	}

	/// The format version as (major, minor)
	///
	/// The major revision is always 3; only the minor revision varies.
	pub fn version(&self) -> (u8, u8) {
		(MAJOR_VERSION, self.version_minor)
	}

	/// Set the minor revision of the format version
	pub fn set_version_minor(&mut self, minor: u8) {
		if self.version_minor != minor {
			self.version_minor = minor;
			self.dirty = true;
		}
	}

	/// The tag-wide flags
	pub fn flags(&self) -> TagFlags {
		self.flags
	}

	/// Whether the tag content is marked unsynchronised
	pub fn unsynchronisation(&self) -> bool {
		self.flags.unsynchronisation
	}

	/// Mark the tag content unsynchronised
	pub fn set_unsynchronisation(&mut self, unsynchronisation: bool) {
		if self.flags.unsynchronisation != unsynchronisation {
			self.flags.unsynchronisation = unsynchronisation;
			self.dirty = true;
		}
	}

	/// Whether the tag is marked experimental
	pub fn experimental(&self) -> bool {
		self.flags.experimental
	}

	/// Mark the tag experimental
	pub fn set_experimental(&mut self, experimental: bool) {
		if self.flags.experimental != experimental {
			self.flags.experimental = experimental;
			self.dirty = true;
		}
	}

	/// Whether an extended header follows this header
	pub fn is_extended_header_present(&self) -> bool {
		self.flags.extended_header
	}

	// The flag must stay consistent with `Tag::extended_header`, so it is only
	// toggled through `Tag::set_extended_header`.
	pub(crate) fn set_extended_header_present(&mut self, present: bool) {
		if self.flags.extended_header != present {
			self.flags.extended_header = present;
			self.dirty = true;
		}
	}

	/// The declared size of the tag content, excluding these 10 header bytes
	pub fn tag_size(&self) -> u32 {
		self.tag_size
	}

	pub(crate) fn set_tag_size(&mut self, tag_size: u32) {
		if self.tag_size != tag_size {
			self.tag_size = tag_size;
			self.dirty = true;
		}
	}

	/// Whether any field has been mutated since the header was last serialized
	pub fn is_dirty(&self) -> bool {
		self.dirty
	}
}

impl Default for TagHeader {
	fn default() -> Self {
		Self::new()
	}
}
