//! Frames and their headers

pub(crate) mod header;

use crate::config::{ParseOptions, ParsingMode};
use crate::error::Result;
use crate::macros::try_vec;
use crate::registry::{FrameContent, FrameRegistry};
use header::{FrameFlags, FrameHeader, FrameId};

use std::io::{Read, Write};

/// A single metadata record within a tag
///
/// A frame pairs a [`FrameHeader`] with a body of exactly the declared size. The body
/// is kept as raw bytes; if the decoder registered for the frame's ID could interpret
/// them, the decoded [`FrameContent`] is available as well.
///
/// ## Invalid frames
///
/// A frame whose body could not be decoded for its declared ID is classified *invalid*.
/// Its raw bytes (and exact byte length) are retained so that one corrupt frame never
/// desynchronizes the rest of the tag, and so the frame can be re-emitted verbatim.
/// Invalid frames live in [`Tag::invalid_frames`](crate::Tag::invalid_frames), outside
/// the frame list the lookup operations work on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
	header: FrameHeader,
	body: Vec<u8>,
	content: Option<FrameContent>,
	valid: bool,
	dirty: bool,
}

impl Frame {
	/// Create a new frame from an ID and a raw body
	///
	/// The frame starts out valid and dirty; it has never been serialized.
	///
	/// # Examples
	///
	/// ```rust
	/// use cartouche::{Frame, FrameId};
	///
	/// # fn main() -> cartouche::error::Result<()> {
	/// let frame = Frame::new(FrameId::new("TIT2")?, b"\x00Stray Cat Strut".to_vec());
	/// assert_eq!(frame.size(), 10 + 16);
	/// # Ok(()) }
	/// ```
	pub fn new(id: FrameId, body: Vec<u8>) -> Self {
		let mut header = FrameHeader::new(id, FrameFlags::default());
		header.size = body.len() as u32;

		Self {
			header,
			body,
			content: None,
			valid: true,
			dirty: true,
		}
	}

	/// Read a frame body for an already-parsed header
	///
	/// Exactly `header.size()` bytes are consumed regardless of whether the body
	/// decodes, so stream alignment is never lost because of one bad frame. A decode
	/// failure is contained by marking the frame invalid, unless
	/// [`ParsingMode::Strict`] was requested.
	pub(crate) fn parse<R>(
		header: FrameHeader,
		reader: &mut R,
		registry: &FrameRegistry,
		parse_options: ParseOptions,
	) -> Result<Self>
	where
		R: Read,
	{
		let mut body = try_vec![0; header.size as usize];
		reader.read_exact(&mut body)?;

		let (content, valid) = match registry.decode(&header.id, &body) {
			Ok(content) => (Some(content), true),
			Err(err) => {
				if parse_options.parsing_mode == ParsingMode::Strict {
					return Err(err);
				}

				log::warn!(
					"Failed to decode frame \"{id}\", keeping raw bytes: {err}",
					id = header.id
				);
				(None, false)
			},
		};

		Ok(Self {
			header,
			body,
			content,
			valid,
			dirty: false,
		})
	}

	/// Get the ID of the frame
	pub fn id(&self) -> &FrameId {
		self.header.id()
	}

	/// The frame's header
	pub fn header(&self) -> &FrameHeader {
		&self.header
	}

	/// Get the flags for the frame
	pub fn flags(&self) -> FrameFlags {
		self.header.flags
	}

	/// Set the flags for the frame
	pub fn set_flags(&mut self, flags: FrameFlags) {
		self.header.flags = flags;
		self.dirty = true;
	}

	/// The raw body bytes
	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Replace the body bytes
	///
	/// Any previously decoded content is discarded; the raw bytes are now authoritative.
	pub fn set_body(&mut self, body: Vec<u8>) {
		self.header.size = body.len() as u32;
		self.body = body;
		self.content = None;
		self.dirty = true;
	}

	/// The decoded body, if the registered decoder could interpret the raw bytes
	pub fn content(&self) -> Option<&FrameContent> {
		self.content.as_ref()
	}

	/// Whether the body decoded per the rules registered for this frame's ID
	pub fn is_valid(&self) -> bool {
		self.valid
	}

	/// Whether the header or body has been mutated since the frame was last serialized
	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	/// The total number of bytes the frame occupies on the wire, header included
	pub fn size(&self) -> u32 {
		FrameHeader::SIZE + self.body.len() as u32
	}

	pub(crate) fn write_to<W>(&mut self, writer: &mut W) -> Result<()>
	where
		W: Write,
	{
		// Keep the declared size honest, whatever happened to the body
		self.header.size = self.body.len() as u32;

		self.header.write_to(writer)?;
		writer.write_all(&self.body)?;

		self.dirty = false;
		Ok(())
	}
}
