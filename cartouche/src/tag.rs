//! The tag container

use crate::config::{ParseOptions, WriteOptions};
use crate::error::{CartoucheError, ErrorKind, Result};
use crate::extended_header::ExtendedHeader;
use crate::frame::Frame;
use crate::frame::header::FrameId;
use crate::header::TagHeader;
use crate::macros::err;
use crate::read;
use crate::registry::FrameRegistry;
use crate::util::synchsafe;

use std::io::{Read, Seek, SeekFrom, Write};

/// The whole metadata container
///
/// A tag is composed of four parts: the fixed [`TagHeader`], an optional
/// [`ExtendedHeader`], a list of [`Frame`]s, and trailing zero-filled padding. The
/// padding lets the frames grow without the embedding file having to be rewritten.
///
/// Frames that failed to decode when the tag was read are kept aside in
/// [`Tag::invalid_frames`]; they round-trip rather than being silently dropped, but the
/// frame lookup and mutation operations never touch them.
///
/// # Examples
///
/// ```rust
/// use cartouche::config::{ParseOptions, WriteOptions};
/// use cartouche::{Frame, FrameId, FrameRegistry, Tag};
///
/// # fn main() -> cartouche::error::Result<()> {
/// let mut tag = Tag::new();
/// tag.add_frame(Frame::new(
/// 	FrameId::new("TIT2")?,
/// 	b"\x00Rock This Town".to_vec(),
/// ));
///
/// let mut bytes = Vec::new();
/// tag.dump_to(&mut bytes, WriteOptions::new())?;
///
/// let registry = FrameRegistry::default();
/// let read_back = Tag::read(&mut &bytes[..], &registry, ParseOptions::new())?;
/// assert!(read_back.get_frame(&FrameId::new("TIT2")?).is_some());
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct Tag {
	header: TagHeader,
	extended_header: Option<ExtendedHeader>,
	frames: Vec<Frame>,
	invalid_frames: Vec<Frame>,
	padding: Vec<u8>,
}

impl Tag {
	/// The amount of padding (in bytes) a newly created tag reserves
	pub const DEFAULT_PADDING_SIZE: usize = 256;

	/// Create a new empty tag
	///
	/// The tag has a default header, no extended header, no frames, and
	/// [`DEFAULT_PADDING_SIZE`](Self::DEFAULT_PADDING_SIZE) bytes of padding.
	pub fn new() -> Self {
		Self {
			header: TagHeader::new(),
			extended_header: None,
			frames: Vec::new(),
			invalid_frames: Vec::new(),
			padding: vec![0; Self::DEFAULT_PADDING_SIZE],
		}
	}

	/// Read an existing tag from a byte stream positioned at its start
	///
	/// Frames whose bodies cannot be decoded per the registry are classified invalid
	/// and kept aside with their raw bytes (see [`Tag::invalid_frames`]); they never
	/// abort the read unless [`ParsingMode::Strict`](crate::config::ParsingMode::Strict)
	/// was requested.
	///
	/// # Errors
	///
	/// * The stream does not start with the tag identifier, or declares an unsupported
	///   version
	/// * A size field is malformed (not syncsafe, or contradicting another size field)
	/// * The stream ends before the declared tag size
	pub fn read<R>(
		reader: &mut R,
		registry: &FrameRegistry,
		parse_options: ParseOptions,
	) -> Result<Self>
	where
		R: Read,
	{
		read::parse_tag(reader, registry, parse_options)
	}

	pub(crate) fn from_parts(
		header: TagHeader,
		extended_header: Option<ExtendedHeader>,
		frames: Vec<Frame>,
		invalid_frames: Vec<Frame>,
		padding: Vec<u8>,
	) -> Self {
		Self {
			header,
			extended_header,
			frames,
			invalid_frames,
			padding,
		}
	}

	/// The tag's header
	pub fn header(&self) -> &TagHeader {
		&self.header
	}

	/// Mutable access to the tag's header
	///
	/// Note that the header's size field is owned by the tag and recomputed by
	/// [`Tag::prepare_buffers`]; the remaining fields can be freely mutated here.
	pub fn header_mut(&mut self) -> &mut TagHeader {
		&mut self.header
	}

	/// The optional extended header
	///
	/// # Errors
	///
	/// The tag header's `extended_header` flag is false. The flag is the single source
	/// of truth for the extended header's presence.
	pub fn extended_header(&self) -> Result<&ExtendedHeader> {
		if !self.header.is_extended_header_present() {
			err!(MissingExtendedHeader);
		}

		self.extended_header
			.as_ref()
			.ok_or_else(|| CartoucheError::new(ErrorKind::MissingExtendedHeader))
	}

	/// Mutable access to the optional extended header
	///
	/// # Errors
	///
	/// The tag header's `extended_header` flag is false.
	pub fn extended_header_mut(&mut self) -> Result<&mut ExtendedHeader> {
		if !self.header.is_extended_header_present() {
			err!(MissingExtendedHeader);
		}

		self.extended_header
			.as_mut()
			.ok_or_else(|| CartoucheError::new(ErrorKind::MissingExtendedHeader))
	}

	/// Set or clear the extended header
	///
	/// The tag header's `extended_header` flag is toggled to match, keeping the two in
	/// sync as a unit.
	pub fn set_extended_header(&mut self, extended_header: Option<ExtendedHeader>) {
		self.header
			.set_extended_header_present(extended_header.is_some());
		self.extended_header = extended_header;
	}

	/// Append a frame to the tag
	pub fn add_frame(&mut self, frame: Frame) {
		self.frames.push(frame);
	}

	/// The tag's valid frames, in read order
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	/// The invalid frames encountered while reading the tag
	///
	/// These are opaque passengers: they are excluded from the frame lookups and
	/// mutations, do not affect [`Tag::is_dirty`], and (by default) are re-emitted
	/// verbatim on write. They are kept inspectable for diagnostics.
	pub fn invalid_frames(&self) -> &[Frame] {
		&self.invalid_frames
	}

	/// Find the first frame with the given ID, in read order
	pub fn get_frame(&self, id: &FrameId) -> Option<&Frame> {
		self.frames.iter().find(|frame| frame.id() == id)
	}

	/// Find the first frame with the given ID, mutably
	pub fn get_frame_mut(&mut self, id: &FrameId) -> Option<&mut Frame> {
		self.frames.iter_mut().find(|frame| frame.id() == id)
	}

	/// Find all frames with the given ID, order preserved
	pub fn get_frames<'a>(&'a self, id: &'a FrameId) -> impl Iterator<Item = &'a Frame> {
		self.frames.iter().filter(move |frame| frame.id() == id)
	}

	/// Remove and return the first frame with the given ID
	///
	/// Returns `None` (and removes nothing) if no frame matches.
	pub fn remove_frame(&mut self, id: &FrameId) -> Option<Frame> {
		let position = self.frames.iter().position(|frame| frame.id() == id)?;
		Some(self.frames.remove(position))
	}

	/// Remove and return all frames with the given ID
	///
	/// Returns an empty `Vec` if no frame matches.
	pub fn remove_frames(&mut self, id: &FrameId) -> Vec<Frame> {
		let (removed, kept) = std::mem::take(&mut self.frames)
			.into_iter()
			.partition(|frame| frame.id() == id);

		self.frames = kept;
		removed
	}

	/// Remove all frames from the tag
	pub fn clear_frames(&mut self) {
		self.frames.clear();
	}

	/// The padding at the end of the tag
	///
	/// The padding dictates how much room remains for the frames to expand before the
	/// tag has to be resized and the embedding file rewritten.
	pub fn padding(&self) -> &[u8] {
		&self.padding
	}

	/// Replace the padding with a fresh zero buffer of the given length
	pub fn set_padding(&mut self, size: usize) {
		self.padding = vec![0; size];
	}

	/// The total size (in bytes) of the tag on the wire, header included
	pub fn size(&self) -> u32 {
		TagHeader::SIZE + self.header.tag_size()
	}

	/// Whether the tag has been modified since it was last serialized
	///
	/// True iff the header is dirty, the extended header is present and dirty, or any
	/// valid frame is dirty. Invalid frames never contribute.
	pub fn is_dirty(&self) -> bool {
		let mut dirty = self.header.is_dirty();

		if self.header.is_extended_header_present() {
			if let Some(extended_header) = &self.extended_header {
				dirty = dirty || extended_header.is_dirty();
			}
		}

		dirty || self.frames.iter().any(Frame::is_dirty)
	}

	/// Recompute the header's size field from the tag's actual content
	///
	/// The sizes are summed bottom-up: extended header (if present), every frame that
	/// will be written, and the padding. [`Tag::dump_to`] runs this automatically;
	/// after it, `header.tag_size()` matches the content exactly.
	///
	/// # Errors
	///
	/// The total content size exceeds what the header's 28-bit size field can represent.
	pub fn prepare_buffers(&mut self, write_options: WriteOptions) -> Result<()> {
		let mut tag_size: u64 = 0;

		if let Some(extended_header) = &self.extended_header {
			tag_size += u64::from(extended_header.size());
		}

		for frame in &self.frames {
			tag_size += u64::from(frame.size());
		}

		if write_options.preserve_invalid_frames {
			for frame in &self.invalid_frames {
				tag_size += u64::from(frame.size());
			}
		}

		tag_size += self.padding.len() as u64;

		if tag_size > u64::from(synchsafe::MAX_U28) {
			err!(TooMuchData);
		}

		self.header.set_tag_size(tag_size as u32);
		Ok(())
	}

	/// Serialize the tag to a byte sink
	///
	/// [`Tag::prepare_buffers`] is run first, so the written header's size field always
	/// matches the written content. On success every dirty flag is cleared.
	///
	/// Write order: header, extended header (if present), valid frames in list order,
	/// invalid frames verbatim (unless
	/// [`preserve_invalid_frames`](WriteOptions::preserve_invalid_frames) is off),
	/// padding.
	///
	/// # Errors
	///
	/// * The content exceeds the representable tag size
	/// * Writing to `writer` fails
	pub fn dump_to<W>(&mut self, writer: &mut W, write_options: WriteOptions) -> Result<()>
	where
		W: Write,
	{
		self.prepare_buffers(write_options)?;

		log::debug!("Writing tag, size: {}", self.size());

		self.header.write_to(writer)?;

		if self.header.is_extended_header_present() {
			if let Some(extended_header) = &mut self.extended_header {
				extended_header.write_to(writer)?;
			}
		}

		for frame in &mut self.frames {
			frame.write_to(writer)?;
		}

		if write_options.preserve_invalid_frames {
			for frame in &mut self.invalid_frames {
				frame.write_to(writer)?;
			}
		}

		writer.write_all(&self.padding)?;

		Ok(())
	}

	/// Serialize the tag into a random-access target at the given offset
	///
	/// This is the alternative write target for callers holding an open file: the tag
	/// region usually does not start at position 0 of the containing file.
	///
	/// # Errors
	///
	/// Same as [`Tag::dump_to`], plus seek failures.
	pub fn save_to<F>(&mut self, file: &mut F, offset: u64, write_options: WriteOptions) -> Result<()>
	where
		F: Write + Seek,
	{
		file.seek(SeekFrom::Start(offset))?;
		self.dump_to(file, write_options)
	}
}

impl Default for Tag {
	fn default() -> Self {
		Self::new()
	}
}
