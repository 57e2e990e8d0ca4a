use crate::config::ParseOptions;
use crate::error::Result;
use crate::extended_header::ExtendedHeader;
use crate::frame::Frame;
use crate::frame::header::FrameHeader;
use crate::header::TagHeader;
use crate::macros::{err, try_vec};
use crate::registry::FrameRegistry;
use crate::tag::Tag;

use std::io::Read;

pub(crate) fn parse_tag<R>(
	reader: &mut R,
	registry: &FrameRegistry,
	parse_options: ParseOptions,
) -> Result<Tag>
where
	R: Read,
{
	let header = TagHeader::parse(reader)?;

	log::debug!("Parsing tag, declared size: {}", header.tag_size());

	let total_size = u64::from(TagHeader::SIZE) + u64::from(header.tag_size());
	let mut bytes_read = u64::from(TagHeader::SIZE);

	let mut extended_header = None;
	if header.is_extended_header_present() {
		let parsed = ExtendedHeader::parse(reader)?;
		bytes_read += u64::from(parsed.size());
		extended_header = Some(parsed);
	}

	// The header only declares the total tag size, frames plus padding; the number of
	// frames is not stored anywhere. The only way to find the end of the frame data is
	// a zero byte where a frame identifier should start.
	let mut frames = Vec::new();
	let mut invalid_frames = Vec::new();
	let mut hit_sentinel = false;

	while bytes_read < total_size {
		let Some(frame_header) = FrameHeader::parse(reader)? else {
			hit_sentinel = true;
			break;
		};

		let frame_size = u64::from(FrameHeader::SIZE) + u64::from(frame_header.size());
		let frame = Frame::parse(frame_header, reader, registry, parse_options)?;
		bytes_read += frame_size;

		if frame.is_valid() {
			frames.push(frame);
		} else {
			invalid_frames.push(frame);
		}
	}

	// A frame claiming to extend past the declared tag size means the size fields
	// contradict each other
	if bytes_read > total_size {
		err!(BadFrameLength);
	}

	let padding_size = (total_size - bytes_read) as usize;
	let mut padding = try_vec![0; padding_size];

	if hit_sentinel {
		// The probe already consumed the first padding byte (the sentinel zero), so
		// only `padding_size - 1` bytes remain on the wire. Offset 0 stays zero.
		reader.read_exact(&mut padding[1..])?;
	}

	log::debug!(
		"Parsed {valid} valid and {invalid} invalid frames, {padding} bytes of padding",
		valid = frames.len(),
		invalid = invalid_frames.len(),
		padding = padding.len()
	);

	Ok(Tag::from_parts(
		header,
		extended_header,
		frames,
		invalid_frames,
		padding,
	))
}

#[cfg(test)]
mod tests {
	use super::parse_tag;
	use crate::config::ParseOptions;
	use crate::registry::FrameRegistry;

	use std::io::Cursor;

	#[test_log::test]
	fn zero_size_tag() {
		let bytes = [b'I', b'D', b'3', 3, 0, 0, 0, 0, 0, 0];
		let mut reader = Cursor::new(bytes);

		let tag = parse_tag(
			&mut reader,
			&FrameRegistry::default(),
			ParseOptions::new(),
		)
		.unwrap();

		assert_eq!(tag.frames().len(), 0);
		assert_eq!(tag.padding().len(), 0);
		assert_eq!(tag.size(), 10);
	}

	#[test_log::test]
	fn frame_overrunning_tag_size_is_rejected() {
		// The header declares 15 bytes of content, but the first frame alone claims 30
		let mut bytes = vec![b'I', b'D', b'3', 3, 0, 0, 0, 0, 0, 15];
		bytes.extend_from_slice(b"TIT2");
		bytes.extend_from_slice(&20u32.to_be_bytes());
		bytes.extend_from_slice(&[0, 0]);
		bytes.extend_from_slice(&[b'\x00'; 20]);

		let mut reader = Cursor::new(bytes);
		let result = parse_tag(
			&mut reader,
			&FrameRegistry::default(),
			ParseOptions::new(),
		);

		assert!(result.is_err());
	}
}
