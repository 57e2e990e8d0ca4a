//! Container-level behavior over hand-built byte images

use cartouche::config::{ParseOptions, WriteOptions};
use cartouche::util::synchsafe;
use cartouche::{ExtendedHeader, Frame, FrameContent, FrameId, FrameRegistry, Tag};

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

fn raw_frame(id: &str, body: &[u8]) -> Vec<u8> {
	let mut bytes = Vec::new();
	bytes.extend_from_slice(id.as_bytes());
	bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
	bytes.extend_from_slice(&[0, 0]);
	bytes.extend_from_slice(body);
	bytes
}

fn raw_tag(flags: u8, content: &[&[u8]], padding: usize) -> Vec<u8> {
	let content_len = content.iter().map(|c| c.len()).sum::<usize>() + padding;

	let mut bytes = Vec::new();
	bytes.extend_from_slice(b"ID3");
	bytes.extend_from_slice(&[3, 0, flags]);
	bytes.extend_from_slice(&synchsafe::encode_u28(content_len as u32).unwrap());
	for chunk in content {
		bytes.extend_from_slice(chunk);
	}
	bytes.extend_from_slice(&vec![0; padding]);
	bytes
}

fn read_tag(bytes: &[u8]) -> Tag {
	Tag::read(
		&mut Cursor::new(bytes),
		&FrameRegistry::default(),
		ParseOptions::new(),
	)
	.unwrap()
}

fn frame_id(id: &str) -> FrameId {
	FrameId::new(id.to_owned()).unwrap()
}

#[test_log::test]
fn read_write_round_trip() {
	let title = raw_frame("TIT2", b"\x00Foo title");
	let artist = raw_frame("TPE1", b"\x00Bar artist");
	let original = raw_tag(0, &[&title, &artist], 20);

	let mut tag = read_tag(&original);
	assert_eq!(tag.frames().len(), 2);
	assert!(tag.invalid_frames().is_empty());
	assert_eq!(tag.padding().len(), 20);
	assert_eq!(tag.size() as usize, original.len());
	assert!(!tag.is_dirty());

	match tag.get_frame(&frame_id("TIT2")).unwrap().content() {
		Some(FrameContent::Text { value, .. }) => assert_eq!(value, "Foo title"),
		other => panic!("expected decoded text, got {other:?}"),
	}

	// Writing an unmodified tag reproduces the input byte-for-byte
	let mut dumped = Vec::new();
	tag.dump_to(&mut dumped, WriteOptions::new()).unwrap();
	assert_eq!(dumped, original);

	let re_read = read_tag(&dumped);
	assert_eq!(re_read.frames().len(), 2);
	assert_eq!(
		re_read.get_frame(&frame_id("TPE1")).unwrap().body(),
		b"\x00Bar artist"
	);
	assert_eq!(re_read.padding().len(), 20);
}

#[test_log::test]
fn corrupt_frame_is_contained() {
	let good_one = raw_frame("TIT2", b"\x00Foo title");
	// Encoding byte 0x05 is not a valid text encoding
	let bad = raw_frame("TALB", b"\x05garbage");
	let good_two = raw_frame("TPE1", b"\x00Bar artist");

	let bytes = raw_tag(0, &[&good_one, &bad, &good_two], 0);
	let mut reader = Cursor::new(&bytes[..]);

	let tag = Tag::read(&mut reader, &FrameRegistry::default(), ParseOptions::new()).unwrap();

	// The frames around the corrupt one are unaffected
	assert_eq!(tag.frames().len(), 2);
	assert_eq!(tag.frames()[0].id().as_str(), "TIT2");
	assert_eq!(tag.frames()[1].id().as_str(), "TPE1");

	// The corrupt frame is kept aside, raw bytes intact
	assert_eq!(tag.invalid_frames().len(), 1);
	assert_eq!(tag.invalid_frames()[0].body(), b"\x05garbage");

	// Byte accounting is exact: all three frames were fully consumed
	assert_eq!(reader.position() as usize, bytes.len());
}

#[test_log::test]
fn exact_fit_tag_has_no_padding() {
	let frame = raw_frame("TIT2", b"\x00Foo title");
	let mut bytes = raw_tag(0, &[&frame], 0);

	// Trailing junk past the declared tag size must never be probed
	bytes.extend_from_slice(b"JUNKJUNK");

	let mut reader = Cursor::new(&bytes[..]);
	let tag = Tag::read(&mut reader, &FrameRegistry::default(), ParseOptions::new()).unwrap();

	assert_eq!(tag.frames().len(), 1);
	assert_eq!(tag.padding().len(), 0);
	assert_eq!(reader.position() as usize, bytes.len() - 8);
}

#[test_log::test]
fn sentinel_byte_is_restored_into_padding() {
	let frame = raw_frame("TIT2", b"\x00Foo title");
	let bytes = raw_tag(0, &[&frame], 10);

	let mut reader = Cursor::new(&bytes[..]);
	let tag = Tag::read(&mut reader, &FrameRegistry::default(), ParseOptions::new()).unwrap();

	// The probed sentinel byte counts as the first padding byte
	assert_eq!(tag.padding().len(), 10);
	assert!(tag.padding().iter().all(|&b| b == 0));
	assert_eq!(reader.position() as usize, bytes.len());
}

#[test_log::test]
fn frame_lookup_operations() {
	let mut tag = Tag::new();
	let tit2 = frame_id("TIT2");
	let tpe1 = frame_id("TPE1");

	assert!(tag.get_frame(&tit2).is_none());

	tag.add_frame(Frame::new(tit2.clone(), b"\x00First".to_vec()));
	tag.add_frame(Frame::new(tpe1.clone(), b"\x00Artist".to_vec()));
	tag.add_frame(Frame::new(tit2.clone(), b"\x00Second".to_vec()));

	// First match, in read order
	assert_eq!(tag.get_frame(&tit2).unwrap().body(), b"\x00First");
	assert_eq!(tag.get_frames(&tit2).count(), 2);

	let removed = tag.remove_frame(&tit2).unwrap();
	assert_eq!(removed.body(), b"\x00First");
	assert_eq!(tag.get_frame(&tit2).unwrap().body(), b"\x00Second");

	let removed_all = tag.remove_frames(&tit2);
	assert_eq!(removed_all.len(), 1);
	assert_eq!(tag.get_frames(&tit2).count(), 0);

	// Other frames are untouched
	assert!(tag.get_frame(&tpe1).is_some());

	tag.clear_frames();
	assert!(tag.frames().is_empty());
}

#[test_log::test]
fn tag_size_invariant_after_prepare_buffers() {
	let mut tag = Tag::new();
	tag.set_extended_header(Some(ExtendedHeader::new()));
	tag.add_frame(Frame::new(frame_id("TIT2"), b"\x00Foo title".to_vec()));
	tag.add_frame(Frame::new(frame_id("TPE1"), b"\x00Bar artist".to_vec()));
	tag.set_padding(64);

	tag.prepare_buffers(WriteOptions::new()).unwrap();

	let frame_sizes: u32 = tag.frames().iter().map(Frame::size).sum();
	let expected = tag.extended_header().unwrap().size() + frame_sizes + 64;
	assert_eq!(tag.header().tag_size(), expected);
}

#[test_log::test]
fn invalid_frames_round_trip_by_default() {
	let good = raw_frame("TIT2", b"\x00Foo title");
	let bad = raw_frame("TALB", b"\x05garbage");
	let bytes = raw_tag(0, &[&good, &bad], 16);

	let mut tag = read_tag(&bytes);
	assert_eq!(tag.invalid_frames().len(), 1);

	let mut dumped = Vec::new();
	tag.dump_to(&mut dumped, WriteOptions::new()).unwrap();
	assert_eq!(dumped.len(), bytes.len());

	let re_read = read_tag(&dumped);
	assert_eq!(re_read.invalid_frames().len(), 1);
	assert_eq!(re_read.invalid_frames()[0].body(), b"\x05garbage");
}

#[test_log::test]
fn invalid_frames_can_be_discarded_on_write() {
	let good = raw_frame("TIT2", b"\x00Foo title");
	let bad = raw_frame("TALB", b"\x05garbage");
	let bytes = raw_tag(0, &[&good, &bad], 16);

	let mut tag = read_tag(&bytes);
	let invalid_size = tag.invalid_frames()[0].size() as usize;

	let mut dumped = Vec::new();
	tag.dump_to(
		&mut dumped,
		WriteOptions::new().preserve_invalid_frames(false),
	)
	.unwrap();

	// The tag shrank by exactly the discarded frame
	assert_eq!(dumped.len(), bytes.len() - invalid_size);

	let re_read = read_tag(&dumped);
	assert_eq!(re_read.frames().len(), 1);
	assert!(re_read.invalid_frames().is_empty());
}

#[test_log::test]
fn extended_header_round_trip() {
	// size 6, no CRC, padding hint 32
	let extended = [0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20];
	let frame = raw_frame("TIT2", b"\x00Foo title");
	let bytes = raw_tag(0x40, &[&extended, &frame], 32);

	let mut tag = read_tag(&bytes);
	assert!(tag.header().is_extended_header_present());
	assert_eq!(tag.extended_header().unwrap().padding_size_hint(), 32);
	assert_eq!(tag.extended_header().unwrap().size(), 10);

	let mut dumped = Vec::new();
	tag.dump_to(&mut dumped, WriteOptions::new()).unwrap();
	assert_eq!(dumped, bytes);

	// Clearing the extended header clears the flag with it
	tag.set_extended_header(None);
	assert!(!tag.header().is_extended_header_present());
	assert!(tag.extended_header().is_err());
}

#[test_log::test]
fn extended_header_access_requires_flag() {
	let tag = Tag::new();
	assert!(tag.extended_header().is_err());
}

#[test_log::test]
fn dirty_propagation() {
	let frame = raw_frame("TIT2", b"\x00Foo title");
	let bytes = raw_tag(0, &[&frame], 8);

	// A freshly read tag is clean
	let mut tag = read_tag(&bytes);
	assert!(!tag.is_dirty());

	// Header mutation dirties the tag
	tag.header_mut().set_experimental(true);
	assert!(tag.is_dirty());

	let mut dumped = Vec::new();
	tag.dump_to(&mut dumped, WriteOptions::new()).unwrap();
	assert!(!tag.is_dirty());

	// Frame mutation dirties the tag
	let id = frame_id("TIT2");
	tag.get_frame_mut(&id).unwrap().set_body(b"\x00New".to_vec());
	assert!(tag.is_dirty());

	dumped.clear();
	tag.dump_to(&mut dumped, WriteOptions::new()).unwrap();
	assert!(!tag.is_dirty());

	// A brand new tag has never been serialized
	assert!(Tag::new().is_dirty());
}

#[test_log::test]
fn save_to_writes_at_the_requested_offset() {
	const OFFSET: u64 = 42;

	let mut tag = Tag::new();
	tag.add_frame(Frame::new(frame_id("TIT2"), b"\x00Foo title".to_vec()));

	let mut file = tempfile::tempfile().unwrap();
	file.write_all(&[0xAA; OFFSET as usize]).unwrap();

	tag.save_to(&mut file, OFFSET, WriteOptions::new()).unwrap();

	file.seek(SeekFrom::Start(0)).unwrap();
	let mut contents = Vec::new();
	file.read_to_end(&mut contents).unwrap();

	// The bytes before the offset are untouched
	assert!(contents[..OFFSET as usize].iter().all(|&b| b == 0xAA));

	let re_read = read_tag(&contents[OFFSET as usize..]);
	assert_eq!(re_read.frames().len(), 1);
	assert_eq!(re_read.padding().len(), Tag::DEFAULT_PADDING_SIZE);
}

#[test_log::test]
fn rejects_garbage() {
	let mut garbage = Cursor::new(b"TAG+not an id3 tag".to_vec());
	assert!(
		Tag::read(
			&mut garbage,
			&FrameRegistry::default(),
			ParseOptions::new()
		)
		.is_err()
	);
}
