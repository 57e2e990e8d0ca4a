//! Read and write the ID3v2.3 metadata tag embedded at the start of audio files.
//!
//! The tag is where all the information about a song is stored: the title, the track
//! number, the artist, and so on. cartouche reconstructs an in-memory model of the
//! tag — header, optional extended header, an ordered list of frames, and trailing
//! padding — from a byte stream, and serializes that model back to bytes.
//!
//! What a frame body *means* is delegated to a pluggable [`FrameRegistry`]; the codec
//! itself only guarantees container-level correctness. Its central resilience property:
//! a frame that fails to decode is classified invalid and kept aside with its raw
//! bytes, so one corrupt frame never prevents the rest of the tag from being read.
//!
//! # Examples
//!
//! ## Reading a tag
//!
//! ```rust,no_run
//! # fn main() -> cartouche::error::Result<()> {
//! use cartouche::config::ParseOptions;
//! use cartouche::{FrameRegistry, Tag};
//! use std::fs::File;
//!
//! // The reader must be positioned at the start of the tag
//! let mut file = File::open("song.mp3")?;
//!
//! let registry = FrameRegistry::default();
//! let tag = Tag::read(&mut file, &registry, ParseOptions::new())?;
//!
//! for frame in tag.frames() {
//! 	println!("{}: {} bytes", frame.id(), frame.body().len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Creating a tag
//!
//! ```rust
//! # fn main() -> cartouche::error::Result<()> {
//! use cartouche::config::WriteOptions;
//! use cartouche::{Frame, FrameId, Tag};
//!
//! let mut tag = Tag::new();
//! tag.add_frame(Frame::new(
//! 	FrameId::new("TPE1")?,
//! 	b"\x00Stray Cats".to_vec(),
//! ));
//!
//! let mut bytes = Vec::new();
//! tag.dump_to(&mut bytes, WriteOptions::new())?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub(crate) mod macros;
pub mod util;

mod extended_header;
mod frame;
mod header;
mod read;
mod registry;
mod tag;

pub use extended_header::ExtendedHeader;
pub use frame::Frame;
pub use frame::header::{FrameFlags, FrameHeader, FrameId};
pub use header::{TagFlags, TagHeader};
pub use registry::{BinaryDecoder, BodyDecoder, FrameContent, FrameRegistry, TextDecoder, UrlDecoder};
pub use tag::Tag;
