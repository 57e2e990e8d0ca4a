//! Contains the errors that can arise within cartouche
//!
//! The primary error is [`CartoucheError`]. The type of error is determined by [`ErrorKind`],
//! which can be extended at any time.

use std::collections::TryReserveError;
use std::fmt::{Debug, Display, Formatter};

/// Alias for `Result<T, CartoucheError>`
pub type Result<T> = std::result::Result<T, CartoucheError>;

/// The types of errors that can occur
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
	// Tag header
	/// Arises when a tag is expected at the stream position, but the identifier doesn't match
	FakeTag,
	/// Arises when the tag header declares a version this codec does not handle (must be 2.3.x)
	BadVersion(u8, u8),

	// Sizes
	/// Arises when a byte of a syncsafe integer has its high bit set
	///
	/// Every byte of a syncsafe integer carries 7 significant bits, so a set high bit
	/// means the buffer is misaligned or not syncsafe at all.
	NotSynchsafe(u8),
	/// Attempting to read/write an abnormally large amount of data
	///
	/// The tag size field can represent at most 2^28 - 1 bytes.
	TooMuchData,
	/// Arises when an extended header declares an invalid size (must be 6 or 10 bytes,
	/// consistent with its CRC flag)
	BadExtendedHeaderSize,

	// State
	/// Arises when the extended header is accessed while the tag header's
	/// `extended_header` flag is false
	///
	/// The flag is the single source of truth for the extended header's presence.
	MissingExtendedHeader,

	// Frames
	/// Arises when a frame ID contains invalid characters (must be within `'A'..'Z'` or `'0'..'9'`)
	BadFrameId(Vec<u8>),
	/// Arises when a frame doesn't have enough data to extract the necessary information
	BadFrameLength,
	/// Arises when no decoder is registered for a frame ID
	UnsupportedFrameId(String),
	/// Arises when a frame body doesn't match the structure its ID requires
	BadFrameContent(&'static str),
	/// Errors that arise while decoding text
	TextDecode(&'static str),

	// Conversions for external errors
	/// Represents all cases of [`std::io::Error`].
	Io(std::io::Error),
	/// Failure to allocate enough memory
	Alloc(TryReserveError),
}

/// Errors that could occur within cartouche
pub struct CartoucheError {
	pub(crate) kind: ErrorKind,
}

impl CartoucheError {
	/// Create a `CartoucheError` from an [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use cartouche::error::{CartoucheError, ErrorKind};
	///
	/// let fake_tag = CartoucheError::new(ErrorKind::FakeTag);
	/// ```
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use cartouche::error::{CartoucheError, ErrorKind};
	///
	/// let fake_tag = CartoucheError::new(ErrorKind::FakeTag);
	/// if let ErrorKind::FakeTag = fake_tag.kind() {
	/// 	println!("Where's the tag?");
	/// }
	/// ```
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}
}

impl std::error::Error for CartoucheError {}

impl Debug for CartoucheError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.kind)
	}
}

impl From<std::io::Error> for CartoucheError {
	fn from(input: std::io::Error) -> Self {
		Self {
			kind: ErrorKind::Io(input),
		}
	}
}

impl From<TryReserveError> for CartoucheError {
	fn from(input: TryReserveError) -> Self {
		Self {
			kind: ErrorKind::Alloc(input),
		}
	}
}

impl Display for CartoucheError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			// Conversions
			ErrorKind::Io(ref err) => write!(f, "{err}"),
			ErrorKind::Alloc(ref err) => write!(f, "{err}"),

			ErrorKind::FakeTag => write!(f, "Reading: Expected a tag, found invalid data"),
			ErrorKind::BadVersion(major, minor) => write!(
				f,
				"Found an invalid version (v2.{major}.{minor}), expected major revision 3"
			),
			ErrorKind::NotSynchsafe(byte) => write!(
				f,
				"Found a syncsafe integer byte with its high bit set (0x{byte:02X})"
			),
			ErrorKind::TooMuchData => write!(
				f,
				"Attempted to read/write an abnormally large amount of data"
			),
			ErrorKind::BadExtendedHeaderSize => {
				write!(f, "Found an extended header with an invalid size")
			},
			ErrorKind::MissingExtendedHeader => write!(
				f,
				"The extended header may not be accessed while the tag header's extended_header \
				 flag is false"
			),
			ErrorKind::BadFrameId(ref frame_id) => {
				write!(f, "Failed to parse a frame ID: 0x{frame_id:x?}")
			},
			ErrorKind::BadFrameLength => write!(
				f,
				"Frame isn't long enough to extract the necessary information"
			),
			ErrorKind::UnsupportedFrameId(ref id) => {
				write!(f, "No decoder is registered for frame ID \"{id}\"")
			},
			ErrorKind::BadFrameContent(description) => {
				write!(f, "Frame content: {description}")
			},
			ErrorKind::TextDecode(message) => write!(f, "Text decoding: {message}"),
		}
	}
}
