/// Options to control how cartouche writes a tag
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct WriteOptions {
	pub(crate) preserve_invalid_frames: bool,
}

impl WriteOptions {
	/// Creates a new `WriteOptions`, alias for `Default` implementation
	///
	/// See also: [`WriteOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use cartouche::config::WriteOptions;
	///
	/// let write_options = WriteOptions::new();
	/// ```
	pub const fn new() -> Self {
		Self {
			preserve_invalid_frames: true,
		}
	}

	/// Whether to re-emit invalid frames verbatim when writing
	///
	/// Defaults to `true`: frames that could not be decoded still round-trip
	/// byte-for-byte rather than being silently dropped. Turning this off shrinks the
	/// tag by the invalid frames' size on the next write.
	///
	/// # Examples
	///
	/// ```rust
	/// use cartouche::config::WriteOptions;
	///
	/// // I want corrupt frames gone from my files
	/// let options = WriteOptions::new().preserve_invalid_frames(false);
	/// ```
	pub fn preserve_invalid_frames(mut self, preserve_invalid_frames: bool) -> Self {
		self.preserve_invalid_frames = preserve_invalid_frames;
		self
	}
}

impl Default for WriteOptions {
	/// The default implementation for `WriteOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// WriteOptions {
	/// 	preserve_invalid_frames: true,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}
