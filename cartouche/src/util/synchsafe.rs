//! Support for the syncsafe integers used in the tag header
//!
//! The tag header stores its size using only the low 7 bits of each byte, so that no
//! encoded byte can be mistaken for an MPEG stream synchronization marker. Note that
//! this applies to the **tag** size only; frame sizes in this version of the format
//! are plain big-endian integers.

use crate::error::Result;
use crate::macros::err;

/// The maximum value representable in a 28-bit syncsafe integer
pub const MAX_U28: u32 = 0x0FFF_FFFF;

/// Decode a 4-byte syncsafe integer
///
/// The 7-bit groups are concatenated most significant byte first.
///
/// # Errors
///
/// Any byte has its high bit set. The bit is always 0 by construction, so a stray set
/// bit indicates the buffer is misaligned or not syncsafe.
///
/// # Examples
///
/// ```rust
/// use cartouche::util::synchsafe;
///
/// # fn main() -> cartouche::error::Result<()> {
/// assert_eq!(synchsafe::decode_u28([0x00, 0x00, 0x02, 0x01])?, 257);
///
/// // The high bit of the last byte is set
/// assert!(synchsafe::decode_u28([0x00, 0x00, 0x00, 0xFF]).is_err());
/// # Ok(()) }
/// ```
pub fn decode_u28(bytes: [u8; 4]) -> Result<u32> {
	for byte in bytes {
		if byte & 0x80 != 0 {
			err!(NotSynchsafe(byte));
		}
	}

	Ok((u32::from(bytes[0]) << 21)
		| (u32::from(bytes[1]) << 14)
		| (u32::from(bytes[2]) << 7)
		| u32::from(bytes[3]))
}

/// Encode a value as a 4-byte syncsafe integer
///
/// This is the exact inverse of [`decode_u28`].
///
/// # Errors
///
/// `value` is greater than [`MAX_U28`] and cannot be represented in 28 bits.
///
/// # Examples
///
/// ```rust
/// use cartouche::util::synchsafe;
///
/// # fn main() -> cartouche::error::Result<()> {
/// assert_eq!(synchsafe::encode_u28(257)?, [0x00, 0x00, 0x02, 0x01]);
/// assert!(synchsafe::encode_u28(synchsafe::MAX_U28 + 1).is_err());
/// # Ok(()) }
/// ```
pub fn encode_u28(value: u32) -> Result<[u8; 4]> {
	if value > MAX_U28 {
		err!(TooMuchData);
	}

	Ok([
		((value >> 21) & 0x7F) as u8,
		((value >> 14) & 0x7F) as u8,
		((value >> 7) & 0x7F) as u8,
		(value & 0x7F) as u8,
	])
}

#[cfg(test)]
mod tests {
	use super::{MAX_U28, decode_u28, encode_u28};

	#[test_log::test]
	fn round_trip() {
		for value in [0, 1, 127, 128, 0x3FFF, 0x4000, 0x1F_FFFF, 0x20_0000, MAX_U28] {
			let encoded = encode_u28(value).unwrap();
			assert!(encoded.iter().all(|b| b & 0x80 == 0));
			assert_eq!(decode_u28(encoded).unwrap(), value);
		}
	}

	#[test_log::test]
	fn rejects_set_high_bit() {
		assert!(decode_u28([0x80, 0x00, 0x00, 0x00]).is_err());
		assert!(decode_u28([0x00, 0xFF, 0x00, 0x00]).is_err());
		assert!(decode_u28([0x00, 0x00, 0x00, 0x80]).is_err());
	}

	#[test_log::test]
	fn rejects_out_of_range() {
		assert!(encode_u28(MAX_U28).is_ok());
		assert!(encode_u28(MAX_U28 + 1).is_err());
		assert!(encode_u28(u32::MAX).is_err());
	}

	#[test_log::test]
	fn known_encoding() {
		// 257 = 0b10_00000001 -> 7-bit groups [0, 0, 2, 1]
		assert_eq!(encode_u28(257).unwrap(), [0x00, 0x00, 0x02, 0x01]);
		assert_eq!(encode_u28(MAX_U28).unwrap(), [0x7F, 0x7F, 0x7F, 0x7F]);
	}
}
