use std::str::from_utf8;

/// Result of decoding one byte of keypad input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeOutcome {
	/// The byte was a complete character.
	Char(char),

	/// The byte isn't a character on its own.
	Malformed(u8),
}

/// Decode a single input byte as a standalone UTF-8 character.
///
/// The panel sends one ASCII byte per key press, so input is decoded a byte at a time and
/// nothing is buffered between calls. A multi-byte UTF-8 sequence therefore comes out as one
/// [`DecodeOutcome::Malformed`] per byte, which is a known limitation.
pub fn decode_byte(byte: u8) -> DecodeOutcome {
	from_utf8(&[byte])
		.ok()
		.and_then(|s| s.chars().next())
		.map_or(DecodeOutcome::Malformed(byte), DecodeOutcome::Char)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ascii_keys() {
		assert_eq!(decode_byte(b'A'), DecodeOutcome::Char('A'));
		assert_eq!(decode_byte(b'5'), DecodeOutcome::Char('5'));
		assert_eq!(decode_byte(0x00), DecodeOutcome::Char('\0'));
		assert_eq!(decode_byte(0x7F), DecodeOutcome::Char('\x7F'));
	}

	#[test]
	fn test_non_ascii_is_malformed() {
		assert_eq!(decode_byte(0x80), DecodeOutcome::Malformed(0x80));
		assert_eq!(decode_byte(0xC3), DecodeOutcome::Malformed(0xC3));
		assert_eq!(decode_byte(0xFE), DecodeOutcome::Malformed(0xFE));
	}

	#[test]
	fn test_multibyte_sequences_are_not_reassembled() {
		let outcomes: Vec<_> = "é".bytes().map(decode_byte).collect();
		assert_eq!(
			outcomes,
			[DecodeOutcome::Malformed(0xC3), DecodeOutcome::Malformed(0xA9)]
		);
	}
}
