//! Compact-u16: seven bits per byte, least significant group first, at most
//! three bytes. Decoding only accepts the shortest encoding of a value.

use txforge_error::CodecError;

const MAX_ENCODING_LENGTH: usize = 3;

/// Append the compact-u16 encoding of `len`.
pub fn encode_len(len: usize, out: &mut Vec<u8>) -> Result<(), CodecError> {
    let mut rem = u16::try_from(len).map_err(|_| CodecError::LengthTooLarge(len))?;
    loop {
        let mut elem = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(elem);
            return Ok(());
        }
        elem |= 0x80;
        out.push(elem);
    }
}

/// Decode a compact-u16 at the start of `bytes`, returning the value and the
/// number of bytes consumed. `offset` is only used for error reporting.
pub fn decode_len(bytes: &[u8], offset: usize) -> Result<(usize, usize), CodecError> {
    solana_short_vec::decode_shortu16_len(bytes).map_err(|()| {
        // Every byte present asks for another one.
        let truncated = bytes.len() < MAX_ENCODING_LENGTH && bytes.iter().all(|b| b & 0x80 != 0);
        if truncated {
            CodecError::UnexpectedEndOfInput {
                what: "compact-u16",
                offset: offset + bytes.len(),
            }
        } else {
            CodecError::InvalidShortU16 { offset }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(len: usize) -> Vec<u8> {
        let mut out = vec![];
        encode_len(len, &mut out).unwrap();
        out
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode(0x0), vec![0x0]);
        assert_eq!(encode(0x7f), vec![0x7f]);
        assert_eq!(encode(0x80), vec![0x80, 0x01]);
        assert_eq!(encode(0xff), vec![0xff, 0x01]);
        assert_eq!(encode(0x100), vec![0x80, 0x02]);
        assert_eq!(encode(0x3fff), vec![0xff, 0x7f]);
        assert_eq!(encode(0x4000), vec![0x80, 0x80, 0x01]);
        assert_eq!(encode(0xffff), vec![0xff, 0xff, 0x03]);

        for len in [0x0, 0x7f, 0x80, 0x3fff, 0x4000, 0xffff] {
            let bytes = encode(len);
            assert_eq!(decode_len(&bytes, 0), Ok((len, bytes.len())));
        }
    }

    #[test]
    fn test_too_large() {
        let mut out = vec![];
        assert_eq!(
            encode_len(0x1_0000, &mut out),
            Err(CodecError::LengthTooLarge(0x1_0000))
        );
    }

    #[test]
    fn test_rejects_aliases_and_overflow() {
        // Aliases of 0.
        assert!(decode_len(&[0x80, 0x00], 0).is_err());
        assert!(decode_len(&[0x80, 0x80, 0x00], 0).is_err());
        // Alias of 0x7f.
        assert!(decode_len(&[0xff, 0x00], 0).is_err());
        // Third byte continues.
        assert!(decode_len(&[0x80, 0x80, 0x80, 0x00], 0).is_err());
        // 0x1_0000 overflows.
        assert!(decode_len(&[0x80, 0x80, 0x04], 0).is_err());
        assert_eq!(
            decode_len(&[0x80, 0x00], 3),
            Err(CodecError::InvalidShortU16 { offset: 3 })
        );
        // Truncated.
        assert_eq!(
            decode_len(&[], 2),
            Err(CodecError::UnexpectedEndOfInput {
                what: "compact-u16",
                offset: 2,
            })
        );
        assert_eq!(
            decode_len(&[0x80], 7),
            Err(CodecError::UnexpectedEndOfInput {
                what: "compact-u16",
                offset: 8,
            })
        );
    }
}
