//! Percent-decoding of a raw query.

use crate::EscapeError;

/// Size of the relay buffer [`unescape`] writes through.
pub const SCRATCH_LEN: usize = 128;

/// Decodes `%XX` escapes (hex digits in either case) and `+` (a space) in
/// `input`, replacing the contents of `out` with the result.
///
/// Every escape is validated before anything is written: on error `out` is
/// left empty. The decoded bytes are staged in `scratch` and copied to `out`
/// a block at a time; `out` is grown once, to the exact decoded length.
/// The result is not checked for UTF-8.
pub fn unescape(
    input: &[u8],
    out: &mut Vec<u8>,
    scratch: &mut [u8; SCRATCH_LEN],
) -> Result<(), EscapeError> {
    out.clear();

    let mut escapes = 0;
    let mut i = 0;
    while i < input.len() {
        if input[i] != b'%' {
            i += 1;
            continue;
        }
        match (input.get(i + 1), input.get(i + 2)) {
            (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                escapes += 1;
                i += 3;
            }
            _ => {
                let end = input.len().min(i + 3);
                debug!(offset = i, "malformed percent escape");
                return Err(EscapeError::new(&input[i..end], i));
            }
        }
    }

    out.reserve_exact(input.len() - 2 * escapes);

    let mut filled = 0;
    let mut i = 0;
    while i < input.len() {
        let byte = match input[i] {
            b'%' => {
                let byte = (unhex(input[i + 1]) << 4) | unhex(input[i + 2]);
                i += 3;
                byte
            }
            b'+' => {
                i += 1;
                b' '
            }
            byte => {
                i += 1;
                byte
            }
        };
        scratch[filled] = byte;
        filled += 1;
        if filled == SCRATCH_LEN {
            out.extend_from_slice(scratch);
            filled = 0;
        }
    }
    out.extend_from_slice(&scratch[..filled]);

    trace!(raw = input.len(), decoded = out.len(), escapes, "unescaped query");
    Ok(())
}

fn unhex(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &[u8]) -> Result<Vec<u8>, EscapeError> {
        let mut out = Vec::new();
        let mut scratch = [0; SCRATCH_LEN];
        unescape(input, &mut out, &mut scratch)?;
        Ok(out)
    }

    #[test]
    fn decodes_escapes_and_plus() {
        assert_eq!(decode(b"caf%C3%A9").unwrap(), "café".as_bytes());
        assert_eq!(decode(b"a+b%2bc").unwrap(), b"a b+c");
        assert_eq!(decode(b"%7e%7E").unwrap(), b"~~");
        assert_eq!(decode(b"").unwrap(), b"");
    }

    #[test]
    fn result_need_not_be_utf8() {
        assert_eq!(decode(b"%FF%00").unwrap(), [0xff, 0x00]);
    }

    #[test]
    fn reports_offending_fragment() {
        let err = decode(b"a=%2").unwrap_err();
        assert_eq!(err.fragment(), b"%2");
        assert_eq!(err.offset(), 2);

        assert_eq!(decode(b"%zz1").unwrap_err().fragment(), b"%zz");
        assert_eq!(decode(b"x%").unwrap_err().fragment(), b"%");
        assert_eq!(decode(b"%4g").unwrap_err().fragment(), b"%4g");
    }

    #[test]
    fn validates_before_writing() {
        let mut out = b"stale".to_vec();
        let mut scratch = [0; SCRATCH_LEN];
        assert!(unescape(b"ok=%41&bad=%", &mut out, &mut scratch).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn relays_long_inputs_through_scratch() {
        let input = "%41b".repeat(200);
        let decoded = decode(input.as_bytes()).unwrap();
        assert_eq!(decoded, "Ab".repeat(200).as_bytes());
    }
}
