//! Human-readable rendering of raw bytes for logs.

use std::fmt::Write;

/// Render bytes for an operator.
///
/// Printable ASCII is kept, CR and LF become line breaks (a CR LF pair is one
/// break), and every other byte is shown as `<XX>` in hex.
pub fn printable(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 16);
    let mut iter = bytes.iter().copied().peekable();

    while let Some(b) = iter.next() {
        match b {
            b'\r' => {
                if iter.peek() == Some(&b'\n') {
                    iter.next();
                }
                out.push('\n');
            }
            b'\n' => out.push('\n'),
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "<{b:02X}>");
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_ascii_passthrough() {
        assert_eq!(printable(b"MSH|^~\\&|"), "MSH|^~\\&|");
    }

    #[test]
    fn test_printable_control_bytes() {
        assert_eq!(printable(&[0x0B, b'A', 0x1C, 0x0D]), "<0B>A<1C>\n");
    }

    #[test]
    fn test_printable_line_endings() {
        assert_eq!(printable(b"MSH\rPID\r\nOBX\n"), "MSH\nPID\nOBX\n");
    }

    #[test]
    fn test_printable_high_bytes() {
        assert_eq!(printable(&[0xC3, 0xA4]), "<C3><A4>");
        assert_eq!(printable(&[]), "");
    }
}
