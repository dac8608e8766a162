//! File system helpers (BOM-aware readers).

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Reads an MCS source file as text.
///
/// UTF-16 files are decoded when they carry a BOM, a UTF-8 BOM is stripped,
/// and anything that is not valid UTF-8 is decoded as Windows-1252, which is
/// what most EBCDIC-to-ASCII transfers produce.
pub fn read_mcs_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(decode_mcs_bytes(&bytes))
}

/// Decodes raw bytes of an MCS source.
pub fn decode_mcs_bytes(bytes: &[u8]) -> String {
    let content = match bytes {
        [0xFF, 0xFE, ..] => {
            let (decoded, _, had_errors) = encoding_rs::UTF_16LE.decode(bytes);
            if had_errors {
                tracing::warn!("Errors detected while decoding UTF-16LE input");
            }
            decoded.into_owned()
        }
        [0xFE, 0xFF, ..] => {
            let (decoded, _, had_errors) = encoding_rs::UTF_16BE.decode(bytes);
            if had_errors {
                tracing::warn!("Errors detected while decoding UTF-16BE input");
            }
            decoded.into_owned()
        }
        _ => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => {
                tracing::debug!("UTF-8 decoding failed, trying Windows-1252");
                let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
                decoded.into_owned()
            }
        },
    };

    content.trim_start_matches('\u{FEFF}').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_utf8() {
        assert_eq!(decode_mcs_bytes(b"++VER(Z038) ."), "++VER(Z038) .");
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"++PTF(UA00001) .");
        assert_eq!(decode_mcs_bytes(&bytes), "++PTF(UA00001) .");
    }

    #[test]
    fn test_decode_utf16le() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "++NULL .".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_mcs_bytes(&bytes), "++NULL .");
    }

    #[test]
    fn test_decode_windows_1252_fallback() {
        // 0xA7 is the section sign in Windows-1252 and invalid UTF-8 on its own
        let bytes = [b'+', b'+', b'X', 0xA7];
        assert_eq!(decode_mcs_bytes(&bytes), "++X\u{A7}");
    }
}
