//! Decoding of user-supplied CSV files.
//!
//! Word lists often come out of spreadsheets saved in a local code page.
//! UTF-8 (with or without a byte order mark) is tried first, then GB18030,
//! then Shift_JIS. `encoding_rs` implements Shift_JIS as Windows-31J, so
//! cp932 files decode as well.

use encoding_rs::{Encoding, GB18030, SHIFT_JIS, UTF_8};
use std::borrow::Cow;
use std::io::Read;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode `bytes` with the first candidate encoding that accepts them
/// without replacement. If none does, fall back to lossy UTF-8.
pub fn decode_text(bytes: &[u8]) -> (Cow<'_, str>, &'static Encoding) {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    for encoding in [UTF_8, GB18030, SHIFT_JIS] {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return (text, encoding);
        }
    }
    tracing::warn!("text is not valid in any supported encoding, decoding lossily");
    (String::from_utf8_lossy(bytes), UTF_8)
}

/// Read all of `reader` and decode it.
pub fn read_text<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let (text, encoding) = decode_text(&bytes);
    tracing::debug!(encoding = encoding.name(), bytes = bytes.len(), "decoded text");
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn utf8_with_and_without_bom() {
        let (text, encoding) = decode_text("\u{feff}假名,释义".as_bytes());
        assert_eq!(text, "假名,释义");
        assert_eq!(encoding, UTF_8);
        assert_eq!(decode_text("ねこ".as_bytes()).0, "ねこ");
    }

    #[test]
    fn gb18030_bytes() {
        let (bytes, _, unmappable) = GB18030.encode("单元,假名,释义\n动物,ねこ,猫");
        assert!(!unmappable);
        let (text, encoding) = decode_text(&bytes);
        assert_eq!(encoding, GB18030);
        assert_eq!(text, "单元,假名,释义\n动物,ねこ,猫");
    }

    #[test]
    fn shift_jis_bytes() {
        // A trailing half-width katakana byte is a dangling lead byte in GB18030.
        let mut bytes = SHIFT_JIS.encode("ねこ,猫").0.into_owned();
        bytes.push(0xB1);
        let (text, encoding) = decode_text(&bytes);
        assert_eq!(encoding, SHIFT_JIS);
        assert_eq!(text, "ねこ,猫ｱ");
    }

    #[test]
    fn read_text_from_reader() {
        let (encoded, _, _) = GB18030.encode("学校,がっこう,学校\n");
        let bytes: &[u8] = &encoded;
        assert_eq!(read_text(bytes).unwrap(), "学校,がっこう,学校\n");
    }
}
