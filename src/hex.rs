//! Machine-code text: one word per line, four hex digits.

use crate::error::HexError;

/// Blank lines are skipped. Line numbers in errors are 1-based.
pub fn parse_hex(text: &str) -> Result<Vec<u16>, HexError> {
    let mut words = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let t = line.trim();
        if t.is_empty() {
            continue;
        }
        let line = i + 1;
        if t.len() > 4 {
            return Err(HexError::TooWide { line, text: t.to_string() });
        }
        let w = u16::from_str_radix(t, 16)
            .map_err(|_| HexError::BadWord { line, text: t.to_string() })?;
        words.push(w);
    }
    Ok(words)
}

pub fn format_hex(words: &[u16]) -> String {
    words.iter().map(|w| format!("{w:04X}\n")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn words_render_four_digits() {
        let words = vec![0x0152, 0x530A, 0x0000, 0xFFFF];
        let text = format_hex(&words);
        assert_eq!(text, "0152\n530A\n0000\nFFFF\n");
        assert_eq!(parse_hex(&text).unwrap(), words);
    }

    #[test]
    fn short_words_and_blank_lines() {
        assert_eq!(parse_hex("\n152\n  \n 8415 \n").unwrap(), vec![0x0152, 0x8415]);
    }

    #[test]
    fn wide_words_rejected() {
        // would parse as 1 without the width check
        assert_eq!(
            parse_hex("D101\n00001\n").unwrap_err(),
            HexError::TooWide { line: 2, text: "00001".to_string() }
        );
        assert!(parse_hex("12345\n").is_err());
    }

    #[test]
    fn bad_digits_rejected() {
        assert_eq!(
            parse_hex("0152\nZZZZ\n").unwrap_err(),
            HexError::BadWord { line: 2, text: "ZZZZ".to_string() }
        );
        assert!(parse_hex("-1\n").is_err());
    }
}
