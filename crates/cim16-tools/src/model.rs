use anyhow::{Context, Result};
use std::path::Path;

pub use cim16_rs::hex::{format_hex, parse_hex};

pub fn load_hex(path: &Path) -> Result<Vec<u16>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_hex(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn write_hex(path: &Path, words: &[u16]) -> Result<()> {
    std::fs::write(path, format_hex(words))
        .with_context(|| format!("writing {}", path.display()))
}

pub fn write_listing(path: &Path, lines: &[String]) -> Result<()> {
    let mut out = String::new();
    for l in lines {
        out.push_str(l);
        out.push('\n');
    }
    std::fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn load_reports_path_and_line() {
        let dir = std::env::temp_dir().join(format!("cim16-model-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.hex");
        std::fs::write(&path, "D101\n00001\n").unwrap();
        let err = format!("{:#}", load_hex(&path).unwrap_err());
        assert!(err.contains("bad.hex"), "{err}");
        assert!(err.contains("line 2"), "{err}");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn files_roundtrip() {
        let dir = std::env::temp_dir().join(format!("cim16-model-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("prog.hex");
        write_hex(&path, &[0x8415, 0xC2F8]).unwrap();
        assert_eq!(load_hex(&path).unwrap(), vec![0x8415, 0xC2F8]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
