//! Two-pass assembler.
//!
//! Pass 1 assigns one address per instruction and collects labels. Pass 2
//! parses operands against the registry and hands them to the encoder. A bad
//! line becomes a [`Diagnostic`] and the pass keeps going.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::encoder::{encode, Operands};
use crate::error::AsmError;
use crate::instructions::{Format, Registry};
use crate::isa::cond::Cond;

/// Label name (upper-cased) → instruction address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolTable {
    map: BTreeMap<String, u32>,
}

impl SymbolTable {
    pub fn get(&self, label: &str) -> Option<u32> {
        self.map.get(&label.to_ascii_uppercase()).copied()
    }

    /// Returns the previous address when the label was already defined.
    pub fn insert(&mut self, label: &str, addr: u32) -> Option<u32> {
        self.map.insert(label.to_ascii_uppercase(), addr)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// An instruction's text after label and comment stripping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    /// 1-based line number in the source.
    pub line: usize,
    pub addr: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelWarning {
    pub line: usize,
    pub label: String,
    pub previous: u32,
    pub addr: u32,
}

impl fmt::Display for LabelWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: label {} redefined (was {}, now {})",
            self.line, self.label, self.previous, self.addr
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub addr: u32,
    pub mnemonic: String,
    pub error: AsmError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.mnemonic, self.error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Emitted {
    pub line: usize,
    pub addr: u32,
    pub word: u16,
}

/// Everything one assembler run produced, including partial output.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Assembly {
    pub symbols: SymbolTable,
    pub source: Vec<SourceLine>,
    pub words: Vec<Emitted>,
    pub diagnostics: Vec<Diagnostic>,
    pub warnings: Vec<LabelWarning>,
}

impl Assembly {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn machine_code(&self) -> Vec<u16> {
        self.words.iter().map(|e| e.word).collect()
    }
}

/// Pass 1: strip comments and labels, number the instructions.
pub fn first_pass(src: &str) -> (SymbolTable, Vec<SourceLine>, Vec<LabelWarning>) {
    let mut symbols = SymbolTable::default();
    let mut lines = Vec::new();
    let mut warnings = Vec::new();
    let mut addr = 0u32;

    for (i, line) in src.lines().enumerate() {
        let raw = strip_comment(line);
        if raw.is_empty() {
            continue;
        }
        let body = match raw.split_once(':') {
            Some((label, rest)) => {
                let label = label.trim();
                if let Some(previous) = symbols.insert(label, addr) {
                    tracing::warn!(line = i + 1, label, previous, addr, "label redefined");
                    warnings.push(LabelWarning {
                        line: i + 1,
                        label: label.to_ascii_uppercase(),
                        previous,
                        addr,
                    });
                }
                rest.trim()
            }
            None => raw,
        };
        if body.is_empty() {
            continue;
        }
        lines.push(SourceLine { line: i + 1, addr, text: body.to_string() });
        addr += 1;
    }
    (symbols, lines, warnings)
}

pub struct Assembler<'r> {
    reg: &'r Registry,
}

impl<'r> Assembler<'r> {
    pub fn new(reg: &'r Registry) -> Self {
        Self { reg }
    }

    pub fn assemble(&self, src: &str) -> Assembly {
        let (symbols, source, warnings) = first_pass(src);
        let mut words = Vec::with_capacity(source.len());
        let mut diagnostics = Vec::new();

        for sl in &source {
            match self.assemble_line(&sl.text, sl.addr, &symbols) {
                Ok(word) => words.push(Emitted { line: sl.line, addr: sl.addr, word }),
                Err(error) => {
                    let mnemonic = tokenize(&sl.text)
                        .first()
                        .map(|t| t.to_ascii_uppercase())
                        .unwrap_or_default();
                    tracing::warn!(line = sl.line, %mnemonic, %error, "assembly error");
                    diagnostics.push(Diagnostic { line: sl.line, addr: sl.addr, mnemonic, error });
                }
            }
        }
        Assembly { symbols, source, words, diagnostics, warnings }
    }

    /// Pass 2 for a single instruction at `addr`.
    pub fn assemble_line(&self, text: &str, addr: u32, symbols: &SymbolTable) -> Result<u16, AsmError> {
        let tokens = tokenize(strip_comment(text));
        let Some((mn, args)) = tokens.split_first() else {
            return Err(AsmError::UnknownMnemonic(String::new()));
        };
        let mnemonic = mn.to_ascii_uppercase();
        let desc = self.reg.lookup(&mnemonic)?;

        let want = match desc.format {
            Format::Fix | Format::Fixv => 0,
            Format::I4 => 1,
            _ => 2,
        };
        if args.len() != want {
            return Err(AsmError::BadOperandCount { mnemonic, expected: want, got: args.len() });
        }

        let mut ops = Operands::default();
        match desc.format {
            Format::Rr | Format::Rs => {
                ops.rd = parse_register(args[0])?;
                ops.rs = parse_register(args[1])?;
            }
            Format::Ri | Format::Ri4 | Format::Ir => {
                ops.rd = parse_register(args[0])?;
                ops.imm = parse_immediate(args[1])?;
            }
            Format::I4 => ops.imm = parse_immediate(args[0])?,
            Format::Bcond => {
                ops.cond = parse_cond(args[0])?;
                // names not in the table are parsed as literals
                ops.imm = match symbols.get(args[1]) {
                    Some(target) => (target as i64 - (addr as i64 + 1)) & 0xFF,
                    None => parse_immediate(args[1])? & 0xFF,
                };
            }
            Format::Jcond => {
                ops.cond = parse_cond(args[0])?;
                ops.rs = parse_register(args[1])?;
            }
            Format::Fix | Format::Fixv => {}
        }
        encode(desc, &ops)
    }
}

fn strip_comment(line: &str) -> &str {
    line.split(';').next().unwrap_or("").trim()
}

fn tokenize(line: &str) -> Vec<&str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect()
}

/// `R0`..`R15`, case-insensitive.
pub fn parse_register(tok: &str) -> Result<u8, AsmError> {
    let bad = || AsmError::InvalidRegister(tok.to_string());
    let t = tok.trim();
    let digits = t.strip_prefix(['R', 'r']).ok_or_else(bad)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    match digits.parse::<u32>() {
        Ok(n) if n < 16 => Ok(n as u8),
        _ => Err(bad()),
    }
}

/// Decimal or `0x` hexadecimal, optionally signed.
pub fn parse_immediate(tok: &str) -> Result<i64, AsmError> {
    let bad = || AsmError::InvalidImmediate(tok.to_string());
    let t = tok.trim();
    let (neg, body) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };
    if body.starts_with(['+', '-']) {
        return Err(bad());
    }
    let v = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) if !hex.starts_with(['+', '-']) => i64::from_str_radix(hex, 16),
        Some(_) => return Err(bad()),
        None => body.parse::<i64>(),
    }
    .map_err(|_| bad())?;
    Ok(if neg { -v } else { v })
}

/// A condition mnemonic, or a raw code masked to four bits.
fn parse_cond(tok: &str) -> Result<u8, AsmError> {
    match Cond::from_mnemonic(tok) {
        Some(c) => Ok(c.code()),
        None => Ok((parse_immediate(tok)? & 0xF) as u8),
    }
}
