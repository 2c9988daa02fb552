//! Condition codes shared by BCOND/JCOND encoding and the interpreter.

use serde::{Deserialize, Serialize};

use crate::cpu::Psw;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cond {
    Eq = 0,
    Ne = 1,
    Cs = 2,
    Cc = 3,
    Hi = 4,
    Ls = 5,
    Gt = 6,
    Le = 7,
    Fs = 8,
    Fc = 9,
    Lo = 10,
    Hs = 11,
    Lt = 12,
    Ge = 13,
    Uc = 14,
    Nv = 15,
}

pub const CONDITIONS: [(&str, Cond); 16] = [
    ("EQ", Cond::Eq),
    ("NE", Cond::Ne),
    ("CS", Cond::Cs),
    ("CC", Cond::Cc),
    ("HI", Cond::Hi),
    ("LS", Cond::Ls),
    ("GT", Cond::Gt),
    ("LE", Cond::Le),
    ("FS", Cond::Fs),
    ("FC", Cond::Fc),
    ("LO", Cond::Lo),
    ("HS", Cond::Hs),
    ("LT", Cond::Lt),
    ("GE", Cond::Ge),
    ("UC", Cond::Uc),
    ("NV", Cond::Nv),
];

impl Cond {
    /// Low four bits of `code` select the condition.
    pub fn from_code(code: u8) -> Self {
        CONDITIONS[(code & 0xF) as usize].1
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn mnemonic(self) -> &'static str {
        CONDITIONS[self as usize].0
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        CONDITIONS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|&(_, c)| c)
    }

    /// Evaluate against the status word. C and L are never written by any
    /// instruction, so CS/CC/HI/LS/LO/HS see them as clear.
    pub fn holds(self, psw: Psw) -> bool {
        let z = psw.contains(Psw::Z);
        let n = psw.contains(Psw::N);
        let f = psw.contains(Psw::F);
        let c = psw.contains(Psw::C);
        let l = psw.contains(Psw::L);
        match self {
            Cond::Eq => z,
            Cond::Ne => !z,
            Cond::Cs => c,
            Cond::Cc => !c,
            Cond::Hi => l,
            Cond::Ls => !l,
            Cond::Gt => n,
            Cond::Le => !n,
            Cond::Fs => f,
            Cond::Fc => !f,
            Cond::Lo => !l && !z,
            Cond::Hs => l || z,
            Cond::Lt => !n && !z,
            Cond::Ge => n || z,
            Cond::Uc => true,
            Cond::Nv => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_code() {
        for (i, (name, c)) in CONDITIONS.iter().enumerate() {
            assert_eq!(c.code() as usize, i);
            assert_eq!(Cond::from_mnemonic(&name.to_lowercase()), Some(*c));
        }
        assert_eq!(Cond::from_code(0x12), Cond::Cs);
        assert_eq!(Cond::from_mnemonic("XX"), None);
    }

    #[test]
    fn truth_table_with_cleared_flags() {
        let psw = Psw::empty();
        let taken: Vec<_> = CONDITIONS
            .iter()
            .filter(|(_, c)| c.holds(psw))
            .map(|(n, _)| *n)
            .collect();
        assert_eq!(taken, ["NE", "CC", "LS", "LE", "FC", "LO", "LT", "UC"]);
    }

    #[test]
    fn zero_and_negative_conditions() {
        assert!(Cond::Eq.holds(Psw::Z));
        assert!(Cond::Ge.holds(Psw::Z));
        assert!(Cond::Hs.holds(Psw::Z));
        assert!(!Cond::Lt.holds(Psw::Z));
        assert!(Cond::Gt.holds(Psw::N));
        assert!(Cond::Ge.holds(Psw::N));
        assert!(!Cond::Lt.holds(Psw::N));
        assert!(Cond::Fs.holds(Psw::F));
    }
}
