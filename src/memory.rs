use serde::{Deserialize, Serialize};

pub const DMEM_WORDS: usize = 512;
/// Effective addresses keep the low nine bits of the address register.
pub const ADDR_MASK: u16 = 0x1FF;

/// Data memory as seen by LOAD/STOR and the CIM instructions. Addresses are
/// raw register values; the implementation wraps them into range.
pub trait Bus {
    fn read(&mut self, addr: i16) -> i16;
    fn write(&mut self, addr: i16, val: i16);
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DataMemory {
    pub mem: Vec<i16>,
}

impl DataMemory {
    pub fn new() -> Self {
        Self {
            mem: vec![0; DMEM_WORDS],
        }
    }

    #[inline]
    pub fn effective(addr: i16) -> usize {
        (addr as u16 & ADDR_MASK) as usize
    }

    /// Non-zero words as (address, value), in address order.
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, i16)> + '_ {
        self.mem.iter().copied().enumerate().filter(|&(_, v)| v != 0)
    }
}

impl Default for DataMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DataMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.nonzero()).finish()
    }
}

impl Bus for DataMemory {
    fn read(&mut self, addr: i16) -> i16 {
        self.mem[Self::effective(addr)]
    }
    fn write(&mut self, addr: i16, val: i16) {
        self.mem[Self::effective(addr)] = val;
    }
}
