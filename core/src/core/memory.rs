/// Size of the flat address space.
pub const MEMORY_SIZE: usize = 0x10000;

/// Flat 64 KiB byte-addressable memory.
///
/// Addresses are `u16`, so every access wraps modulo 0x10000. 16-bit values
/// are stored little-endian: low byte at the lower address.
#[derive(Clone)]
pub struct Memory {
    data: Box<[u8; MEMORY_SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory").field("size", &MEMORY_SIZE).finish()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self { data: Box::new([0; MEMORY_SIZE]) }
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    pub fn write(&mut self, addr: u16, val: u8) {
        self.data[addr as usize] = val;
    }

    pub fn read_u16(&self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    pub fn write_u16(&mut self, addr: u16, val: u16) {
        self.write(addr, val as u8);
        self.write(addr.wrapping_add(1), (val >> 8) as u8);
    }

    /// Copy `bytes` in starting at `addr`, wrapping past 0xFFFF.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.write(addr.wrapping_add(i as u16), b);
        }
    }

    /// `len` bytes starting at `start`, wrapping past 0xFFFF. Used for hexdumps.
    pub fn read_range(&self, start: u16, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| self.read(start.wrapping_add(i as u16)))
            .collect()
    }

    pub fn fill(&mut self, val: u8) {
        self.data.fill(val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_is_little_endian() {
        let mut mem = Memory::new();
        mem.write_u16(0x1000, 0x1234);
        assert_eq!(mem.read(0x1000), 0x34);
        assert_eq!(mem.read(0x1001), 0x12);
        assert_eq!(mem.read_u16(0x1000), 0x1234);
    }

    #[test]
    fn test_word_access_wraps_at_top_of_memory() {
        let mut mem = Memory::new();
        mem.write_u16(0xFFFF, 0xABCD);
        assert_eq!(mem.read(0xFFFF), 0xCD);
        assert_eq!(mem.read(0x0000), 0xAB);
    }

    #[test]
    fn test_read_range_wraps() {
        let mut mem = Memory::new();
        mem.load(0xFFFE, &[1, 2, 3, 4]);
        assert_eq!(mem.read_range(0xFFFE, 4), vec![1, 2, 3, 4]);
        assert_eq!(mem.read(0x0001), 4);
    }
}
