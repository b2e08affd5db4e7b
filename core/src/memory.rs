use log::info;

use crate::constants::{
    GLYPH_START, MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET,
};
use crate::error::{Fault, LoadError};

/// # Memory
/// 4096 bytes of flat, byte addressable memory.
///
/// - `0x000..0x050` holds the glyph table (see `SPRITE_SHEET`)
/// - `0x050..0x200` is otherwise unused; it held the interpreter on original machines
/// - `0x200..0x1000` is where programs are loaded
#[derive(Clone)]
pub struct Memory([u8; MEMORY_SIZE]);

impl Memory {
    /// Creates zeroed memory with the glyph table in place.
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        let start = GLYPH_START as usize;
        bytes[start..start + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);
        Memory(bytes)
    }

    /// Copies a program image to `PROGRAM_START`, leaving all other memory untouched.
    pub fn load(&mut self, image: &[u8]) -> Result<(), LoadError> {
        if image.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::ImageTooLarge {
                size: image.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        let start = PROGRAM_START as usize;
        self.0[start..start + image.len()].copy_from_slice(image);
        info!("loaded {} byte program at {:#05X}", image.len(), start);
        Ok(())
    }

    /// Reads the big-endian word at `addr`, if both of its bytes are in memory.
    pub fn word(&self, addr: u16) -> Option<u16> {
        let addr = addr as usize;
        let high = *self.0.get(addr)?;
        let low = *self.0.get(addr + 1)?;
        Some(u16::from(high) << 8 | u16::from(low))
    }

    /// Borrows `len` bytes starting at `addr`.
    pub fn slice(&self, addr: u16, len: usize) -> Result<&[u8], Fault> {
        let range = Memory::range(addr, len)?;
        Ok(&self.0[range])
    }

    /// Mutably borrows `len` bytes starting at `addr`.
    pub fn slice_mut(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Fault> {
        let range = Memory::range(addr, len)?;
        Ok(&mut self.0[range])
    }

    /// The whole address space.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn range(addr: u16, len: usize) -> Result<std::ops::Range<usize>, Fault> {
        let start = addr as usize;
        let end = start + len;
        if end > MEMORY_SIZE {
            // Report the first byte that doesn't exist
            return Err(Fault::AddressOutOfRange {
                addr: start.max(MEMORY_SIZE),
            });
        }
        Ok(start..end)
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_table_is_preloaded() {
        let memory = Memory::new();
        assert_eq!(memory.as_bytes()[0..80], SPRITE_SHEET[..]);
        assert!(memory.as_bytes()[80..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_load_copies_to_program_start() {
        let mut memory = Memory::new();
        memory.load(&[0x60, 0x05, 0x70, 0x03]).unwrap();
        assert_eq!(memory.as_bytes()[0x200..0x204], [0x60, 0x05, 0x70, 0x03]);
        assert_eq!(memory.as_bytes()[0x204], 0x0);
        assert_eq!(memory.as_bytes()[0..80], SPRITE_SHEET[..]);
    }

    #[test]
    fn test_load_accepts_maximum_size() {
        let mut memory = Memory::new();
        let image = vec![0xAB; MAX_PROGRAM_SIZE];
        memory.load(&image).unwrap();
        assert_eq!(memory.as_bytes()[MEMORY_SIZE - 1], 0xAB);
    }

    #[test]
    fn test_load_rejects_one_byte_too_many() {
        let mut memory = Memory::new();
        let image = vec![0xAB; MAX_PROGRAM_SIZE + 1];
        match memory.load(&image) {
            Err(LoadError::ImageTooLarge { size, max }) => {
                assert_eq!(size, MAX_PROGRAM_SIZE + 1);
                assert_eq!(max, MAX_PROGRAM_SIZE);
            }
            other => panic!("expected ImageTooLarge but got {:?}", other),
        }
        // Nothing was written
        assert_eq!(memory.as_bytes()[0x200], 0x0);
    }

    #[test]
    fn test_word_is_big_endian() {
        let mut memory = Memory::new();
        memory.load(&[0xAA, 0xBB]).unwrap();
        assert_eq!(memory.word(0x200), Some(0xAABB));
    }

    #[test]
    fn test_word_at_top_of_memory() {
        let memory = Memory::new();
        assert_eq!(memory.word(0xFFE), Some(0x0));
        assert_eq!(memory.word(0xFFF), None);
        assert_eq!(memory.word(0x1000), None);
    }

    #[test]
    fn test_slice_out_of_range() {
        let mut memory = Memory::new();
        assert_eq!(memory.slice(0xFFD, 3).map(|s| s.len()), Ok(3));
        assert_eq!(
            memory.slice(0xFFE, 3),
            Err(Fault::AddressOutOfRange { addr: 0x1000 })
        );
        assert_eq!(
            memory.slice_mut(0x2000, 1).map(|s| s.len()),
            Err(Fault::AddressOutOfRange { addr: 0x2000 })
        );
    }
}
