//! Bit ranges addressing a record.
//!
//! Positions are 1-indexed and MSB-first: bit 1 is the high bit of byte 0,
//! bit 8 is its low bit, bit 9 is the high bit of byte 1.

/// A single bit or an inclusive span of bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitRange {
    Bit(usize),
    Span { start: usize, end: usize },
}

impl BitRange {
    pub fn bit(pos: usize) -> Self {
        BitRange::Bit(pos)
    }

    pub fn span(start: usize, end: usize) -> Self {
        BitRange::Span { start, end }
    }

    /// The whole byte at `index` (0-based), i.e. bits `8*index+1 ..= 8*index+8`.
    pub fn byte(index: usize) -> Self {
        BitRange::Span {
            start: index * 8 + 1,
            end: index * 8 + 8,
        }
    }

    /// First and last bit covered.
    pub fn bounds(&self) -> (usize, usize) {
        match *self {
            BitRange::Bit(pos) => (pos, pos),
            BitRange::Span { start, end } => (start, end),
        }
    }

    /// Number of bits covered; 0 for a reversed span.
    pub fn width(&self) -> usize {
        let (start, end) = self.bounds();
        if end < start { 0 } else { (end - start).saturating_add(1) }
    }

    /// True if the range is exactly one byte-aligned byte.
    pub fn is_whole_byte(&self) -> bool {
        match *self {
            BitRange::Bit(_) => false,
            BitRange::Span { start, end } => {
                start >= 1 && (start - 1) % 8 == 0 && start.checked_add(7) == Some(end)
            }
        }
    }

    /// All-ones value as wide as the range (saturating at 64 bits).
    pub fn all_ones(&self) -> u64 {
        match self.width() {
            w if w >= 64 => u64::MAX,
            w => (1u64 << w) - 1,
        }
    }

    pub fn overlaps(&self, other: &BitRange) -> bool {
        if self.width() == 0 || other.width() == 0 {
            return false;
        }
        let (a_start, a_end) = self.bounds();
        let (b_start, b_end) = other.bounds();
        a_start <= b_end && b_start <= a_end
    }
}

impl From<usize> for BitRange {
    fn from(pos: usize) -> Self {
        BitRange::Bit(pos)
    }
}

impl From<(usize, usize)> for BitRange {
    fn from((start, end): (usize, usize)) -> Self {
        BitRange::Span { start, end }
    }
}
