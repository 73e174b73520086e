/// A fixed-size set of piece indices backed by a bitfield.
///
/// Bits are numbered from the high bit of the first byte. Indices at or past
/// the piece count are ignored on write and report `false` on read.
#[derive(Debug, Clone)]
pub struct PieceSet {
    bits: Vec<u8>,
    piece_count: usize,
}

impl PieceSet {
    pub fn new(piece_count: usize) -> Self {
        Self {
            bits: vec![0; piece_count.div_ceil(8)],
            piece_count,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        if index >= self.piece_count {
            return false;
        }
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8);
        (self.bits[byte_index] >> bit_index) & 1 == 1
    }

    pub fn insert(&mut self, index: usize) {
        if index >= self.piece_count {
            return;
        }
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8);
        self.bits[byte_index] |= 1 << bit_index;
    }

    pub fn remove(&mut self, index: usize) {
        if index >= self.piece_count {
            return;
        }
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8);
        self.bits[byte_index] &= !(1 << bit_index);
    }

    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|b| *b = 0);
    }

    pub fn count(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.piece_count).filter(move |&i| self.contains(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut set = PieceSet::new(20);
        set.insert(0);
        set.insert(9);
        set.insert(19);
        assert!(set.contains(0) && set.contains(9) && set.contains(19));
        assert_eq!(set.count(), 3);

        set.remove(9);
        assert!(!set.contains(9));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 19]);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut set = PieceSet::new(10);
        set.insert(10);
        set.insert(1000);
        assert!(set.is_empty());
        assert!(!set.contains(10));
    }

    #[test]
    fn test_clear() {
        let mut set = PieceSet::new(10);
        (0..10).for_each(|i| set.insert(i));
        assert_eq!(set.count(), 10);
        set.clear();
        assert!(set.is_empty());
    }
}
