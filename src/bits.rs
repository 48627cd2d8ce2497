use std::mem;

const BITS_PER_LONG: usize = mem::size_of::<libc::c_ulong>() * 8;

/// A zeroed bit buffer laid out the way the evdev ioctls fill it (an array of `unsigned long`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuf {
    words: Vec<libc::c_ulong>,
    nbits: usize,
}

impl BitBuf {
    /// A buffer large enough to hold `nbits` bits.
    pub fn with_bits(nbits: usize) -> Self {
        Self {
            words: vec![0; nbits.div_ceil(BITS_PER_LONG).max(1)],
            nbits,
        }
    }

    /// The number of bits the buffer was sized for.
    pub fn len(&self) -> usize {
        self.nbits
    }

    pub fn is_empty(&self) -> bool {
        self.nbits == 0
    }

    /// The size of the buffer in bytes, as passed in the ioctl request.
    pub fn byte_len(&self) -> usize {
        self.words.len() * mem::size_of::<libc::c_ulong>()
    }

    /// Whether `bit` is set. Bits outside the buffer read as clear.
    pub fn test(&self, bit: usize) -> bool {
        if bit >= self.nbits {
            return false;
        }

        self.words
            .get(bit / BITS_PER_LONG)
            .is_some_and(|word| (word >> (bit % BITS_PER_LONG)) & 1 == 1)
    }

    pub fn set(&mut self, bit: usize) {
        if bit >= self.nbits {
            return;
        }

        if let Some(word) = self.words.get_mut(bit / BITS_PER_LONG) {
            *word |= 1 << (bit % BITS_PER_LONG);
        }
    }

    /// Iterate over the indices of all set bits.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.nbits).filter(|&bit| self.test(bit))
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut libc::c_ulong {
        self.words.as_mut_ptr()
    }
}
