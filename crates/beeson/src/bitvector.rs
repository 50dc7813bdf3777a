//! Fixed-capacity, byte-packed set of booleans.

use crate::error::BitVectorError;

/// Bit `i` lives in byte `i >> 3` under mask `1 << (i & 7)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitVector {
    length: usize,
    bytes: Vec<u8>,
}

impl BitVector {
    /// An all-false vector of `length` bits.
    pub fn new(length: usize) -> Self {
        Self {
            length,
            bytes: vec![0; byte_length(length)],
        }
    }

    /// Wraps the packed bytes of a `length`-bit vector.
    pub fn from_bytes(length: usize, bytes: &[u8]) -> Result<Self, BitVectorError> {
        let expected = byte_length(length);
        if bytes.len() != expected {
            return Err(BitVectorError::LengthMismatch {
                capacity: length,
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            length,
            bytes: bytes.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    fn check(&self, index: usize) -> Result<(), BitVectorError> {
        if index >= self.length {
            return Err(BitVectorError::OutOfBounds {
                index,
                capacity: self.length,
            });
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<bool, BitVectorError> {
        self.check(index)?;
        Ok(self.bytes[index >> 3] & (1 << (index & 7)) != 0)
    }

    pub fn set(&mut self, index: usize) -> Result<(), BitVectorError> {
        self.check(index)?;
        self.bytes[index >> 3] |= 1 << (index & 7);
        Ok(())
    }

    pub fn clear(&mut self, index: usize) -> Result<(), BitVectorError> {
        self.check(index)?;
        self.bytes[index >> 3] &= !(1 << (index & 7));
        Ok(())
    }

    /// Sets or clears bit `index`.
    pub fn put(&mut self, index: usize, value: bool) -> Result<(), BitVectorError> {
        if value {
            self.set(index)
        } else {
            self.clear(index)
        }
    }

    /// Indices of the set bits, ascending.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.length).filter(move |&i| self.bytes[i >> 3] & (1 << (i & 7)) != 0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Bytes needed to store `length` bits.
pub fn byte_length(length: usize) -> usize {
    length.div_ceil(8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_vector_is_all_false() {
        let bits = BitVector::new(13);
        assert_eq!(bits.as_bytes(), &[0, 0]);
        for i in 0..13 {
            assert_eq!(bits.get(i), Ok(false));
        }
    }

    #[test]
    fn set_and_clear_touch_one_bit() {
        let mut bits = BitVector::new(16);
        bits.set(0).unwrap();
        bits.set(9).unwrap();
        assert_eq!(bits.as_bytes(), &[0b0000_0001, 0b0000_0010]);
        bits.clear(0).unwrap();
        assert_eq!(bits.get(0), Ok(false));
        assert_eq!(bits.get(9), Ok(true));
        assert_eq!(bits.indices().collect::<Vec<_>>(), vec![9]);
    }

    #[test]
    fn out_of_range_indices_fail() {
        let mut bits = BitVector::new(8);
        let negative = (-1isize) as usize;
        for index in [8, 9, negative] {
            let err = BitVectorError::OutOfBounds { index, capacity: 8 };
            assert_eq!(bits.get(index), Err(err.clone()));
            assert_eq!(bits.set(index), Err(err.clone()));
            assert_eq!(bits.clear(index), Err(err));
        }
    }

    #[test]
    fn from_bytes_checks_length() {
        assert!(BitVector::from_bytes(9, &[0xff]).is_err());
        let bits = BitVector::from_bytes(9, &[0x00, 0x01]).unwrap();
        assert_eq!(bits.get(8), Ok(true));
    }
}
