//! Variable length Huffman codes.
//! A `Code` is the root-to-leaf path of a symbol, 0 for left and 1 for right.

use bit_vec::BitVec;
use crate::MAX_CODE_BITS;

#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Code {
    bits: BitVec
}

impl Code {
    pub fn new() -> Self {
        Self {
            bits: BitVec::with_capacity(MAX_CODE_BITS)
        }
    }
    /// number of bits in use
    pub fn len(&self) -> usize {
        self.bits.len()
    }
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
    pub fn is_full(&self) -> bool {
        self.bits.len() == MAX_CODE_BITS
    }
    /// Append a bit, returns false if the code is already at maximum length.
    pub fn push(&mut self,bit: bool) -> bool {
        if self.is_full() {
            return false;
        }
        self.bits.push(bit);
        true
    }
    /// Remove the most recently pushed bit.
    pub fn pop(&mut self) -> Option<bool> {
        self.bits.pop()
    }
    /// bit at index `i`, bits beyond the length are unset
    pub fn get(&self,i: usize) -> bool {
        self.bits.get(i).unwrap_or(false)
    }
    pub fn iter(&self) -> bit_vec::Iter<'_> {
        self.bits.iter()
    }
    /// true if `self` is a (not necessarily proper) prefix of `other`
    pub fn is_prefix_of(&self,other: &Code) -> bool {
        self.len() <= other.len() && self.iter().zip(other.iter()).all(|(a,b)| a==b)
    }
}

impl Default for Code {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for bit in self.iter() {
            write!(f,"{}",bit as u8)?;
        }
        Ok(())
    }
}

#[test]
fn push_and_pop() {
    let mut code = Code::new();
    assert!(code.is_empty());
    assert!(code.push(true));
    assert!(code.push(false));
    assert!(code.push(true));
    assert_eq!(code.to_string(),"101");
    assert_eq!(code.pop(),Some(true));
    assert_eq!(code.len(),2);
    assert!(!code.get(2));
    assert_eq!(code.pop(),Some(false));
    assert_eq!(code.pop(),Some(true));
    assert_eq!(code.pop(),None);
}

#[test]
fn bounded() {
    let mut code = Code::new();
    for i in 0..MAX_CODE_BITS {
        assert!(code.push(i%2==0));
    }
    assert!(code.is_full());
    assert!(!code.push(true));
    assert_eq!(code.len(),MAX_CODE_BITS);
}

#[test]
fn prefix() {
    let mut a = Code::new();
    let mut b = Code::new();
    a.push(true);
    b.push(true);
    b.push(false);
    assert!(a.is_prefix_of(&b));
    assert!(!b.is_prefix_of(&a));
    a.push(true);
    assert!(!a.is_prefix_of(&b));
}
