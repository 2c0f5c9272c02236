//! Bounded LIFO, used to replay a tree dump.

pub struct Stack<T> {
    items: Vec<T>,
    capacity: usize
}

impl <T> Stack<T> {
    pub fn create(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity
        }
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }
    pub fn size(&self) -> usize {
        self.items.len()
    }
    /// returns false if the stack is full
    pub fn push(&mut self,item: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        true
    }
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }
}

#[test]
fn lifo() {
    let mut s: Stack<u8> = Stack::create(3);
    assert_eq!(s.pop(),None);
    assert!(s.push(1));
    assert!(s.push(2));
    assert_eq!(s.pop(),Some(2));
    assert!(s.push(3));
    assert!(s.push(4));
    assert!(s.is_full());
    assert!(!s.push(5));
    assert_eq!(s.size(),3);
    assert_eq!(s.pop(),Some(4));
    assert_eq!(s.pop(),Some(3));
    assert_eq!(s.pop(),Some(1));
    assert!(s.is_empty());
    assert_eq!(s.pop(),None);
}
