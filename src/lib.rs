//! # huffpress
//!
//! Static Huffman compression over the byte alphabet.
//!
//! * `huffman` handles the container: header, tree dump, packed payload
//! * `tools` holds the codec core: bit channel, heap, stack, tree and tree codec
//!
//! The format is byte-exact with respect to the tree construction order: leaves are
//! queued in ascending symbol order and the heap only moves items on strict inequality.

pub mod tools;
pub mod huffman;

type DYNERR = Box<dyn std::error::Error>;

/// number of distinct symbols
pub const ALPHABET: usize = 256;
/// size of the buffers used for block transfers and bit packing
pub const BLOCK: usize = 4096;
/// longest possible tree dump, 256 leaves and 255 interior nodes
pub const MAX_TREE_SIZE: usize = 3 * ALPHABET - 1;
/// longest possible code, depth of the deepest leaf in a 256 leaf tree
pub const MAX_CODE_BITS: usize = ALPHABET - 1;

/// Codec Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("file format mismatch")]
    FileFormatMismatch,
    #[error("invalid Huffman encoding")]
    InvalidEncoding,
    #[error("histogram needs at least two distinct symbols")]
    DegenerateHistogram,
    #[error("bounded container is full")]
    CapacityExceeded,
    #[error("symbol {0} is not in the tree")]
    SymbolNotInTree(u8)
}

/// Options controlling compression
#[derive(Clone)]
pub struct Options {
    /// permission bits stored in the header when compressing
    pub permissions: u16,
    /// starting position in the input file
    pub in_offset: u64,
    /// starting position in the output file
    pub out_offset: u64
}

pub const STD_OPTIONS: Options = Options {
    permissions: 0o644,
    in_offset: 0,
    out_offset: 0
};
