//! Codec core
//!
//! Building blocks used by the `huffman` module.  These work on streams and
//! slices and know nothing about files or the container header.

pub mod bit_channel;
pub mod code;
pub mod node;
pub mod priority_queue;
pub mod stack;
pub mod tree_codec;
