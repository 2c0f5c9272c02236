//! Static Huffman Compression
//!
//! The compressed stream is laid out as follows:
//! * 16 byte header, little endian: magic, permissions (u16), tree size (u16), expanded size (u64)
//! * postorder dump of the Huffman tree, see `tools::tree_codec`
//! * the code of every input byte, packed LSB first and zero padded to a byte boundary
//!
//! The input is read twice, once to count symbols and once to encode them, hence the
//! `Seek` requirement.  The permission bits are not interpreted here, they are carried
//! along for whoever writes the expanded file.

use std::io::{Cursor,Read,Write,Seek,SeekFrom,ErrorKind};
use crate::tools::bit_channel::{BitReader,BitWriter};
use crate::tools::tree_codec::*;
use crate::{DYNERR,BLOCK,Error,Options};

pub const MAGIC: u32 = 0xBEEFD00D;
pub const HEADER_SIZE: usize = 16;

#[derive(Clone,Debug,PartialEq)]
pub struct Header {
    pub magic: u32,
    /// mode bits of the expanded file
    pub permissions: u16,
    /// length of the tree dump that follows the header
    pub tree_size: u16,
    /// length of the expanded data
    pub file_size: u64
}

impl Header {
    pub fn to_bytes(&self) -> [u8;HEADER_SIZE] {
        let mut ans = [0;HEADER_SIZE];
        ans[0..4].copy_from_slice(&u32::to_le_bytes(self.magic));
        ans[4..6].copy_from_slice(&u16::to_le_bytes(self.permissions));
        ans[6..8].copy_from_slice(&u16::to_le_bytes(self.tree_size));
        ans[8..16].copy_from_slice(&u64::to_le_bytes(self.file_size));
        ans
    }
    /// parse and check the magic number
    pub fn from_bytes(buf: &[u8;HEADER_SIZE]) -> Result<Self,Error> {
        let magic = u32::from_le_bytes([buf[0],buf[1],buf[2],buf[3]]);
        if magic != MAGIC {
            log::error!("bad magic number {:08X}",magic);
            return Err(Error::FileFormatMismatch);
        }
        Ok(Self {
            magic,
            permissions: u16::from_le_bytes([buf[4],buf[5]]),
            tree_size: u16::from_le_bytes([buf[6],buf[7]]),
            file_size: u64::from_le_bytes([buf[8],buf[9],buf[10],buf[11],buf[12],buf[13],buf[14],buf[15]])
        })
    }
    pub fn read<R: Read>(reader: &mut BitReader<R>) -> Result<Self,DYNERR> {
        let mut buf = [0;HEADER_SIZE];
        if reader.read_bytes(&mut buf)? < HEADER_SIZE {
            log::error!("unable to read header");
            return Err(Box::new(Error::FileFormatMismatch));
        }
        Ok(Self::from_bytes(&buf)?)
    }
    pub fn write<W: Write>(&self,writer: &mut BitWriter<W>) -> Result<(),DYNERR> {
        if writer.write_bytes(&self.to_bytes())? < HEADER_SIZE {
            return Err(Box::new(std::io::Error::from(ErrorKind::WriteZero)));
        }
        Ok(())
    }
}

/// Read the header at `opt.in_offset` and leave the stream where it was found.
pub fn read_header<R: Read + Seek>(compressed_in: &mut R,opt: &Options) -> Result<Header,DYNERR> {
    compressed_in.seek(SeekFrom::Start(opt.in_offset))?;
    let mut reader = BitReader::new(&mut *compressed_in);
    let header = Header::read(&mut reader)?;
    compressed_in.seek(SeekFrom::Start(opt.in_offset))?;
    Ok(header)
}

/// Main compression function.
/// `expanded_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    expanded_in.seek(SeekFrom::Start(opt.in_offset))?;
    compressed_out.seek(SeekFrom::Start(opt.out_offset))?;
    let mut reader = BitReader::new(expanded_in);
    let mut writer = BitWriter::new(compressed_out);
    let mut buf = [0;BLOCK];

    log::debug!("counting symbols");
    let mut hist = Histogram::new();
    loop {
        let n = reader.read_bytes(&mut buf)?;
        if n == 0 {
            break;
        }
        hist.add(&buf[0..n]);
    }
    let file_size = reader.bytes_read();
    let tree = build_tree(hist.counts())?;
    let table = build_codes(&tree);
    let header = Header {
        magic: MAGIC,
        permissions: opt.permissions,
        tree_size: tree_dump_size(hist.distinct()) as u16,
        file_size
    };
    header.write(&mut writer)?;

    let dump = dump_tree(&tree);
    if dump.len() != header.tree_size as usize {
        log::error!("tree dump has {} bytes, expected {}",dump.len(),header.tree_size);
        return Err(Box::new(Error::InvalidEncoding));
    }
    if writer.write_bytes(&dump)? < dump.len() {
        return Err(Box::new(std::io::Error::from(ErrorKind::WriteZero)));
    }

    log::debug!("encoding {} bytes",file_size);
    reader.get_mut().seek(SeekFrom::Start(opt.in_offset))?;
    let mut remaining = file_size;
    while remaining > 0 {
        let want = remaining.min(BLOCK as u64) as usize;
        let n = reader.read_bytes(&mut buf[0..want])?;
        if n < want {
            log::error!("input shrank during compression");
            return Err(Box::new(std::io::Error::from(ErrorKind::UnexpectedEof)));
        }
        for b in &buf[0..n] {
            let code = &table[*b as usize];
            if code.is_empty() {
                return Err(Box::new(Error::SymbolNotInTree(*b)));
            }
            log::trace!("{:02X} -> {}",b,code);
            writer.write_code(code)?;
        }
        remaining -= n as u64;
    }
    writer.flush()?;
    Ok((file_size,writer.bytes_written()))
}

/// Main decompression function.
/// `compressed_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.  Output that was written before an error is detected stays written.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    compressed_in.seek(SeekFrom::Start(opt.in_offset))?;
    expanded_out.seek(SeekFrom::Start(opt.out_offset))?;
    let mut reader = BitReader::new(compressed_in);
    let mut writer = BitWriter::new(expanded_out);

    let header = Header::read(&mut reader)?;
    log::debug!("header: tree size {}, file size {}",header.tree_size,header.file_size);
    let mut dump = vec![0;header.tree_size as usize];
    if reader.read_bytes(&mut dump)? < dump.len() {
        log::error!("tree dump is truncated");
        return Err(Box::new(Error::InvalidEncoding));
    }
    let tree = rebuild_tree(&dump)?;

    let mut walk = DecodeWalk::new(&tree);
    let mut obuf: Vec<u8> = Vec::with_capacity(BLOCK);
    let mut symbols: u64 = 0;
    while symbols < header.file_size {
        let bit = match reader.read_bit()? {
            Some(bit) => bit,
            None => {
                log::warn!("data ended after {} of {} symbols",symbols,header.file_size);
                break;
            }
        };
        if let Some(sym) = walk.step(bit)? {
            obuf.push(sym);
            symbols += 1;
            if obuf.len() == BLOCK {
                writer.write_bytes(&obuf)?;
                obuf.clear();
            }
        }
    }
    writer.write_bytes(&obuf)?;
    writer.flush()?;
    Ok((reader.bytes_read(),writer.bytes_written()))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

// *************** TESTS *****************

#[cfg(test)]
use crate::STD_OPTIONS;

#[test]
fn compression_works() {
    let test_data = "AAB".as_bytes();
    let huff_str = "0DD0EFBE A401 0B00 0300000000000000 4C414C424C004CFF494949 04";
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed,hex::decode(huff_str.replace(" ","")).unwrap());

    let huff_str = "0DD0EFBE A401 0500 0000000000000000 4C004CFF49";
    let compressed = compress_slice(&[],&STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed,hex::decode(huff_str.replace(" ","")).unwrap());
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);

    let cases: [Vec<u8>;5] = [vec![],vec![0x00],vec![0xff],vec![0x41;1000],vec![7,7]];
    for test_data in cases {
        let compressed = compress_slice(&test_data,&STD_OPTIONS).expect("compression failed");
        let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
        assert_eq!(test_data,expanded);
    }
}

#[test]
fn invertibility_multi_block() {
    // enough data to cycle both bit buffers several times
    let mut test_data = Vec::new();
    let mut state: u32 = 1;
    for _i in 0..50000 {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        let r = (state >> 16) as u8;
        // skew toward a few symbols but keep all 256 present
        test_data.push(if r < 192 { r % 8 } else { r });
    }
    for b in 0..=255u8 {
        test_data.push(b);
    }
    let compressed = compress_slice(&test_data,&STD_OPTIONS).expect("compression failed");
    assert!(compressed.len() < test_data.len());
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn header_layout() {
    let header = Header {
        magic: MAGIC,
        permissions: 0o755,
        tree_size: 767,
        file_size: 0x0102030405060708
    };
    let bytes = header.to_bytes();
    assert_eq!(bytes.to_vec(),hex::decode("0DD0EFBEED01FF020807060504030201").unwrap());
    assert_eq!(Header::from_bytes(&bytes).expect("parse failed"),header);

    let compressed = compress_slice(b"hello",&STD_OPTIONS).expect("compression failed");
    let header = read_header(&mut Cursor::new(&compressed),&STD_OPTIONS).expect("read failed");
    assert_eq!(header.file_size,5);
    assert_eq!(header.permissions,0o644);
    assert_eq!(header.tree_size,3*6-1);
}

#[test]
fn bad_magic() {
    let mut compressed = compress_slice(b"hello",&STD_OPTIONS).expect("compression failed");
    compressed[0] ^= 0xff;
    let err = expand_slice(&compressed,&STD_OPTIONS).expect_err("bad magic accepted");
    assert!(matches!(err.downcast_ref::<Error>(),Some(Error::FileFormatMismatch)));
    let err = expand_slice(&compressed[0..10],&STD_OPTIONS).expect_err("short header accepted");
    assert!(matches!(err.downcast_ref::<Error>(),Some(Error::FileFormatMismatch)));
}

#[test]
fn bad_tree() {
    let mut compressed = compress_slice(b"hello",&STD_OPTIONS).expect("compression failed");
    // turn the final interior marker into a leaf marker
    compressed[HEADER_SIZE + 3*6 - 2] = 0x4c;
    let err = expand_slice(&compressed,&STD_OPTIONS).expect_err("bad tree accepted");
    assert!(matches!(err.downcast_ref::<Error>(),Some(Error::InvalidEncoding)));
    let err = expand_slice(&compressed[0..HEADER_SIZE + 4],&STD_OPTIONS).expect_err("short tree accepted");
    assert!(matches!(err.downcast_ref::<Error>(),Some(Error::InvalidEncoding)));
}

#[test]
fn truncated_payload() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed[0..compressed.len()-4],&STD_OPTIONS).expect("expansion failed");
    assert!(expanded.len() < test_data.len());
    assert_eq!(test_data[0..expanded.len()],expanded);
}

#[test]
fn offsets() {
    let opt = Options {
        permissions: 0o600,
        in_offset: 4,
        out_offset: 2
    };
    let compressed = compress_slice(b"JUNKhello hello",&opt).expect("compression failed");
    assert_eq!(compressed[0..2],[0,0]);
    let opt = Options {
        permissions: 0,
        in_offset: 2,
        out_offset: 0
    };
    assert_eq!(read_header(&mut Cursor::new(&compressed),&opt).expect("read failed").permissions,0o600);
    let expanded = expand_slice(&compressed,&opt).expect("expansion failed");
    assert_eq!(expanded,b"hello hello");
}
