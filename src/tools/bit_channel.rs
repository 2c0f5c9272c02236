//! Buffered bit level I/O.
//!
//! Bits are packed LSB first: the first bit of a stream is bit 0 of the first byte.
//! Each channel counts the bytes that actually crossed it, which is what gets
//! reported as compression statistics.

use std::io::{Read,Write,ErrorKind};
use crate::BLOCK;
use super::code::Code;

pub struct BitReader<R: Read> {
    inner: R,
    buf: [u8;BLOCK],
    /// number of valid bytes in `buf`
    filled: usize,
    /// next bit to deliver
    ptr: usize,
    bytes_read: u64
}

pub struct BitWriter<W: Write> {
    inner: W,
    buf: [u8;BLOCK],
    /// next bit to fill
    ptr: usize,
    bytes_written: u64
}

impl <R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: [0;BLOCK],
            filled: 0,
            ptr: 0,
            bytes_read: 0
        }
    }
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
    /// Fill `buf` from the source, retrying short reads until `buf` is full or the
    /// source runs dry.  Returns the number of bytes obtained.
    pub fn read_bytes(&mut self,buf: &mut [u8]) -> Result<usize,std::io::Error> {
        let mut count = 0;
        while count < buf.len() {
            match self.inner.read(&mut buf[count..]) {
                Ok(0) => break,
                Ok(n) => count += n,
                Err(e) if e.kind()==ErrorKind::Interrupted => continue,
                Err(e) => return Err(e)
            }
        }
        self.bytes_read += count as u64;
        Ok(count)
    }
    /// Get the next bit, reading another block as needed, None when the source is drained.
    pub fn read_bit(&mut self) -> Result<Option<u8>,std::io::Error> {
        if self.ptr == self.filled * 8 {
            let mut block = [0;BLOCK];
            self.filled = self.read_bytes(&mut block)?;
            self.buf = block;
            self.ptr = 0;
            if self.filled == 0 {
                return Ok(None);
            }
        }
        let bit = (self.buf[self.ptr / 8] >> (self.ptr % 8)) & 1;
        self.ptr += 1;
        Ok(Some(bit))
    }
}

impl <W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buf: [0;BLOCK],
            ptr: 0,
            bytes_written: 0
        }
    }
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }
    /// Write all of `buf`, retrying short writes until done or the sink stalls.
    /// Returns the number of bytes written.
    pub fn write_bytes(&mut self,buf: &[u8]) -> Result<usize,std::io::Error> {
        let mut count = 0;
        while count < buf.len() {
            match self.inner.write(&buf[count..]) {
                Ok(0) => break,
                Ok(n) => count += n,
                Err(e) if e.kind()==ErrorKind::Interrupted => continue,
                Err(e) => return Err(e)
            }
        }
        self.bytes_written += count as u64;
        Ok(count)
    }
    /// write out the bit buffer, which must be byte aligned
    fn drain(&mut self) -> Result<(),std::io::Error> {
        let block = self.buf;
        let n = self.ptr / 8;
        if self.write_bytes(&block[0..n])? < n {
            return Err(std::io::Error::from(ErrorKind::WriteZero));
        }
        self.buf = [0;BLOCK];
        self.ptr = 0;
        Ok(())
    }
    /// Append the bits of `code`, the buffer is written out each time it fills up.
    pub fn write_code(&mut self,code: &Code) -> Result<(),std::io::Error> {
        for bit in code.iter() {
            if self.ptr == BLOCK * 8 {
                self.drain()?;
            }
            let msk = 1 << (self.ptr % 8);
            match bit {
                true => self.buf[self.ptr / 8] |= msk,
                false => self.buf[self.ptr / 8] &= !msk
            }
            self.ptr += 1;
        }
        Ok(())
    }
    /// Zero pad to the next byte boundary and write out everything that is buffered.
    pub fn flush(&mut self) -> Result<(),std::io::Error> {
        if self.ptr % 8 > 0 {
            let msk: u8 = (1 << (self.ptr % 8)) - 1;
            self.buf[self.ptr / 8] &= msk;
            self.ptr += 8 - self.ptr % 8;
        }
        self.drain()?;
        self.inner.flush()
    }
}

#[cfg(test)]
fn code_from_str(s: &str) -> Code {
    let mut code = Code::new();
    for c in s.chars() {
        code.push(c=='1');
    }
    code
}

#[test]
fn flush_pads_with_zeros() {
    let mut writer = BitWriter::new(Vec::new());
    writer.write_code(&code_from_str("1111111")).expect("write failed");
    writer.flush().expect("flush failed");
    assert_eq!(writer.bytes_written(),1);
    assert_eq!(writer.get_mut().as_slice(),&[0x7f]);
}

#[test]
fn codes_cross_byte_boundaries() {
    let mut writer = BitWriter::new(Vec::new());
    writer.write_code(&code_from_str("101")).expect("write failed");
    writer.write_code(&code_from_str("0011")).expect("write failed");
    writer.write_code(&code_from_str("11")).expect("write failed");
    writer.flush().expect("flush failed");
    // bits in stream order: 10100111 1
    assert_eq!(writer.get_mut().as_slice(),&[0b1110_0101,0b0000_0001]);
}

#[test]
fn full_buffer_is_written_mid_code() {
    let mut writer = BitWriter::new(Vec::new());
    let ones = code_from_str("11111111");
    for _i in 0..BLOCK {
        writer.write_code(&ones).expect("write failed");
    }
    assert_eq!(writer.bytes_written(),0);
    writer.write_code(&code_from_str("01")).expect("write failed");
    assert_eq!(writer.bytes_written(),BLOCK as u64);
    writer.flush().expect("flush failed");
    assert_eq!(writer.bytes_written(),BLOCK as u64 + 1);
    let out = writer.get_mut();
    assert!(out[0..BLOCK].iter().all(|b| *b==0xff));
    assert_eq!(out[BLOCK],0b10);
}

#[test]
fn bits_come_back_lsb_first() {
    let data: Vec<u8> = vec![0b0000_0110; BLOCK + 1];
    let mut reader = BitReader::new(data.as_slice());
    let mut bits = Vec::new();
    while let Some(bit) = reader.read_bit().expect("read failed") {
        bits.push(bit);
    }
    assert_eq!(bits.len(),8 * (BLOCK + 1));
    assert_eq!(bits[0..8],[0,1,1,0,0,0,0,0]);
    assert_eq!(bits[8*BLOCK..],[0,1,1,0,0,0,0,0]);
    assert_eq!(reader.bytes_read(),BLOCK as u64 + 1);
    assert_eq!(reader.read_bit().expect("read failed"),None);
}

/// source that hands out at most 3 bytes per call
#[cfg(test)]
struct Trickle<'a>(&'a [u8]);

#[cfg(test)]
impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = buf.len().min(3).min(self.0.len());
        buf[0..n].copy_from_slice(&self.0[0..n]);
        self.0 = &self.0[n..];
        Ok(n)
    }
}

#[test]
fn short_reads_are_retried() {
    let data = b"0123456789";
    let mut reader = BitReader::new(Trickle(data));
    let mut buf = [0;8];
    assert_eq!(reader.read_bytes(&mut buf).expect("read failed"),8);
    assert_eq!(&buf,b"01234567");
    assert_eq!(reader.read_bytes(&mut buf).expect("read failed"),2);
    assert_eq!(&buf[0..2],b"89");
    assert_eq!(reader.bytes_read(),10);
}
