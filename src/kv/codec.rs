//! Fixed-width little/big-endian encode/decode helpers shared by every
//! table in `db/`. Per §4.C3, sort-key prefixes of duplicate-key values are
//! big-endian (so the store's native lexicographic comparator yields the
//! numeric ascending order the cursors promise); everything else is
//! little-endian, matching the persisted-state contract in §6.

use crate::error::{ErrorKind, LwsError, LwsResult};

pub fn push_u32_be(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn push_u64_be(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn push_u32_le(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn push_u64_le(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn push_bytes32(buf: &mut Vec<u8>, v: &[u8; 32]) {
    buf.extend_from_slice(v);
}

pub fn push_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

/// A cursor over an encoded record's bytes; every `read_*` advances past the
/// field it reads and fails with `InvariantViolation` if the buffer is too
/// short, which should only ever happen if a record was corrupted on disk.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> LwsResult<&'a [u8]> {
        if self.pos + n > self.buf.len() {
            return Err(LwsError::with_detail(
                ErrorKind::InvariantViolation,
                "truncated record",
            ));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> LwsResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32_be(&mut self) -> LwsResult<u32> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_u64_be(&mut self) -> LwsResult<u64> {
        Ok(u64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_u32_le(&mut self) -> LwsResult<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_u64_le(&mut self) -> LwsResult<u64> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_bytes32(&mut self) -> LwsResult<[u8; 32]> {
        Ok(self.take(32)?.try_into().unwrap())
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_mixed_endianness() {
        let mut buf = Vec::new();
        push_u64_be(&mut buf, 42);
        push_u32_le(&mut buf, 7);
        push_bytes32(&mut buf, &[9u8; 32]);

        let mut r = Reader::new(&buf);
        assert_eq!(r.read_u64_be().unwrap(), 42);
        assert_eq!(r.read_u32_le().unwrap(), 7);
        assert_eq!(r.read_bytes32().unwrap(), [9u8; 32]);
    }

    #[test]
    fn truncated_record_is_invariant_violation() {
        let buf = vec![0u8; 3];
        let mut r = Reader::new(&buf);
        let err = r.read_u64_be().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
    }
}
