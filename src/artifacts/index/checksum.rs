use crate::artifacts::index::CHECKSUM_SIZE;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, FormatError, Result};
use byteorder::{ByteOrder, NetworkEndian};

/// Bounds-checked cursor over the raw bytes of an index file
///
/// Every read reports `FormatError::Truncated` with the failing offset
/// instead of panicking on short input.
#[derive(Debug)]
pub struct Checksum<'b> {
    data: &'b [u8],
    offset: usize,
}

impl<'b> Checksum<'b> {
    pub fn new(data: &'b [u8]) -> Self {
        Checksum { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> &'b [u8] {
        &self.data[self.offset..]
    }

    pub fn read(&mut self, size: usize) -> Result<&'b [u8]> {
        let available = self.data.len() - self.offset;
        if available < size {
            return Err(FormatError::Truncated {
                offset: self.offset,
                needed: size - available,
            }
            .into());
        }

        let chunk = &self.data[self.offset..self.offset + size];
        self.offset += size;
        Ok(chunk)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read(2)?;
        Ok(NetworkEndian::read_u16(bytes))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read(4)?;
        Ok(NetworkEndian::read_u32(bytes))
    }

    pub fn skip(&mut self, size: usize) -> Result<()> {
        self.read(size).map(|_| ())
    }

    /// Append the digest of everything written so far
    pub fn seal(buffer: &mut Vec<u8>) {
        let checksum = ObjectId::hash(buffer).to_raw();
        buffer.extend_from_slice(&checksum);
    }

    /// Check the trailing digest against the bytes preceding it
    pub fn verify(data: &[u8]) -> Result<()> {
        if data.len() < CHECKSUM_SIZE {
            return Err(FormatError::Truncated {
                offset: data.len(),
                needed: CHECKSUM_SIZE - data.len(),
            }
            .into());
        }

        let (content, stored) = data.split_at(data.len() - CHECKSUM_SIZE);
        let actual = ObjectId::hash(content);

        if actual.to_raw() != stored {
            let expected = stored.iter().map(|byte| format!("{byte:02x}")).collect();
            return Err(Error::Integrity {
                expected,
                actual: actual.to_string(),
            });
        }

        Ok(())
    }
}
