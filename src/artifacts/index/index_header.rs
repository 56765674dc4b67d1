use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::Packable;
use crate::errors::{FormatError, Result};
use byteorder::{NetworkEndian, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub(crate) version: u32,
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    pub(crate) fn with_entries(entries_count: u32) -> Self {
        IndexHeader {
            version: VERSION,
            entries_count,
        }
    }

    /// Read and validate the 12-byte header
    ///
    /// A wrong signature is reported as `NotAnIndex` before anything else is
    /// looked at.
    pub(crate) fn parse(reader: &mut Checksum) -> Result<Self> {
        let signature_len = SIGNATURE.len().min(reader.remaining().len());
        let signature = &reader.remaining()[..signature_len];
        if signature != SIGNATURE.as_bytes() {
            return Err(FormatError::NotAnIndex {
                found: signature.to_vec(),
            }
            .into());
        }

        reader.skip(SIGNATURE.len())?;
        let version = reader.read_u32()?;
        let entries_count = reader.read_u32()?;

        if version != VERSION {
            return Err(FormatError::UnsupportedVersion(version).into());
        }

        Ok(IndexHeader {
            version,
            entries_count,
        })
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(SIGNATURE.as_bytes());
        // writes into a Vec cannot fail
        let _ = bytes.write_u32::<NetworkEndian>(self.version);
        let _ = bytes.write_u32::<NetworkEndian>(self.entries_count);

        Ok(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_layout_is_signature_version_count() {
        let bytes = IndexHeader::with_entries(3).serialize().unwrap();

        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[..], b"DIRC\0\0\0\x02\0\0\0\x03");
    }

    #[test]
    fn header_parses_back() {
        let bytes = IndexHeader::with_entries(42).serialize().unwrap();
        let mut reader = Checksum::new(&bytes);

        assert_eq!(
            IndexHeader::parse(&mut reader).unwrap(),
            IndexHeader::new(VERSION, 42)
        );
        assert_eq!(reader.offset(), HEADER_SIZE);
    }

    #[test]
    fn short_buffer_with_wrong_signature_is_not_an_index() {
        let mut reader = Checksum::new(b"DI");

        assert!(matches!(
            IndexHeader::parse(&mut reader),
            Err(Error::Format(FormatError::NotAnIndex { .. }))
        ));
    }

    #[test]
    fn other_versions_are_rejected() {
        let mut reader = Checksum::new(b"DIRC\0\0\0\x04\0\0\0\0");

        assert!(matches!(
            IndexHeader::parse(&mut reader),
            Err(Error::Format(FormatError::UnsupportedVersion(4)))
        ));
    }
}
