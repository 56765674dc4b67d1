//! Binary encoding of the whole index file

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{CHECKSUM_SIZE, HEADER_SIZE};
use crate::artifacts::objects::object::Packable;
use crate::errors::{FormatError, Result};
use bytes::Bytes;
use std::collections::BTreeMap;

/// Serialize `entries` into index file bytes
///
/// Entries are sorted by path first; when a path occurs more than once the
/// last entry supersedes the earlier ones. The trailing checksum covers the
/// header and every entry.
pub fn encode<'e>(entries: impl IntoIterator<Item = &'e IndexEntry>) -> Result<Bytes> {
    let entries = entries
        .into_iter()
        .map(|entry| (entry.path.as_bytes(), entry))
        .collect::<BTreeMap<_, _>>()
        .into_values()
        .collect::<Vec<_>>();

    let header = IndexHeader::with_entries(entries.len() as u32);
    let capacity = HEADER_SIZE
        + entries.iter().map(|entry| entry.encoded_len()).sum::<usize>()
        + CHECKSUM_SIZE;

    let mut buffer = Vec::with_capacity(capacity);
    buffer.extend_from_slice(&header.serialize()?);

    for entry in entries {
        if entry.is_path_length_clamped() {
            tracing::warn!(
                path_len = entry.path.len(),
                "path length field of {:?} clamped to 0xFFF",
                entry.basename()
            );
        }
        buffer.extend_from_slice(&entry.serialize()?);
    }

    Checksum::seal(&mut buffer);

    Ok(Bytes::from(buffer))
}

/// Parse index file bytes into entries, in file order
///
/// The trailing checksum is not checked here, see [`decode_verified`].
/// Entries must be in strictly ascending path order.
pub fn decode(data: &[u8]) -> Result<Vec<IndexEntry>> {
    let mut reader = Checksum::new(data);
    let header = IndexHeader::parse(&mut reader)?;

    // never trust the count for the allocation size
    let mut entries: Vec<IndexEntry> = Vec::with_capacity((header.entries_count as usize).min(1024));

    for _ in 0..header.entries_count {
        let entry = IndexEntry::parse(&mut reader)?;

        if let Some(previous) = entries.last()
            && previous.path.as_bytes() >= entry.path.as_bytes()
        {
            return Err(FormatError::Unsorted {
                previous: previous.path.clone(),
                current: entry.path,
            }
            .into());
        }

        entries.push(entry);
    }

    Ok(entries)
}

/// Check that the trailing 20 bytes are the SHA-1 of everything before them
pub fn verify(data: &[u8]) -> Result<()> {
    Checksum::verify(data)
}

/// Parse, then check the trailing checksum
pub fn decode_verified(data: &[u8]) -> Result<Vec<IndexEntry>> {
    // a foreign file should still be reported as such, not as a bad checksum
    let entries = decode(data)?;
    verify(data)?;

    Ok(entries)
}
