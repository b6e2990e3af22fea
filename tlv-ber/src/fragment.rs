//! Fragment indexing for one structural level

use crate::reader::TlvReader;
use std::collections::HashMap;
use tlv_core::{Tag, TlvResult};

/// Value fragments of one region, grouped by tag
///
/// Built by consuming a whole region into TLV records. Each tag maps to the
/// value slices of every record carrying it, in encounter order, so repeated
/// occurrences of a tag (collection elements) stay in wire order.
#[derive(Debug, Default, Clone)]
pub struct FragmentMap<'a> {
    groups: HashMap<Tag, Vec<&'a [u8]>>,
    order: Vec<Tag>,
    records: usize,
}

impl<'a> FragmentMap<'a> {
    /// Index `region` into fragments
    ///
    /// An empty region yields an empty map.
    ///
    /// # Errors
    /// Propagates any malformed tag or length and any truncated value; the
    /// region must consist of whole TLV records only.
    pub fn index(region: &'a [u8]) -> TlvResult<Self> {
        let mut map = Self::default();
        for record in TlvReader::new(region) {
            let record = record?;
            map.push(record.tag, record.value);
        }
        log::trace!(
            "indexed {} bytes into {} records under {} tags",
            region.len(),
            map.records,
            map.order.len()
        );
        Ok(map)
    }

    fn push(&mut self, tag: Tag, value: &'a [u8]) {
        let group = self.groups.entry(tag).or_insert_with(|| {
            self.order.push(tag);
            Vec::new()
        });
        group.push(value);
        self.records += 1;
    }

    /// Fragments recorded under `tag`, in encounter order
    ///
    /// Returns an empty slice when the tag never occurred.
    pub fn get(&self, tag: Tag) -> &[&'a [u8]] {
        self.groups.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct tags in order of first occurrence
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.order.iter().copied()
    }

    /// Total number of records indexed
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Number of distinct tags
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the region held no records
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }
}
