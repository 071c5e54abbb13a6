//! Generic record decoding.
//!
//! The envelope carries record metadata as opaque inner markup; the client
//! has no built-in knowledge of any metadata schema. Callers supply the
//! target shape through the [`FromMetadata`] capability trait, and a
//! collection of records through [`RecordContainer`]. This replaces the
//! runtime reflection a dynamic implementation would use: a target that is
//! not record-shaped simply cannot implement the trait, so that whole error
//! class is ruled out at compile time. What remains at runtime is markup
//! errors (the blob is not well-formed XML) and schema errors (the blob
//! lacks the structure the target requires).

use roxmltree::Document;

use crate::error::Result;
use crate::types::RawRecord;

/// A type that can be decoded from the root element of a metadata blob.
///
/// Implementations should return
/// [`HarvestError::MissingElement`](crate::HarvestError::MissingElement)
/// when the blob's structure does not match what the type requires, and
/// leave unmatched blob elements ignored, mirroring declarative
/// deserialization semantics.
pub trait FromMetadata: Sized {
    /// Decode from the parsed root element of one metadata blob.
    fn from_metadata(root: roxmltree::Node<'_, '_>) -> Result<Self>;
}

/// A caller-owned container for a batch of decoded records.
///
/// The conventional records collection of the dynamic implementation becomes
/// an associated item type plus a setter here.
pub trait RecordContainer {
    /// Element type each blob decodes into.
    type Item: FromMetadata + Default;

    /// Replace the container's records with the decoded batch.
    fn set_records(&mut self, records: Vec<Self::Item>);
}

/// Decode one record's metadata blob into a fresh target value.
///
/// The raw record is not mutated. Fails when the blob is not well-formed
/// markup or when the target reports the structure it needs is missing.
pub fn decode_record<T: FromMetadata>(record: &RawRecord) -> Result<T> {
    let doc = Document::parse(&record.metadata)?;
    T::from_metadata(doc.root_element())
}

/// Decode one record's metadata blob into a caller-owned target.
///
/// The target is only assigned on success, so on failure it keeps the value
/// it had (callers typically pass a default).
pub fn decode_record_into<T: FromMetadata>(record: &RawRecord, target: &mut T) -> Result<()> {
    *target = decode_record(record)?;
    Ok(())
}

/// Decode a batch of records into a caller-owned container.
///
/// Produces exactly one element per input record, in input order. A record
/// that fails to decode keeps its slot with the element type's default value
/// and contributes a warning naming its position and identifier; the batch
/// itself never aborts. Returns the warnings.
pub fn decode_records_into<C: RecordContainer>(
    records: &[RawRecord],
    container: &mut C,
) -> Vec<String> {
    let mut items: Vec<C::Item> = Vec::with_capacity(records.len());
    let mut warnings: Vec<String> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        match decode_record::<C::Item>(record) {
            Ok(item) => items.push(item),
            Err(e) => {
                warnings.push(format!(
                    "record {index} ({}): {e}",
                    record.header.identifier
                ));
                items.push(C::Item::default());
            }
        }
    }

    container.set_records(items);
    warnings
}
