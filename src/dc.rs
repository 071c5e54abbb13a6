//! Dublin Core decode target.
//!
//! The common `oai_dc` metadata format, provided as a ready-made target for
//! [`crate::decode`]. The core does not special-case it; it is one
//! implementation of [`FromMetadata`] among any the caller might write.

use serde::Serialize;

use crate::decode::{FromMetadata, RecordContainer};
use crate::error::{HarvestError, Result};
use crate::xml::{element_children, get_tag_name, get_text};

/// One Dublin Core record: the fifteen repeatable elements of the
/// `oai_dc:dc` container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DublinCoreRecord {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub titles: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub creators: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub publishers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coverages: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rights: Vec<String>,
}

impl FromMetadata for DublinCoreRecord {
    fn from_metadata(root: roxmltree::Node<'_, '_>) -> Result<Self> {
        if get_tag_name(root) != "dc" {
            return Err(HarvestError::MissingElement {
                element: "dc".to_string(),
                context: format!("Dublin Core metadata with root <{}>", get_tag_name(root)),
            });
        }

        let mut record = Self::default();
        for child in element_children(root) {
            let text = get_text(child);
            // Element order within the container is not significant; unknown
            // elements are ignored.
            match get_tag_name(child) {
                "title" => record.titles.push(text),
                "creator" => record.creators.push(text),
                "subject" => record.subjects.push(text),
                "description" => record.descriptions.push(text),
                "publisher" => record.publishers.push(text),
                "contributor" => record.contributors.push(text),
                "date" => record.dates.push(text),
                "type" => record.types.push(text),
                "format" => record.formats.push(text),
                "identifier" => record.identifiers.push(text),
                "source" => record.sources.push(text),
                "language" => record.languages.push(text),
                "relation" => record.relations.push(text),
                "coverage" => record.coverages.push(text),
                "rights" => record.rights.push(text),
                _ => {}
            }
        }

        Ok(record)
    }
}

/// A batch of Dublin Core records, usable as a ListRecords decode container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DublinCoreRecords {
    pub records: Vec<DublinCoreRecord>,
}

impl RecordContainer for DublinCoreRecords {
    type Item = DublinCoreRecord;

    fn set_records(&mut self, records: Vec<DublinCoreRecord>) {
        self.records = records;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_record;
    use crate::types::RawRecord;
    use pretty_assertions::assert_eq;

    const SAMPLE_DC: &str = r#"<oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:title>A Real Time Neurofuzzy Modelling and State Estimation Scheme</dc:title>
  <dc:creator>Wu, Z.Q.</dc:creator>
  <dc:creator>Harris, C.J.</dc:creator>
  <dc:description>The authors of this paper.</dc:description>
  <dc:publisher>ISO Press</dc:publisher>
  <dc:contributor>Morabito, F.C.</dc:contributor>
  <dc:date>1997</dc:date>
  <dc:type>Conference or Workshop Item</dc:type>
  <dc:type>NonPeerReviewed</dc:type>
  <dc:identifier>Wu, Z. Q. and Harris.</dc:identifier>
  <dc:subject>CS</dc:subject>
  <dc:format>PDF</dc:format>
  <dc:language>en</dc:language>
  <dc:rights>NA</dc:rights>
  <dc:coverage>x</dc:coverage>
  <dc:source>y</dc:source>
  <dc:relation>http://example.org/1/</dc:relation>
</oai_dc:dc>"#;

    fn raw(metadata: &str) -> RawRecord {
        RawRecord {
            metadata: metadata.to_string(),
            ..RawRecord::default()
        }
    }

    #[test]
    fn test_decode_full_record() {
        let record: DublinCoreRecord = decode_record(&raw(SAMPLE_DC)).expect("decode");

        assert_eq!(
            record.titles,
            vec!["A Real Time Neurofuzzy Modelling and State Estimation Scheme".to_string()]
        );
        assert_eq!(
            record.creators,
            vec!["Wu, Z.Q.".to_string(), "Harris, C.J.".to_string()]
        );
        assert_eq!(
            record.types,
            vec![
                "Conference or Workshop Item".to_string(),
                "NonPeerReviewed".to_string()
            ]
        );
        assert_eq!(record.languages, vec!["en".to_string()]);
        assert_eq!(record.relations, vec!["http://example.org/1/".to_string()]);
    }

    #[test]
    fn test_decode_minimal_record() {
        let record: DublinCoreRecord =
            decode_record(&raw("<dc><title>Only a title</title></dc>")).expect("decode");
        assert_eq!(record.titles, vec!["Only a title".to_string()]);
        assert!(record.creators.is_empty());
        assert!(record.rights.is_empty());
    }

    #[test]
    fn test_decode_rejects_non_dc_root() {
        let err = decode_record::<DublinCoreRecord>(&raw("<mods><title>x</title></mods>"))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::HarvestError::MissingElement { .. }
        ));
    }

    #[test]
    fn test_serialize_skips_empty_lists() {
        let record = DublinCoreRecord {
            titles: vec!["T".to_string()],
            ..DublinCoreRecord::default()
        };
        let json = serde_json::to_string(&record).expect("serialize");
        assert_eq!(json, r#"{"titles":["T"]}"#);
    }
}
