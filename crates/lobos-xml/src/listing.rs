//! `ListBucketResult` response body for `GET /{b}?list-type=2`.

use std::io::Cursor;

use quick_xml::Writer;

use crate::write_text_element;

/// An object entry in a listing response.
#[derive(Debug, Clone)]
pub struct Contents {
    pub key: String,
    /// Decimal Unix timestamp, matching the source behavior for listings
    /// (see `DESIGN NOTES` on `Last-Modified` formatting inconsistency).
    pub last_modified: u64,
    pub size: u64,
}

/// A "subdirectory" entry in a listing response.
#[derive(Debug, Clone)]
pub struct CommonPrefix {
    pub prefix: String,
}

/// One emitted entry, in the order the listing engine produced it.
#[derive(Debug, Clone)]
pub enum Entry {
    Contents(Contents),
    CommonPrefix(CommonPrefix),
}

/// The full `ListBucketResult` document. Pagination is not implemented:
/// `MaxKeys` is always 1000, `IsTruncated` is always `false`, `Marker` is
/// always empty.
#[derive(Debug, Clone, Default)]
pub struct ListBucketResult {
    pub name: String,
    pub prefix: String,
    pub entries: Vec<Entry>,
}

const MAX_KEYS: u32 = 1000;

impl ListBucketResult {
    #[must_use]
    pub fn to_xml(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(br#"<?xml version="1.0" encoding="UTF-8"?>"#);

        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .create_element("ListBucketResult")
            .with_attribute(("xmlns", "http://s3.amazonaws.com/doc/2006-03-01/"))
            .write_inner_content::<_, std::io::Error>(|w| {
                write_text_element(w, "Name", &self.name);
                write_text_element(w, "Prefix", &self.prefix);
                write_text_element(w, "MaxKeys", &MAX_KEYS.to_string());
                write_text_element(w, "IsTruncated", "false");
                for entry in &self.entries {
                    match entry {
                        Entry::CommonPrefix(cp) => {
                            w.create_element("CommonPrefixes")
                                .write_inner_content::<_, std::io::Error>(|w| {
                                    write_text_element(w, "Prefix", &cp.prefix);
                                    Ok(())
                                })?;
                        }
                        Entry::Contents(c) => {
                            w.create_element("Contents")
                                .write_inner_content::<_, std::io::Error>(|w| {
                                    write_text_element(w, "Key", &c.key);
                                    write_text_element(w, "LastModified", &c.last_modified.to_string());
                                    write_text_element(w, "Size", &c.size.to_string());
                                    Ok(())
                                })?;
                        }
                    }
                }
                write_text_element(w, "Marker", "");
                Ok(())
            })
            .expect("writing to an in-memory buffer cannot fail");

        out.extend_from_slice(&writer.into_inner().into_inner());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_listing_has_fixed_header_fields_and_empty_marker() {
        let result = ListBucketResult { name: "b".into(), prefix: String::new(), entries: vec![] };
        let xml = String::from_utf8(result.to_xml()).unwrap();
        assert!(xml.contains("<Name>b</Name>"));
        assert!(xml.contains("<MaxKeys>1000</MaxKeys>"));
        assert!(xml.contains("<IsTruncated>false</IsTruncated>"));
        assert!(xml.ends_with("<Marker></Marker></ListBucketResult>"));
    }

    #[test]
    fn contents_and_common_prefixes_serialize_in_given_order() {
        let result = ListBucketResult {
            name: "b".into(),
            prefix: String::new(),
            entries: vec![
                Entry::Contents(Contents { key: "a.txt".into(), last_modified: 42, size: 3 }),
                Entry::CommonPrefix(CommonPrefix { prefix: "d1/".into() }),
            ],
        };
        let xml = String::from_utf8(result.to_xml()).unwrap();
        let contents_pos = xml.find("<Contents>").unwrap();
        let prefix_pos = xml.find("<CommonPrefixes>").unwrap();
        assert!(contents_pos < prefix_pos);
        assert!(xml.contains("<Key>a.txt</Key><LastModified>42</LastModified><Size>3</Size>"));
        assert!(xml.contains("<Prefix>d1/</Prefix>"));
    }
}
