//! S3-flavored XML response bodies for the lobos gateway, and the fixed
//! extension → MIME type table used by `HeadObject`/`GetObject`/listing.
//!
//! Bodies are built with `quick-xml`'s `Writer`, the same XML idiom used
//! elsewhere for hand-rolled (non-derive) S3 XML serialization, rather than
//! the raw string concatenation of the system this was ported from. The
//! emitted structure is bit-exact with that system's output for well-formed
//! keys; unlike it, special characters in keys/prefixes are escaped instead
//! of corrupting the document.

pub mod error;
pub mod listing;
pub mod mime;

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesText, Event};

pub use error::error_xml;
pub use listing::{CommonPrefix, Contents, ListBucketResult};
pub use mime::mime_type;

/// Write a single `<tag>escaped-text</tag>` element.
pub(crate) fn write_text_element(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))
        .expect("writing to an in-memory buffer cannot fail");
}

/// `VersioningConfiguration` for `GET /{b}?versioning`. This bucket never
/// has versioning enabled, so the response is always the same.
#[must_use]
pub fn versioning_configuration_xml() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(br#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer
        .create_element("VersioningConfiguration")
        .write_inner_content::<_, std::io::Error>(|w| {
            write_text_element(w, "Status", "Suspended");
            write_text_element(w, "MfaDelete", "Disabled");
            Ok(())
        })
        .expect("writing to an in-memory buffer cannot fail");
    out.extend_from_slice(&writer.into_inner().into_inner());
    out
}

/// Empty `ObjectLockConfiguration` for `GET /{b}?object-lock`. Object lock is
/// never configured on this bucket.
#[must_use]
pub fn object_lock_configuration_xml() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(br#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.extend_from_slice(b"<ObjectLockConfiguration></ObjectLockConfiguration>");
    out
}

/// `ListAllMyBucketsResult` describing the single bucket this gateway
/// exposes. Note: unlike the other response bodies this one is emitted
/// without an XML declaration, matching observed behavior.
#[must_use]
pub fn list_all_my_buckets_result_xml(bucket_name: &str) -> Vec<u8> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer
        .create_element("ListAllMyBucketsResult")
        .write_inner_content::<_, std::io::Error>(|w| {
            w.create_element("Buckets")
                .write_inner_content::<_, std::io::Error>(|w| {
                    w.create_element("Bucket")
                        .write_inner_content::<_, std::io::Error>(|w| {
                            write_text_element(w, "BucketRegion", "lobos");
                            write_text_element(w, "CreationDate", "1970-01-01T00:00:00+00:00");
                            write_text_element(w, "Name", bucket_name);
                            Ok(())
                        })?;
                    Ok(())
                })?;
            w.create_element("Owner")
                .write_inner_content::<_, std::io::Error>(|w| {
                    write_text_element(w, "ID", "lobos");
                    Ok(())
                })?;
            Ok(())
        })
        .expect("writing to an in-memory buffer cannot fail");
    writer.write_event(Event::Eof).ok();
    writer.into_inner().into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versioning_configuration_contains_suspended_status() {
        let xml = String::from_utf8(versioning_configuration_xml()).unwrap();
        assert!(xml.contains("<Status>Suspended</Status>"));
        assert!(xml.contains("<MfaDelete>Disabled</MfaDelete>"));
    }

    #[test]
    fn object_lock_configuration_is_empty_element() {
        let xml = String::from_utf8(object_lock_configuration_xml()).unwrap();
        assert_eq!(xml, r#"<?xml version="1.0" encoding="UTF-8"?><ObjectLockConfiguration></ObjectLockConfiguration>"#);
    }

    #[test]
    fn list_all_my_buckets_result_has_no_xml_declaration() {
        let xml = String::from_utf8(list_all_my_buckets_result_xml("mybucket")).unwrap();
        assert!(!xml.starts_with("<?xml"));
        assert!(xml.contains("<Name>mybucket</Name>"));
        assert!(xml.contains("<BucketRegion>lobos</BucketRegion>"));
    }
}
