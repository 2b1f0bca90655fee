//! The bit-exact `Error` XML body used for every 404 response.

use std::io::Cursor;

use quick_xml::Writer;

use crate::write_text_element;

/// Build `<Error><Code>.../Resource>.../RequestId>...</Error>` for a 404
/// response. `request_id` is a placeholder string, not a generated
/// identifier — this gateway has no request-tracing infrastructure.
#[must_use]
pub fn error_xml(code: &str, message: &str, resource: &str, request_id: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(br#"<?xml version="1.0" encoding="UTF-8"?>"#);

    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer
        .create_element("Error")
        .write_inner_content::<_, std::io::Error>(|w| {
            write_text_element(w, "Code", code);
            write_text_element(w, "Message", message);
            write_text_element(w, "Resource", resource);
            write_text_element(w, "RequestId", request_id);
            Ok(())
        })
        .expect("writing to an in-memory buffer cannot fail");

    out.extend_from_slice(&writer.into_inner().into_inner());
    out
}

/// `NoSuchKey` error for a missing object.
#[must_use]
pub fn no_such_key_xml(resource: &str) -> Vec<u8> {
    error_xml("NoSuchKey", "The resource you requested does not exist", resource, "DEADBEEF")
}

/// `NoSuchBucket` error. Not currently reachable (this gateway serves a
/// single always-present bucket) but kept for completeness of the error
/// taxonomy and to match the wire format documented for it.
#[must_use]
pub fn no_such_bucket_xml(resource: &str) -> Vec<u8> {
    error_xml("NoSuchBucket", "The specified bucket does not exist", resource, "not available")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_such_key_xml_is_bit_exact() {
        let xml = String::from_utf8(no_such_key_xml("foo/bar")).unwrap();
        assert_eq!(
            xml,
            r#"<?xml version="1.0" encoding="UTF-8"?><Error><Code>NoSuchKey</Code><Message>The resource you requested does not exist</Message><Resource>foo/bar</Resource><RequestId>DEADBEEF</RequestId></Error>"#
        );
    }

    #[test]
    fn no_such_bucket_xml_is_bit_exact() {
        let xml = String::from_utf8(no_such_bucket_xml("mybucket")).unwrap();
        assert_eq!(
            xml,
            r#"<?xml version="1.0" encoding="UTF-8"?><Error><Code>NoSuchBucket</Code><Message>The specified bucket does not exist</Message><Resource>mybucket</Resource><RequestId>not available</RequestId></Error>"#
        );
    }
}
