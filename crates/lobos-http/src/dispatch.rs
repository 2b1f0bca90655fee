//! Request Dispatcher (`spec.md` §4.5): classifies an HTTP method plus a
//! normalized key/params pair into one operation.

use http::Method;

use crate::normalize::QueryParams;

/// One of the S3 operations this gateway understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    HeadBucket,
    HeadObject,
    ListObjects,
    BucketVersioning,
    BucketObjectLock,
    ListAllMyBuckets,
    GetObject,
    PutObject,
    DeleteObject,
}

/// Classify a request. Returns `None` for anything not in `spec.md` §4.5's
/// table; the caller responds 400 "unsupported req" in that case.
#[must_use]
pub fn classify(method: &Method, key: &str, params: &QueryParams) -> Option<Operation> {
    match *method {
        Method::HEAD => Some(if key.is_empty() { Operation::HeadBucket } else { Operation::HeadObject }),
        Method::GET if key.is_empty() => {
            if params.contains("list-type") {
                Some(Operation::ListObjects)
            } else if params.contains("versioning") {
                Some(Operation::BucketVersioning)
            } else if params.contains("object-lock") {
                Some(Operation::BucketObjectLock)
            } else if params.contains("max-buckets") || params.is_empty() {
                Some(Operation::ListAllMyBuckets)
            } else {
                None
            }
        }
        Method::GET => Some(Operation::GetObject),
        Method::PUT if !key.is_empty() => Some(Operation::PutObject),
        Method::DELETE if !key.is_empty() => Some(Operation::DeleteObject),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn params(query: &str) -> QueryParams {
        normalize(&format!("/b?{query}"), "b").unwrap().params
    }

    #[test]
    fn head_with_empty_key_is_head_bucket() {
        assert_eq!(classify(&Method::HEAD, "", &QueryParams::default()), Some(Operation::HeadBucket));
    }

    #[test]
    fn head_with_key_is_head_object() {
        assert_eq!(classify(&Method::HEAD, "a.txt", &QueryParams::default()), Some(Operation::HeadObject));
    }

    #[test]
    fn get_with_list_type_is_list_objects() {
        assert_eq!(classify(&Method::GET, "", &params("list-type=2")), Some(Operation::ListObjects));
    }

    #[test]
    fn get_with_no_params_is_list_all_my_buckets() {
        assert_eq!(classify(&Method::GET, "", &QueryParams::default()), Some(Operation::ListAllMyBuckets));
    }

    #[test]
    fn get_with_unrecognized_params_and_empty_key_is_unsupported() {
        assert_eq!(classify(&Method::GET, "", &params("foo=bar")), None);
    }

    #[test]
    fn get_with_key_is_get_object() {
        assert_eq!(classify(&Method::GET, "a.txt", &QueryParams::default()), Some(Operation::GetObject));
    }

    #[test]
    fn put_without_key_is_unsupported() {
        assert_eq!(classify(&Method::PUT, "", &QueryParams::default()), None);
    }

    #[test]
    fn delete_with_key_is_delete_object() {
        assert_eq!(classify(&Method::DELETE, "a.txt", &QueryParams::default()), Some(Operation::DeleteObject));
    }
}
