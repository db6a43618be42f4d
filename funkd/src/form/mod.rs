//! Request payload decoding into a [`FieldMap`].
//!
//! - GET: query string pairs, values kept exactly as sent (no percent-decoding).
//! - POST `application/x-www-form-urlencoded`: body pairs, values percent-decoded.
//! - POST anything else: multipart, file parts written through an [`UploadStore`].

use std::path::Path;

use funk_api::{DecodeResult, FieldMap, Method};

use crate::store::UploadStore;

pub mod multipart;
pub mod urlencoded;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Decode the payload of one request.
///
/// `Ok(None)` means there was nothing to decode: an empty POST body, or a
/// method other than GET/POST.
pub fn decode(
    method: &Method,
    path: &str,
    content_type: Option<&str>,
    body: &[u8],
    upload_dir: &Path,
    uploads: &dyn UploadStore,
) -> DecodeResult<Option<FieldMap>> {
    match method {
        Method::Get => Ok(Some(urlencoded::decode_query(path))),
        Method::Post if is_urlencoded(content_type) => Ok(urlencoded::decode_body(body)),
        Method::Post => multipart::decode(content_type.unwrap_or(""), body, upload_dir, uploads),
        Method::Other(_) => Ok(None),
    }
}

fn is_urlencoded(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|media| media.trim().eq_ignore_ascii_case(FORM_URLENCODED))
        .unwrap_or(false)
}
