//! `multipart/form-data` decoding.
//!
//! Parts are delimited by `--boundary` at the start of a line, so boundary-like
//! text inside file content only ends a part when it sits right after a CRLF.

use std::path::Path;

use funk_api::{DecodeError, DecodeResult, FieldMap, FieldValue};
use memchr::memmem::Finder;

use crate::store::UploadStore;

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekBoundary,
    ParseHeaders,
    CaptureBody,
    Done,
}

/// Header block of a single part.
#[derive(Debug, Default, PartialEq, Eq)]
struct PartHead {
    disposition: bool,
    name: Option<String>,
    filename: Option<String>,
    content_type: Option<String>,
}

/// The `boundary` parameter of a multipart content type, quotes removed.
pub fn boundary(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (k, v) = param.split_once('=')?;
        if !k.trim().eq_ignore_ascii_case("boundary") {
            return None;
        }
        let v = v.trim().trim_matches('"');
        (!v.is_empty()).then_some(v)
    })
}

/// Last path segment of a client-supplied filename, either separator style.
/// `None` when nothing usable is left (empty, `.` or `..`).
pub fn sanitize_filename(raw: &str) -> Option<&str> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    match name {
        "" | "." | ".." => None,
        n => Some(n),
    }
}

/// Decode a multipart body. File parts are written to `upload_dir` under their
/// sanitized filename and mapped to the stored path; a failed write drops that
/// field only. Returns `Ok(None)` for an empty body.
pub fn decode(
    content_type: &str,
    body: &[u8],
    upload_dir: &Path,
    uploads: &dyn UploadStore,
) -> DecodeResult<Option<FieldMap>> {
    if body.is_empty() {
        return Ok(None);
    }
    let boundary = boundary(content_type).ok_or(DecodeError::MissingBoundary)?;
    let delimiter = [b"--".as_slice(), boundary.as_bytes()].concat();
    let line_delimiter = [CRLF, delimiter.as_slice()].concat();
    let next_part = Finder::new(&line_delimiter);
    let head_end = Finder::new(b"\r\n\r\n");

    let mut fields = FieldMap::new();
    let mut state = State::SeekBoundary;
    let mut cursor = 0usize;
    let mut head = PartHead::default();

    while state != State::Done {
        state = match state {
            State::SeekBoundary => {
                let start = if body.starts_with(&delimiter) {
                    0
                } else {
                    next_part
                        .find(body)
                        .map(|pos| pos + CRLF.len())
                        .ok_or(DecodeError::NoOpeningBoundary)?
                };
                after_delimiter(body, start + delimiter.len(), &mut cursor)?
            }
            State::ParseHeaders => {
                let rest = &body[cursor..];
                if rest.starts_with(CRLF) {
                    head = PartHead::default();
                    cursor += CRLF.len();
                } else {
                    let end = head_end
                        .find(rest)
                        .ok_or(DecodeError::Truncated("part headers not terminated"))?;
                    head = parse_head(&String::from_utf8_lossy(&rest[..end]));
                    cursor += end + 4;
                }
                State::CaptureBody
            }
            State::CaptureBody => {
                let rest = &body[cursor..];
                let end = next_part
                    .find(rest)
                    .ok_or(DecodeError::Truncated("missing closing boundary"))?;
                let content = &rest[..end];
                store_part(std::mem::take(&mut head), content, upload_dir, uploads, &mut fields)?;
                after_delimiter(body, cursor + end + line_delimiter.len(), &mut cursor)?
            }
            State::Done => State::Done,
        };
    }

    Ok(Some(fields))
}

/// Inspect what follows a delimiter at `pos`: `--` closes the body (epilogue
/// ignored), otherwise optional padding and a CRLF open the next part.
fn after_delimiter(body: &[u8], pos: usize, cursor: &mut usize) -> DecodeResult<State> {
    let rest = &body[pos..];
    if rest.starts_with(b"--") {
        return Ok(State::Done);
    }
    let padding = rest.iter().take_while(|b| **b == b' ' || **b == b'\t').count();
    if rest[padding..].starts_with(CRLF) {
        *cursor = pos + padding + CRLF.len();
        Ok(State::ParseHeaders)
    } else {
        Err(DecodeError::Truncated("delimiter not followed by CRLF"))
    }
}

fn store_part(
    head: PartHead,
    content: &[u8],
    upload_dir: &Path,
    uploads: &dyn UploadStore,
    fields: &mut FieldMap,
) -> DecodeResult<()> {
    if !head.disposition {
        tracing::trace!("multipart part without content-disposition ignored");
        return Ok(());
    }
    let name = head.name.ok_or(DecodeError::MissingFieldName)?;
    if fields.contains(&name) {
        // first occurrence wins; never overwrite an earlier upload
        return Ok(());
    }
    let Some(raw_filename) = head.filename else {
        fields.insert_if_absent(name, FieldValue::Text(String::from_utf8_lossy(content).into_owned()));
        return Ok(());
    };
    let Some(filename) = sanitize_filename(&raw_filename) else {
        tracing::warn!(field = %name, filename = %raw_filename, "upload skipped: unusable filename");
        return Ok(());
    };
    match uploads.store(upload_dir, filename, content) {
        Ok(stored) => {
            tracing::debug!(
                field = %name,
                path = %stored.display(),
                bytes = content.len(),
                content_type = head.content_type.as_deref().unwrap_or("-"),
                "upload stored"
            );
            fields.insert_if_absent(name, FieldValue::File(stored));
        }
        Err(e) => {
            tracing::warn!(field = %name, dir = %upload_dir.display(), "upload skipped: {e}");
        }
    }
    Ok(())
}

fn parse_head(block: &str) -> PartHead {
    let mut head = PartHead::default();
    for line in block.split("\r\n") {
        let Some((k, v)) = line.split_once(':') else { continue };
        match k.trim().to_ascii_lowercase().as_str() {
            "content-disposition" => {
                head.disposition = true;
                for (pk, pv) in disposition_params(v) {
                    match pk.to_ascii_lowercase().as_str() {
                        "name" => head.name = Some(pv),
                        "filename" => head.filename = Some(pv),
                        _ => {}
                    }
                }
            }
            "content-type" => head.content_type = Some(v.trim().to_string()),
            _ => {}
        }
    }
    head
}

/// `key=value` parameters of a disposition value, skipping the leading
/// disposition type. Quoted values may contain `;` and `\"`; any other
/// backslash is kept as is, since clients send raw Windows paths.
fn disposition_params(value: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if quoted && chars.peek() == Some(&'"') => {
                current.push('\\');
                current.push('"');
                chars.next();
            }
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            ';' if !quoted => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);

    for seg in segments.iter().skip(1) {
        let Some((k, v)) = seg.split_once('=') else { continue };
        let v = v.trim();
        let v = v.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(v);
        params.push((k.trim().to_string(), v.replace("\\\"", "\"")));
    }
    params
}
