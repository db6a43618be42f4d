use funk_api::{FieldMap, FieldValue};

/// Pairs from the query component of `path`. Only applies when there is a
/// query with at least one `=`; otherwise the map is empty.
///
/// Values are returned as sent. Consumers relying on raw query values (e.g.
/// `%2F` kept intact) depend on this, so it stays asymmetric with
/// [`decode_body`].
pub fn decode_query(path: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    let Some((_, query)) = path.split_once('?') else { return fields };
    if !query.contains('=') {
        return fields;
    }
    collect_pairs(query, &mut fields, str::to_string);
    fields
}

/// Pairs from an `application/x-www-form-urlencoded` body; `None` for an empty body.
pub fn decode_body(body: &[u8]) -> Option<FieldMap> {
    if body.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(body);
    let mut fields = FieldMap::new();
    collect_pairs(text.trim_end_matches(['\r', '\n']), &mut fields, percent_decode);
    Some(fields)
}

pub fn percent_decode(s: &str) -> String {
    let spaced = s.replace('+', " ");
    percent_encoding::percent_decode_str(&spaced).decode_utf8_lossy().to_string()
}

fn collect_pairs(input: &str, fields: &mut FieldMap, value: impl Fn(&str) -> String) {
    for pair in input.split('&') {
        // split on the first '=' only; segments without one carry no field
        let Some((k, v)) = pair.split_once('=') else { continue };
        if k.is_empty() {
            continue;
        }
        fields.insert_if_absent(k, FieldValue::Text(value(v)));
    }
}
