/// Minimal multipart/form-data reader: enough for one file input plus a few
/// text fields.

/// One part of a multipart body.
#[derive(Debug, PartialEq)]
pub struct Part<'a> {
    pub name: Option<String>,
    /// Present only for file inputs.
    pub filename: Option<String>,
    pub data: &'a [u8],
}

/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
pub fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.starts_with("boundary="))
        .map(|s| s["boundary=".len()..].trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
}

/// Parses every part that has a header block.
pub fn parts<'a>(body: &'a [u8], boundary: &str) -> Vec<Part<'a>> {
    let delimiter = format!("--{}", boundary);
    let sep = b"\r\n\r\n";

    split_on(body, delimiter.as_bytes())
        .into_iter()
        .filter_map(|part| {
            let sep_pos = find_subsequence(part, sep)?;
            let headers = String::from_utf8_lossy(&part[..sep_pos]);
            let raw = &part[sep_pos + sep.len()..];
            Some(Part {
                name:     disposition_param(&headers, "name"),
                filename: disposition_param(&headers, "filename"),
                data:     raw.strip_suffix(b"\r\n").unwrap_or(raw),
            })
        })
        .collect()
}

/// The file part for input `field_name`, falling back to the first file part.
pub fn file_part<'a>(body: &'a [u8], boundary: &str, field_name: &str) -> Option<Part<'a>> {
    let mut files: Vec<Part<'a>> = parts(body, boundary).into_iter().filter(|p| p.filename.is_some()).collect();
    let pos = files.iter().position(|p| p.name.as_deref() == Some(field_name)).unwrap_or(0);
    if files.is_empty() { None } else { Some(files.swap_remove(pos)) }
}

/// Parses `key="value"` out of a Content-Disposition header block. `name`
/// must not match inside `filename`.
fn disposition_param(headers: &str, key: &str) -> Option<String> {
    let needle = format!("{}=\"", key);
    let mut search = headers;
    while let Some(pos) = search.find(&needle) {
        let preceded_ok = pos == 0 || matches!(search.as_bytes()[pos - 1], b' ' | b';' | b'\t');
        let rest = &search[pos + needle.len()..];
        if preceded_ok {
            let end = rest.find('"')?;
            return Some(rest[..end].to_owned());
        }
        search = rest;
    }
    None
}
