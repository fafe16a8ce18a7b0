pub const DEFAULT_REPORT_NAME: &str = "report.pdf";

/// Pulls the suggested filename out of a `content-disposition` header value,
/// e.g. `attachment; filename="report_12.pdf"`.
pub fn filename_from_content_disposition(header: Option<&str>) -> String {
    header
        .and_then(extract_filename)
        .unwrap_or_else(|| DEFAULT_REPORT_NAME.to_string())
}

fn extract_filename(header: &str) -> Option<String> {
    let value = filename_param(header)?;

    // Only the last path component is ever used as a local file name.
    let name = value
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

/// Value of the `filename` parameter. Quoted values may contain `;`.
fn filename_param(header: &str) -> Option<&str> {
    let mut rest = header;
    loop {
        let (_, after) = rest.split_once(';')?;
        let (key, value) = after.split_once('=')?;
        if let Some(end) = key.find(';') {
            // A bare token such as `inline;` has no value.
            rest = &after[end..];
            continue;
        }
        let value = value.trim_start();

        let (param, tail) = match value.strip_prefix('"') {
            Some(quoted) => match quoted.split_once('"') {
                Some((inner, tail)) => (inner, tail),
                None => (quoted, ""),
            },
            None => match value.split_once(';') {
                Some((plain, _)) => (plain.trim(), &value[plain.len()..]),
                None => (value.trim(), ""),
            },
        };

        if key.trim().eq_ignore_ascii_case("filename") {
            return Some(param);
        }
        rest = tail;
    }
}
