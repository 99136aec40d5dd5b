/// Parses bank-export amounts such as `-1 234,50`, `-1234.50` or `1,234.50`.
///
/// A lone comma is read as the decimal separator. When both separators are
/// present the last one is the decimal separator.
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    let compact = raw
        .trim()
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '\u{a0}')
        .collect::<String>();
    if compact.is_empty() {
        return None;
    }

    let normalized = match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (Some(_), None) => compact.replace(',', "."),
        _ => compact,
    };
    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}
