const CANONICAL_QUOTE: char = '"';

fn is_smart_quote(c: char) -> bool {
    matches!(
        c,
        '\u{2018}' // ‘
            | '\u{2019}' // ’
            | '\u{201A}' // ‚
            | '\u{201B}' // ‛
            | '\u{201C}' // “
            | '\u{201D}' // ”
            | '\u{201E}' // „
            | '\u{201F}' // ‟
    )
}

fn is_space(c: char) -> bool {
    // BOM is not `White_Space` but OCR output and copied text carry it
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Canonical form of recognized or stored question text: no whitespace at
/// all, every curly quote turned into `"`. Idempotent.
pub fn normalize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !is_space(*c))
        .map(|c| if is_smart_quote(c) { CANONICAL_QUOTE } else { c })
        .collect();

    cleaned.trim().to_string()
}
