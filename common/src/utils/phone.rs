//! digit stripping and korean locale normalization for phone fields

/// Korean mobile prefixes that may follow the "82" country code.
pub const KOR_MOBILE_PREFIXES: [&str; 6] = ["10", "11", "16", "17", "18", "19"];

const KOR_COUNTRY_CODE: &str = "82";

/// Drop every character that is not an ASCII digit.
///
/// `"+82 10-1234-5678"` -> `"821012345678"`
pub fn only_digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Rewrite `82` + mobile prefix numbers to the local `0`-prefixed form.
///
/// Input is stripped to digits first, anything not carrying a recognized
/// mobile prefix after the country code passes through as digits.
pub fn normalize_kor(input: &str) -> String {
    let digits = only_digits(input);
    match digits.strip_prefix(KOR_COUNTRY_CODE) {
        Some(rest) if KOR_MOBILE_PREFIXES.iter().any(|p| rest.starts_with(p)) => {
            format!("0{}", rest)
        }
        _ => digits,
    }
}
