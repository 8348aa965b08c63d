//! Jurisdiction codes.

/// Code of the nationwide aggregate.
pub const NATIONWIDE: &str = "US";

/// Width of numeric codes.
pub const CODE_WIDTH: usize = 2;

/// Normalizes a location code so that codes match across files.
///
/// `1`, `"1"` and `"1.0"` become `"01"`; `us` in any case becomes `"US"`;
/// any other token is passed through trimmed.
pub fn normalize_location(code: &str) -> String
{
    let s = code.trim();
    let s = s.strip_suffix(".0").unwrap_or(s);

    if s.eq_ignore_ascii_case(NATIONWIDE) {
        NATIONWIDE.to_string()
    }
    else if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        format!("{:0>width$}", s, width = CODE_WIDTH)
    }
    else {
        s.to_string()
    }
}

/// Left-pads a location code with zeros to the fixed width.
pub fn pad_location(code: &str) -> String
{
    format!("{:0>width$}", code.trim(), width = CODE_WIDTH)
}

//

#[test]
fn test_normalize_location()
{
    assert_eq!(normalize_location("6"), "06");
    assert_eq!(normalize_location(" 6 "), "06");
    assert_eq!(normalize_location("6.0"), "06");
    assert_eq!(normalize_location("06"), "06");
    assert_eq!(normalize_location("72"), "72");
    assert_eq!(normalize_location("us"), "US");
    assert_eq!(normalize_location("US"), "US");
    assert_eq!(normalize_location(" PR-X "), "PR-X");

    assert_eq!(pad_location("6"), "06");
    assert_eq!(pad_location("US"), "US");
    assert_eq!(pad_location("123"), "123");
}
