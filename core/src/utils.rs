//! Utility functions and types.

use std::fmt::Debug;

use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

/// Characters kept verbatim in a resource path: unreserved characters and `/`.
pub static PATH_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Characters kept verbatim in a query parameter: unreserved characters only.
pub static QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent encode a resource path, keeping `/` as separator.
///
/// A backslash is encoded as `%5C`, which path normalization turns back into `/`.
pub fn percent_encode_path(path: &str) -> String {
    utf8_percent_encode(path, &PATH_ENCODE_SET).to_string()
}

/// Percent encode a query key or value.
pub fn percent_encode_query(value: &str) -> String {
    utf8_percent_encode(value, &QUERY_ENCODE_SET).to_string()
}

/// Redacts a string by replacing all but the first and last three characters with asterisks.
///
/// - If the input string has fewer than 12 characters, it should be entirely redacted.
/// - If the input string has 12 or more characters, only the first three and the last three.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Redact(value.as_deref().unwrap_or_default())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let length = self.0.len();
        if length == 0 {
            f.write_str("EMPTY")
        } else if length < 12 {
            f.write_str("***")
        } else {
            f.write_str(&self.0[..3])?;
            f.write_str("***")?;
            f.write_str(&self.0[length - 3..])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Short", "***"; "short")]
    #[test_case("Hello World!", "Hel***ld!"; "exactly twelve")]
    #[test_case("AKLTmxRWw1cBQ6aBUw8fDeYc", "AKL***eYc"; "access key")]
    #[test_case("", "EMPTY"; "empty")]
    fn test_redact(input: &str, expected: &str) {
        assert_eq!(format!("{:?}", Redact(input)), expected);
    }

    #[test_case("/bucket/key", "/bucket/key"; "plain")]
    #[test_case("/bucket/a b.txt", "/bucket/a%20b.txt"; "space")]
    #[test_case("/bucket/dir\\file", "/bucket/dir%5Cfile"; "backslash")]
    #[test_case("/bucket/中", "/bucket/%E4%B8%AD"; "utf8")]
    fn test_percent_encode_path(input: &str, expected: &str) {
        assert_eq!(percent_encode_path(input), expected);
    }

    #[test]
    fn test_percent_encode_query() {
        assert_eq!(percent_encode_query("text/plain; a=b"), "text%2Fplain%3B%20a%3Db");
    }
}
