//! Free-text address parsing.
//!
//! Classifies whitespace-separated tokens into house number, street name,
//! street type, city, state and zip. The walk is positional: a leading
//! all-digit token is the house number, tokens accumulate as street/city
//! material until a state abbreviation or zip code appears, and the last
//! street-type token splits street name (before it) from city (after it).

use std::collections::HashMap;
use std::fmt;

/// Street-type abbreviation → canonical expansion.
const STREET_TYPES: &[(&str, &str)] = &[
    ("ST", "STREET"),
    ("AVE", "AVENUE"),
    ("BLVD", "BOULEVARD"),
    ("RD", "ROAD"),
    ("DR", "DRIVE"),
    ("LN", "LANE"),
    ("CT", "COURT"),
    ("PL", "PLACE"),
    ("WAY", "WAY"),
    ("CIR", "CIRCLE"),
    ("PKWY", "PARKWAY"),
    ("HWY", "HIGHWAY"),
];

/// US state and DC two-letter codes → full names.
const US_STATES: &[(&str, &str)] = &[
    ("AL", "ALABAMA"),
    ("AK", "ALASKA"),
    ("AZ", "ARIZONA"),
    ("AR", "ARKANSAS"),
    ("CA", "CALIFORNIA"),
    ("CO", "COLORADO"),
    ("CT", "CONNECTICUT"),
    ("DE", "DELAWARE"),
    ("FL", "FLORIDA"),
    ("GA", "GEORGIA"),
    ("HI", "HAWAII"),
    ("ID", "IDAHO"),
    ("IL", "ILLINOIS"),
    ("IN", "INDIANA"),
    ("IA", "IOWA"),
    ("KS", "KANSAS"),
    ("KY", "KENTUCKY"),
    ("LA", "LOUISIANA"),
    ("ME", "MAINE"),
    ("MD", "MARYLAND"),
    ("MA", "MASSACHUSETTS"),
    ("MI", "MICHIGAN"),
    ("MN", "MINNESOTA"),
    ("MS", "MISSISSIPPI"),
    ("MO", "MISSOURI"),
    ("MT", "MONTANA"),
    ("NE", "NEBRASKA"),
    ("NV", "NEVADA"),
    ("NH", "NEW HAMPSHIRE"),
    ("NJ", "NEW JERSEY"),
    ("NM", "NEW MEXICO"),
    ("NY", "NEW YORK"),
    ("NC", "NORTH CAROLINA"),
    ("ND", "NORTH DAKOTA"),
    ("OH", "OHIO"),
    ("OK", "OKLAHOMA"),
    ("OR", "OREGON"),
    ("PA", "PENNSYLVANIA"),
    ("RI", "RHODE ISLAND"),
    ("SC", "SOUTH CAROLINA"),
    ("SD", "SOUTH DAKOTA"),
    ("TN", "TENNESSEE"),
    ("TX", "TEXAS"),
    ("UT", "UTAH"),
    ("VT", "VERMONT"),
    ("VA", "VIRGINIA"),
    ("WA", "WASHINGTON"),
    ("WV", "WEST VIRGINIA"),
    ("WI", "WISCONSIN"),
    ("WY", "WYOMING"),
    ("DC", "DISTRICT OF COLUMBIA"),
];

/// A parsed address, with empty strings for absent components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedAddress {
    pub house_number: String,
    pub street_name: String,
    pub street_type: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    /// The raw input this address was parsed from.
    pub full_address: String,
}

impl ParsedAddress {
    /// An address is valid when it carries at least a house number and a
    /// street name.
    pub fn is_valid(&self) -> bool {
        !self.house_number.is_empty() && !self.street_name.is_empty()
    }
}

impl fmt::Display for ParsedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = [
            &self.house_number,
            &self.street_name,
            &self.street_type,
            &self.city,
            &self.state,
            &self.zip_code,
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| part.as_str())
        .collect::<Vec<_>>()
        .join(" ");
        f.write_str(&rendered)
    }
}

/// Tokenizing classifier for US-style street addresses.
#[derive(Debug)]
pub struct AddressParser {
    /// Keyed by abbreviation *and* expansion, so `ST` and `STREET` both
    /// resolve to `STREET`.
    street_types: HashMap<String, String>,
    states: HashMap<String, String>,
}

impl AddressParser {
    pub fn new() -> Self {
        let mut street_types = HashMap::new();
        for (abbrev, full) in STREET_TYPES {
            street_types.insert((*abbrev).to_string(), (*full).to_string());
            street_types.insert((*full).to_string(), (*full).to_string());
        }
        let states = US_STATES
            .iter()
            .map(|(abbrev, full)| ((*abbrev).to_string(), (*full).to_string()))
            .collect();
        Self {
            street_types,
            states,
        }
    }

    /// Canonicalize text for matching: uppercase, commas and periods to
    /// spaces, whitespace runs collapsed, trimmed. Idempotent.
    pub fn normalize(&self, text: &str) -> String {
        let upper: String = text
            .chars()
            .map(|c| match c {
                ',' | '.' => ' ',
                _ => c.to_ascii_uppercase(),
            })
            .collect();
        upper.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Parse a free-text address into components.
    ///
    /// Never fails; unrecognized text just leaves components empty.
    pub fn parse(&self, address: &str) -> ParsedAddress {
        let mut parsed = ParsedAddress {
            full_address: address.to_string(),
            ..Default::default()
        };

        let normalized = self.normalize(address);
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        if tokens.is_empty() {
            return parsed;
        }

        let mut i = 0;

        // House number: a leading all-digit token
        if is_numeric(tokens[0]) {
            parsed.house_number = tokens[0].to_string();
            i = 1;
        }

        // Street and city material runs until a state code or zip
        let start = i;
        while i < tokens.len() && !is_zip_code(tokens[i]) && !self.states.contains_key(tokens[i]) {
            i += 1;
        }
        let buffer = &tokens[start..i];

        // The last street-type token splits street name from city
        match buffer
            .iter()
            .rposition(|token| self.street_types.contains_key(*token))
        {
            Some(pos) => {
                parsed.street_name = buffer[..pos].join(" ");
                parsed.street_type = self.street_types[buffer[pos]].clone();
                parsed.city = buffer[pos + 1..].join(" ");
            }
            None => parsed.street_name = buffer.join(" "),
        }

        if i < tokens.len() && self.states.contains_key(tokens[i]) {
            parsed.state = tokens[i].to_string();
            i += 1;
        }

        if i < tokens.len() && is_zip_code(tokens[i]) {
            parsed.zip_code = tokens[i].to_string();
        }

        parsed
    }

    /// The full name for a two-letter state code, if known.
    pub fn state_name(&self, code: &str) -> Option<&str> {
        self.states.get(code).map(String::as_str)
    }
}

impl Default for AddressParser {
    fn default() -> Self {
        Self::new()
    }
}

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// 5-digit or 5+4 (`12345-6789`) zip codes.
fn is_zip_code(token: &str) -> bool {
    let bytes = token.as_bytes();
    match bytes.len() {
        5 => bytes.iter().all(u8::is_ascii_digit),
        10 => {
            bytes[5] == b'-'
                && bytes[..5].iter().all(u8::is_ascii_digit)
                && bytes[6..].iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> AddressParser {
        AddressParser::new()
    }

    // =========================================================================
    // Normalization
    // =========================================================================

    #[test]
    fn test_normalize_uppercases_and_strips_punctuation() {
        assert_eq!(
            parser().normalize("123 Main St., Anytown"),
            "123 MAIN ST ANYTOWN"
        );
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(parser().normalize("  a\t b  \n c "), "A B C");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let p = parser();
        for input in ["123 Main St., Anytown, CA", "  ODD   spacing. here ", ""] {
            let once = p.normalize(input);
            assert_eq!(p.normalize(&once), once);
        }
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn test_parse_full_address() {
        let parsed = parser().parse("123 Main Street, Anytown, CA 12345");
        assert_eq!(parsed.house_number, "123");
        assert_eq!(parsed.street_name, "MAIN");
        assert_eq!(parsed.street_type, "STREET");
        assert_eq!(parsed.city, "ANYTOWN");
        assert_eq!(parsed.state, "CA");
        assert_eq!(parsed.zip_code, "12345");
        assert!(parsed.is_valid());
    }

    #[test]
    fn test_parse_abbreviated_street_type() {
        let parsed = parser().parse("123 Main St, Anytown, CA 12345");
        assert_eq!(parsed.street_name, "MAIN");
        assert_eq!(parsed.street_type, "STREET");
        assert_eq!(parsed.city, "ANYTOWN");
    }

    #[test]
    fn test_parse_multi_word_street_and_city() {
        let parsed = parser().parse("77 Martin Luther King Blvd, San Jose, CA");
        assert_eq!(parsed.street_name, "MARTIN LUTHER KING");
        assert_eq!(parsed.street_type, "BOULEVARD");
        assert_eq!(parsed.city, "SAN JOSE");
        assert_eq!(parsed.state, "CA");
        assert_eq!(parsed.zip_code, "");
    }

    #[test]
    fn test_parse_without_house_number_is_invalid() {
        let parsed = parser().parse("Main Street, Anytown, CA");
        assert_eq!(parsed.house_number, "");
        assert_eq!(parsed.street_name, "MAIN");
        assert!(!parsed.is_valid());
    }

    #[test]
    fn test_parse_without_street_type() {
        let parsed = parser().parse("500 Broadway NY 10012");
        assert_eq!(parsed.house_number, "500");
        assert_eq!(parsed.street_name, "BROADWAY");
        assert_eq!(parsed.street_type, "");
        assert_eq!(parsed.city, "");
        assert_eq!(parsed.state, "NY");
        assert_eq!(parsed.zip_code, "10012");
    }

    #[test]
    fn test_parse_zip_plus_four() {
        let parsed = parser().parse("1 Elm Ave, Springfield, IL 62704-1234");
        assert_eq!(parsed.zip_code, "62704-1234");
    }

    #[test]
    fn test_parse_empty_input() {
        let parsed = parser().parse("   ");
        assert_eq!(parsed, ParsedAddress {
            full_address: "   ".to_string(),
            ..Default::default()
        });
        assert!(!parsed.is_valid());
    }

    #[test]
    fn test_court_abbreviation_reads_as_connecticut() {
        // CT doubles as the COURT abbreviation and the Connecticut code.
        // The token walk stops at the first state-code token, so a "Ct"
        // street suffix is consumed as the state and later tokens are
        // dropped rather than misfiled.
        let parsed = parser().parse("9 Pequot Ct, Mystic, CT 06355");
        assert_eq!(parsed.house_number, "9");
        assert_eq!(parsed.street_name, "PEQUOT");
        assert_eq!(parsed.street_type, "");
        assert_eq!(parsed.state, "CT");
    }

    // =========================================================================
    // Display round-trip
    // =========================================================================

    #[test]
    fn test_to_string_omits_empty_components() {
        let parsed = parser().parse("500 Broadway NY 10012");
        assert_eq!(parsed.to_string(), "500 BROADWAY NY 10012");
    }

    #[test]
    fn test_parse_tostring_roundtrip_on_components() {
        let p = parser();
        for input in [
            "123 Main Street, Anytown, CA 12345",
            "123 Main St, Anytown, CA 12345",
            "1 Elm Ave, Springfield, IL 62704-1234",
            "500 Broadway NY 10012",
        ] {
            let first = p.parse(input);
            let second = p.parse(&first.to_string());
            assert_eq!(first.house_number, second.house_number, "{}", input);
            assert_eq!(first.street_name, second.street_name, "{}", input);
            assert_eq!(first.street_type, second.street_type, "{}", input);
            assert_eq!(first.city, second.city, "{}", input);
            assert_eq!(first.state, second.state, "{}", input);
            assert_eq!(first.zip_code, second.zip_code, "{}", input);
        }
    }

    // =========================================================================
    // Token classifiers
    // =========================================================================

    #[test]
    fn test_zip_code_recognition() {
        assert!(is_zip_code("12345"));
        assert!(is_zip_code("12345-6789"));
        assert!(!is_zip_code("1234"));
        assert!(!is_zip_code("123456"));
        assert!(!is_zip_code("12345-678"));
        assert!(!is_zip_code("ABCDE"));
    }

    #[test]
    fn test_state_lookup() {
        let p = parser();
        assert_eq!(p.state_name("CA"), Some("CALIFORNIA"));
        assert_eq!(p.state_name("DC"), Some("DISTRICT OF COLUMBIA"));
        assert_eq!(p.state_name("ZZ"), None);
    }
}
