//! Recipient location as reported in recipient overviews.

use serde::{Deserialize, Serialize};

/// Address and district of a recipient.
///
/// Every key is always present in the JSON payload; unknown values are null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientLocation {
    /// First address line.
    pub address_line1: Option<String>,
    /// Second address line.
    pub address_line2: Option<String>,
    /// Third address line.
    pub address_line3: Option<String>,
    /// Province for foreign addresses.
    pub foreign_province: Option<String>,
    /// City.
    pub city_name: Option<String>,
    /// County.
    pub county_name: Option<String>,
    /// Two-letter state code.
    pub state_code: Option<String>,
    /// Five-digit ZIP code.
    pub zip: Option<String>,
    /// ZIP+4 suffix.
    pub zip4: Option<String>,
    /// Postal code for foreign addresses.
    pub foreign_postal_code: Option<String>,
    /// Country name.
    pub country_name: Option<String>,
    /// Three-letter country code.
    pub country_code: Option<String>,
    /// Congressional district number.
    pub congressional_code: Option<String>,
}

impl RecipientLocation {
    /// Normalise legacy transaction formats.
    ///
    /// Older transactions store the country name in the code column and use
    /// `13.0`, `13` or `CA13` for congressional districts.
    #[must_use]
    pub fn normalised(self) -> Self {
        let country_code = self.country_code.map(|code| {
            if code == "UNITED STATES" {
                "USA".to_owned()
            } else {
                code
            }
        });
        let congressional_code = self
            .congressional_code
            .map(|code| normalise_congressional_code(&code));
        Self {
            country_code,
            congressional_code,
            ..self
        }
    }

    /// Country code whose name still has to be looked up, if any.
    #[must_use]
    pub fn country_code_missing_name(&self) -> Option<&str> {
        match (&self.country_code, &self.country_name) {
            (Some(code), None) if !code.is_empty() => Some(code.as_str()),
            _ => None,
        }
    }
}

fn normalise_congressional_code(raw: &str) -> String {
    let without_decimal = raw.rsplit_once('.').map_or(raw, |(whole, _)| whole);
    if without_decimal.chars().count() == 4 {
        without_decimal.chars().skip(2).collect()
    } else {
        without_decimal.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("13.0", "13")]
    #[case("13", "13")]
    #[case("CA13", "13")]
    #[case("CA13.0", "13")]
    #[case("1.2.3", "1.2")]
    #[case("00", "00")]
    #[case("", "")]
    fn normalises_congressional_codes(#[case] raw: &str, #[case] expected: &str) {
        let location = RecipientLocation {
            congressional_code: Some(raw.to_owned()),
            ..RecipientLocation::default()
        };
        assert_eq!(
            location.normalised().congressional_code.as_deref(),
            Some(expected)
        );
    }

    #[rstest]
    fn rewrites_united_states_country_code() {
        let location = RecipientLocation {
            country_code: Some("UNITED STATES".to_owned()),
            ..RecipientLocation::default()
        }
        .normalised();
        assert_eq!(location.country_code.as_deref(), Some("USA"));
        assert_eq!(location.country_code_missing_name(), Some("USA"));
    }

    #[rstest]
    fn skips_lookup_when_name_present() {
        let location = RecipientLocation {
            country_code: Some("CAN".to_owned()),
            country_name: Some("CANADA".to_owned()),
            ..RecipientLocation::default()
        };
        assert!(location.country_code_missing_name().is_none());
    }

    #[rstest]
    fn serialises_every_key() {
        let value = serde_json::to_value(RecipientLocation::default()).expect("serialise");
        let keys = value.as_object().expect("object").len();
        assert_eq!(keys, 13);
    }
}
