//! Query-string helpers: parsing, encoding, and parameter-name normalization.
//!
//! A generated query string is `key=value` pairs joined with `&`, values
//! percent-encoded, no leading `?`. The full request URL is assembled by the
//! caller as `{server_url}/{resource_type}?{query_string}`.

use url::form_urlencoded;

/// Parse a query string into decoded `(key, value)` pairs.
///
/// Every pair must carry an explicit `=`; FHIR search has no flag-style
/// parameters, so a bare key indicates a malformed generation. Repeated keys
/// (e.g. two `birthdate` bounds) are preserved as separate pairs.
pub fn parse_query_string(query: &str) -> Result<Vec<(String, String)>, String> {
    let trimmed = query.trim().trim_start_matches('?');
    if trimmed.is_empty() {
        return Err("empty query string".to_string());
    }

    for piece in trimmed.split('&') {
        let Some((key, _)) = piece.split_once('=') else {
            return Err(format!("parameter '{}' is missing a value", piece));
        };
        if key.is_empty() {
            return Err(format!("parameter '{}' has an empty name", piece));
        }
    }

    Ok(form_urlencoded::parse(trimmed.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}

/// Encode pairs back into a query string. Inverse of [`parse_query_string`].
pub fn encode_query_string(pairs: &[(String, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Reduce a query key to the search parameter it is rooted at.
///
/// Strips modifier suffixes (`given:contains` → `given`, `subject:Patient`
/// → `subject`) and chained paths (`patient.name` → `patient`,
/// `_has:Observation:patient:code` → `_has`).
pub fn base_param_name(key: &str) -> &str {
    let end = key.find([':', '.']).unwrap_or(key.len());
    &key[..end]
}

/// Assemble the full request URL for a generated query
pub fn assemble_url(server_url: &str, resource_type: &str, query_string: &str) -> String {
    let base = server_url.trim_end_matches('/');
    if query_string.is_empty() {
        format!("{}/{}", base, resource_type)
    } else {
        format!("{}/{}?{}", base, resource_type, query_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_keys_in_order() {
        let pairs = parse_query_string("birthdate=ge1980&birthdate=le1990&gender=female").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("birthdate".to_string(), "ge1980".to_string()),
                ("birthdate".to_string(), "le1990".to_string()),
                ("gender".to_string(), "female".to_string()),
            ]
        );
    }

    #[test]
    fn decodes_percent_encoded_values() {
        let pairs = parse_query_string("address-state=New%20York&name=O%27Brien").unwrap();
        assert_eq!(pairs[0].1, "New York");
        assert_eq!(pairs[1].1, "O'Brien");
    }

    #[test]
    fn tolerates_leading_question_mark() {
        let pairs = parse_query_string("?gender=male").unwrap();
        assert_eq!(pairs, vec![("gender".to_string(), "male".to_string())]);
    }

    #[test]
    fn rejects_flag_style_parameters() {
        assert!(parse_query_string("gender").is_err());
        assert!(parse_query_string("gender=male&active").is_err());
        assert!(parse_query_string("=male").is_err());
        assert!(parse_query_string("").is_err());
    }

    #[test]
    fn encode_round_trips() {
        let original = parse_query_string("family=Sm%C3%B8th&birthdate=ge1980&_count=10").unwrap();
        let reparsed = parse_query_string(&encode_query_string(&original)).unwrap();
        assert_eq!(original, reparsed);
    }

    #[test]
    fn normalizes_modifiers_and_chains() {
        assert_eq!(base_param_name("given:contains"), "given");
        assert_eq!(base_param_name("subject:Patient.name"), "subject");
        assert_eq!(base_param_name("patient.name"), "patient");
        assert_eq!(base_param_name("_has:Observation:patient:code"), "_has");
        assert_eq!(base_param_name("gender"), "gender");
    }

    #[test]
    fn assembles_full_url() {
        assert_eq!(
            assemble_url("https://r4.example.org/", "Patient", "gender=female"),
            "https://r4.example.org/Patient?gender=female"
        );
        assert_eq!(
            assemble_url("https://r4.example.org", "Patient", ""),
            "https://r4.example.org/Patient"
        );
    }
}
