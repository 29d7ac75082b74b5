use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::form::InterestForm;

// RFC 3986 unreserved characters pass through; everything else (spaces, newlines, `&`) is escaped.
const MAILTO_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

// The address keeps its `@`; anything else that could end it early (`?`, `&`, spaces) is escaped.
const MAILTO_ADDRESS: &AsciiSet = &MAILTO_COMPONENT.remove(b'@');

pub fn build(to: &str, subject: &str, body: Option<&str>) -> String {
    let mut uri = format!(
        "mailto:{}?subject={}",
        utf8_percent_encode(to.trim(), MAILTO_ADDRESS),
        utf8_percent_encode(subject, MAILTO_COMPONENT)
    );
    if let Some(body) = body {
        uri.push_str("&body=");
        uri.push_str(&utf8_percent_encode(body, MAILTO_COMPONENT).to_string());
    }
    uri
}

/// Deep link the contact button opens, prefilled with what the volunteer entered.
pub fn contact_link(to: &str, form: &InterestForm) -> String {
    let body = format!(
        "Hello,\n\nI would like to volunteer. Here is my profile:\n\n\
         Interests: {}\nSkills: {}\nHow I would like to contribute: {}\nLocation: {}\n\nThank you!",
        form.interests, form.skills, form.contribution_method, form.location
    );
    build(to, "Volunteering interest", Some(&body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;

    fn query_param<'a>(uri: &'a str, key: &str) -> &'a str {
        let query = uri.split_once('?').unwrap().1;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{}=", key)))
            .unwrap()
    }

    #[test]
    fn test_contact_link_body_contains_entered_values() {
        let form = InterestForm {
            interests: "animals & kids".to_string(),
            skills: "teaching, cooking".to_string(),
            contribution_method: "weekends on-site".to_string(),
            location: "São Paulo".to_string(),
        };
        let uri = contact_link("team@example.org", &form);
        assert!(uri.starts_with("mailto:team@example.org?subject=Volunteering%20interest&body="));

        let body = percent_decode_str(query_param(&uri, "body")).decode_utf8().unwrap();
        assert!(body.contains("animals & kids"));
        assert!(body.contains("teaching, cooking"));
        assert!(body.contains("weekends on-site"));
        assert!(body.contains("São Paulo"));
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        let uri = build("a@b.c", "x & y?", Some("line1\nline2"));
        assert_eq!(uri, "mailto:a@b.c?subject=x%20%26%20y%3F&body=line1%0Aline2");
    }

    #[test]
    fn test_address_cannot_break_into_query() {
        let uri = build("help desk?cc=x&y@ong.org", "Hi", None);
        assert_eq!(uri, "mailto:help%20desk%3Fcc%3Dx%26y@ong.org?subject=Hi");
        assert_eq!(uri.matches('?').count(), 1);

        let decoded = percent_decode_str(uri.strip_prefix("mailto:").unwrap().split('?').next().unwrap())
            .decode_utf8()
            .unwrap();
        assert_eq!(decoded, "help desk?cc=x&y@ong.org");
    }
}
