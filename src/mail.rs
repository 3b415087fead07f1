//! Mail Compose Links
//!
//! `mailto:` links cannot carry attachments, so the body tells the user
//! which file to attach.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Address characters left readable in the link
const ADDRESS_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'@')
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'+')
    .remove(b',');

pub fn mailto_link(to: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        utf8_percent_encode(to, ADDRESS_ENCODE_SET),
        utf8_percent_encode(subject, NON_ALPHANUMERIC),
        utf8_percent_encode(body, NON_ALPHANUMERIC)
    )
}

/// Body sent after a successful download
pub fn certificate_mail_body(file_name: &str, date: &str, item_count: usize) -> String {
    format!(
        "Hello,\n\n\
         I completed all {} items of the lab onboarding checklist and signed it on {}.\n\n\
         The certificate was downloaded to my computer as \"{}\".\n\
         Please attach that file to this email before sending.\n",
        item_count, date, file_name
    )
}

/// Body used when the certificate had to be printed instead
pub fn printed_mail_body(date: &str, item_count: usize) -> String {
    format!(
        "Hello,\n\n\
         I completed all {} items of the lab onboarding checklist and signed it on {}.\n\n\
         The certificate could not be generated automatically, so I printed the checklist page.\n\
         Please save the printed page as a PDF and attach it to this email before sending.\n",
        item_count, date
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_encoding() {
        let link = mailto_link("lab-admin@example.org", "Checklist done", "Line one\nLine & two");
        assert_eq!(
            link,
            "mailto:lab-admin@example.org?subject=Checklist%20done\
             &body=Line%20one%0ALine%20%26%20two"
        );
    }

    #[test]
    fn test_empty_recipient() {
        assert!(mailto_link("", "s", "b").starts_with("mailto:?subject=s"));
    }

    #[test]
    fn test_certificate_body_names_file() {
        let body = certificate_mail_body("onboarding-checklist-2024-05-01.pdf", "2024-05-01", 3);
        assert!(body.contains("all 3 items"));
        assert!(body.contains("onboarding-checklist-2024-05-01.pdf"));
        assert!(body.contains("attach"));
    }
}
