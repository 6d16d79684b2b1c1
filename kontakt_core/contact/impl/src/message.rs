use kontakt_core_contact_contracts::ContactValidationError;
use kontakt_models::contact::{ComposedMessage, ContactSubmission, EMAIL_REGEX, MESSAGE_MAX_CHARS};

const SITE: &str = "g5bygg.com";
const UNKNOWN_SENDER: &str = "okänd avsändare";

/// Checks presence, then email shape, then message length. The first failing
/// check decides which error is reported.
pub fn validate(submission: &ContactSubmission) -> Result<(), ContactValidationError> {
    let required = [
        &submission.first_name,
        &submission.last_name,
        &submission.email,
        &submission.message,
    ];
    if required.into_iter().any(String::is_empty) {
        return Err(ContactValidationError::MissingFields);
    }

    if !EMAIL_REGEX.is_match(&submission.email) {
        return Err(ContactValidationError::InvalidEmail);
    }

    if submission.message.chars().count() > MESSAGE_MAX_CHARS {
        return Err(ContactValidationError::MessageTooLong);
    }

    Ok(())
}

/// Builds the subject line and the plain-text/HTML body pair for a validated
/// submission. Deterministic; all user-supplied values in the HTML body are
/// escaped.
pub fn compose(submission: &ContactSubmission) -> ComposedMessage {
    let full_name = submission.full_name();
    let sender = if full_name.is_empty() {
        UNKNOWN_SENDER
    } else {
        full_name.as_str()
    };

    let subject = format!("Ny kontaktförfrågan från {sender}");

    let mut text = format!("Nytt meddelande från kontaktformuläret på {SITE}\n\nNamn: {full_name}\n");
    if !submission.phone.is_empty() {
        text.push_str(&format!("Telefon: {}\n", submission.phone));
    }
    text.push_str(&format!(
        "E-post: {}\n\nMeddelande:\n{}",
        submission.email, submission.message
    ));

    let phone_row = if submission.phone.is_empty() {
        String::new()
    } else {
        format!(
            "    <p><strong>Telefon:</strong> {}</p>\n",
            escape_html(&submission.phone)
        )
    };

    let html = format!(
        concat!(
            "<!doctype html>\n",
            "<html lang=\"sv\">\n",
            "  <body>\n",
            "    <h2>Nytt meddelande från kontaktformuläret</h2>\n",
            "    <p><strong>Namn:</strong> {name}</p>\n",
            "{phone_row}",
            "    <p><strong>E-post:</strong> {email}</p>\n",
            "    <h3>Meddelande</h3>\n",
            "    <p>{message}</p>\n",
            "  </body>\n",
            "</html>\n",
        ),
        name = escape_html(&full_name),
        phone_row = phone_row,
        email = escape_html(&submission.email),
        message = escape_html(&submission.message).replace('\n', "<br>"),
    );

    ComposedMessage {
        subject,
        text,
        html,
    }
}

/// Escapes `&`, `<`, `>`, `"` and `'` by direct substitution so that
/// user-supplied values cannot inject markup into the HTML body.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use kontakt_utils::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            first_name: "Anna".into(),
            last_name: "Svensson".into(),
            email: "anna@example.com".into(),
            message: "Hej!".into(),
            phone: String::new(),
        }
    }

    #[test]
    fn validate_ok() {
        validate(&submission()).unwrap();
    }

    #[test]
    fn validate_requires_all_fields() {
        for clear in [0, 1, 2, 3] {
            let mut submission = submission();
            match clear {
                0 => submission.first_name.clear(),
                1 => submission.last_name.clear(),
                2 => submission.email.clear(),
                _ => submission.message.clear(),
            }
            assert_matches!(
                validate(&submission),
                Err(ContactValidationError::MissingFields)
            );
        }
    }

    #[test]
    fn validate_does_not_require_phone() {
        let mut submission = submission();
        submission.phone = "070-1234567".into();
        validate(&submission).unwrap();
    }

    #[test]
    fn validate_rejects_malformed_email() {
        for email in ["anna", "anna@example", "@example.com", "anna svensson@x.se"] {
            let submission = ContactSubmission {
                email: email.into(),
                ..submission()
            };
            assert_matches!(
                validate(&submission),
                Err(ContactValidationError::InvalidEmail)
            );
        }
    }

    #[test]
    fn validate_bounds_message_length() {
        let mut submission = ContactSubmission {
            message: "ö".repeat(MESSAGE_MAX_CHARS),
            ..submission()
        };
        validate(&submission).unwrap();

        submission.message.push('!');
        assert_matches!(
            validate(&submission),
            Err(ContactValidationError::MessageTooLong)
        );
    }

    #[test]
    fn validate_reports_presence_before_format_before_length() {
        let submission = ContactSubmission {
            first_name: String::new(),
            email: "nonsense".into(),
            message: "x".repeat(MESSAGE_MAX_CHARS + 1),
            ..submission()
        };
        assert_matches!(
            validate(&submission),
            Err(ContactValidationError::MissingFields)
        );

        let submission = ContactSubmission {
            email: "nonsense".into(),
            message: "x".repeat(MESSAGE_MAX_CHARS + 1),
            ..self::submission()
        };
        assert_matches!(
            validate(&submission),
            Err(ContactValidationError::InvalidEmail)
        );
    }

    #[test]
    fn compose_plain_text_body() {
        let message = compose(&submission());

        assert_eq!(message.subject, "Ny kontaktförfrågan från Anna Svensson");
        assert_eq!(
            message.text,
            "Nytt meddelande från kontaktformuläret på g5bygg.com\n\n\
             Namn: Anna Svensson\n\
             E-post: anna@example.com\n\n\
             Meddelande:\nHej!"
        );
    }

    #[test]
    fn compose_is_deterministic() {
        let submission = submission();
        assert_eq!(compose(&submission), compose(&submission));
    }

    #[test]
    fn compose_escapes_user_input() {
        let submission = ContactSubmission {
            message: "<script>alert(1)</script>".into(),
            first_name: "A & B".into(),
            last_name: "\"quoted\"".into(),
            ..submission()
        };

        let message = compose(&submission);

        assert!(!message.html.contains("<script>"));
        assert!(message
            .html
            .contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(message.html.contains("A &amp; B &quot;quoted&quot;"));
    }

    #[test]
    fn compose_converts_message_newlines() {
        let submission = ContactSubmission {
            message: "rad ett\nrad två".into(),
            ..submission()
        };

        let message = compose(&submission);

        assert!(message.html.contains("rad ett<br>rad två"));
        assert!(message.text.contains("rad ett\nrad två"));
    }

    #[test]
    fn compose_includes_phone_only_when_present() {
        let without_phone = compose(&submission());
        assert!(!without_phone.text.contains("Telefon"));
        assert!(!without_phone.html.contains("Telefon"));

        let with_phone = compose(&ContactSubmission {
            phone: "070-1234567".into(),
            ..submission()
        });
        assert!(with_phone.text.contains("Telefon: 070-1234567\n"));
        assert!(with_phone
            .html
            .contains("<p><strong>Telefon:</strong> 070-1234567</p>"));
    }

    #[test]
    fn compose_subject_falls_back_for_missing_name() {
        let submission = ContactSubmission {
            first_name: String::new(),
            last_name: String::new(),
            ..submission()
        };

        let message = compose(&submission);

        assert_eq!(message.subject, "Ny kontaktförfrågan från okänd avsändare");
    }

    #[test]
    fn escape_html_substitutions() {
        assert_eq!(
            escape_html(r#"&<>"'"#),
            "&amp;&lt;&gt;&quot;&#039;"
        );
        assert_eq!(escape_html("ingen förändring"), "ingen förändring");
        // A single pass must not double-escape the ampersands it produces.
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }
}
