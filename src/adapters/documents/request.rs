//! Builders for the XML documents posted to iPass

use crate::domain::entities::{HostedUser, PersonName};
use crate::domain::repositories::ProvisioningError;
use std::io::Write;
use xml::common::XmlVersion;
use xml::writer::{EmitterConfig, EventWriter, XmlEvent};

/// Account defaults iPass wants on every end user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSettings {
    pub home_country: String,
    pub locale: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            home_country: "AX".to_string(),
            locale: "en-US".to_string(),
        }
    }
}

/// Notification types registered for every end user, all unsubscribed
const NOTIFICATION_TYPES: [&str; 2] = ["Activate", "Suspend"];

/// Build the `<endUser>` document used by the create and update services
pub fn end_user_document(
    user: &HostedUser,
    name: &PersonName,
    settings: &DocumentSettings,
) -> Result<String, ProvisioningError> {
    let username = user.username_domain();
    write_document(|writer| {
        writer.write(XmlEvent::start_element("endUser"))?;
        text_element(writer, "fname", &name.first)?;
        text_element(writer, "lname", &name.last)?;
        text_element(writer, "email", &user.email)?;
        text_element(writer, "homeCountry", &settings.home_country)?;
        text_element(writer, "locale", &settings.locale)?;
        text_element(writer, "username", &username)?;
        text_element(writer, "password", "")?;
        text_element(writer, "enablePortalLogin", "false")?;
        text_element(writer, "departmentCode", "")?;

        writer.write(XmlEvent::start_element("notifications"))?;
        for notification_type in NOTIFICATION_TYPES {
            writer.write(XmlEvent::start_element("notification").attr("subscribe", "false"))?;
            text_element(writer, "type", notification_type)?;
            writer.write(XmlEvent::end_element())?;
        }
        writer.write(XmlEvent::end_element())?;

        writer.write(XmlEvent::end_element())
    })
}

/// Build the `<endUser><username/></endUser>` document used by suspend, delete and activate
pub fn username_document(username_domain: &str) -> Result<String, ProvisioningError> {
    write_document(|writer| {
        writer.write(XmlEvent::start_element("endUser"))?;
        text_element(writer, "username", username_domain)?;
        writer.write(XmlEvent::end_element())
    })
}

fn write_document<F>(body: F) -> Result<String, ProvisioningError>
where
    F: FnOnce(&mut EventWriter<&mut Vec<u8>>) -> xml::writer::Result<()>,
{
    let mut buffer = Vec::new();
    {
        let mut writer = EmitterConfig::new()
            .perform_indent(true)
            .normalize_empty_elements(false)
            .create_writer(&mut buffer);

        writer
            .write(XmlEvent::StartDocument {
                version: XmlVersion::Version10,
                encoding: Some("utf-8"),
                standalone: Some(true),
            })
            .map_err(|e| ProvisioningError::Document(e.to_string()))?;

        body(&mut writer).map_err(|e| ProvisioningError::Document(e.to_string()))?;
    }

    String::from_utf8(buffer).map_err(|e| ProvisioningError::Document(e.to_string()))
}

fn text_element<W: Write>(
    writer: &mut EventWriter<W>,
    name: &str,
    value: &str,
) -> xml::writer::Result<()> {
    writer.write(XmlEvent::start_element(name))?;
    if !value.is_empty() {
        writer.write(XmlEvent::characters(value))?;
    }
    writer.write(XmlEvent::end_element())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> HostedUser {
        HostedUser::new("jdoe", "example.com", "john@mail.com", "John Doe").unwrap()
    }

    fn sample_name() -> PersonName {
        PersonName {
            first: "John".to_string(),
            last: "Doe".to_string(),
        }
    }

    #[test]
    fn test_end_user_document_declaration() {
        let doc = end_user_document(&sample_user(), &sample_name(), &DocumentSettings::default()).unwrap();
        assert!(doc.starts_with(r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>"#));
    }

    #[test]
    fn test_end_user_document_fields_in_order() {
        let doc = end_user_document(&sample_user(), &sample_name(), &DocumentSettings::default()).unwrap();

        let expected = [
            "<endUser>",
            "<fname>John</fname>",
            "<lname>Doe</lname>",
            "<email>john@mail.com</email>",
            "<homeCountry>AX</homeCountry>",
            "<locale>en-US</locale>",
            "<username>jdoe@example.com</username>",
            "<password></password>",
            "<enablePortalLogin>false</enablePortalLogin>",
            "<departmentCode></departmentCode>",
            "<notifications>",
            "<notification subscribe=\"false\">",
            "<type>Activate</type>",
            "<type>Suspend</type>",
            "</notifications>",
            "</endUser>",
        ];

        let mut position = 0;
        for fragment in expected {
            let found = doc[position..]
                .find(fragment)
                .unwrap_or_else(|| panic!("missing {} after offset {} in {}", fragment, position, doc));
            position += found + fragment.len();
        }
    }

    #[test]
    fn test_end_user_document_uses_settings() {
        let settings = DocumentSettings {
            home_country: "SE".to_string(),
            locale: "sv-SE".to_string(),
        };
        let doc = end_user_document(&sample_user(), &sample_name(), &settings).unwrap();
        assert!(doc.contains("<homeCountry>SE</homeCountry>"));
        assert!(doc.contains("<locale>sv-SE</locale>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let name = PersonName {
            first: "Tom & Jerry".to_string(),
            last: "<Doe>".to_string(),
        };
        let doc = end_user_document(&sample_user(), &name, &DocumentSettings::default()).unwrap();
        assert!(doc.contains("<fname>Tom &amp; Jerry</fname>"));
        assert!(doc.contains("<lname>&lt;Doe></lname>") || doc.contains("<lname>&lt;Doe&gt;</lname>"));
    }

    #[test]
    fn test_username_document() {
        let doc = username_document("jdoe@example.com").unwrap();
        assert!(doc.contains("<endUser>"));
        assert!(doc.contains("<username>jdoe@example.com</username>"));
        assert!(!doc.contains("<email>"));
    }
}
