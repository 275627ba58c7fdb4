//! Parsers for the XML documents iPass answers with

use crate::domain::entities::HostedUser;
use crate::domain::repositories::ProvisioningError;
use serde::Deserialize;
use xml::reader::{EventReader, XmlEvent};

/// `endUserId` and activation url from a create or update response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndUserResponse {
    pub end_user_id: String,
    pub activation_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EndUserResponseDto {
    #[serde(rename = "endUserId", default)]
    end_user_id: Option<String>,
    #[serde(rename = "selfServiceActivationUrl", default)]
    activation_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDto {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// One `<endUser>` of a search response, collected element by element
#[derive(Debug, Default)]
struct SearchUserDto {
    end_user_id: Option<String>,
    username: Option<String>,
    email: Option<String>,
    fname: Option<String>,
    lname: Option<String>,
    activation_url: Option<String>,
}

impl SearchUserDto {
    fn append(&mut self, field: &str, text: &str) {
        let slot = match field {
            "endUserId" => &mut self.end_user_id,
            "username" => &mut self.username,
            "email" => &mut self.email,
            "fname" => &mut self.fname,
            "lname" => &mut self.lname,
            "selfServiceActivationUrl" => &mut self.activation_url,
            _ => return,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    fn into_domain(self) -> Option<HostedUser> {
        let login = non_empty(self.username)?;
        let (username, domain) = login.rsplit_once('@')?;
        let full_name = format!(
            "{} {}",
            self.fname.unwrap_or_default(),
            self.lname.unwrap_or_default()
        )
        .trim()
        .to_string();

        Some(HostedUser {
            username: username.to_string(),
            domain: domain.to_string(),
            email: self.email.unwrap_or_default(),
            full_name,
            password: None,
            hosted_auth_id: non_empty(self.end_user_id),
            hosted_auth_url: non_empty(self.activation_url),
        })
    }
}

/// Name of the document's root element
pub fn root_element_name(document: &str) -> Result<String, ProvisioningError> {
    for event in EventReader::from_str(document) {
        match event {
            Ok(XmlEvent::StartElement { name, .. }) => return Ok(name.local_name),
            Ok(_) => continue,
            Err(e) => return Err(ProvisioningError::Parse(e.to_string())),
        }
    }
    Err(ProvisioningError::Parse("Document has no root element".to_string()))
}

/// Turn an `<error>` document into an error, pass anything else through
pub fn check_for_error(document: &str) -> Result<(), ProvisioningError> {
    if root_element_name(document)? != "error" {
        return Ok(());
    }

    let dto: ErrorDto = serde_xml_rs::from_str(document)
        .map_err(|e| ProvisioningError::Parse(e.to_string()))?;

    Err(ProvisioningError::Api {
        code: dto.code.unwrap_or_default(),
        message: dto.message.unwrap_or_default(),
    })
}

/// Parse a create or update response, `endUserId` is required
pub fn parse_end_user_response(document: &str) -> Result<EndUserResponse, ProvisioningError> {
    check_for_error(document)?;

    let dto: EndUserResponseDto = serde_xml_rs::from_str(document)
        .map_err(|e| ProvisioningError::Parse(e.to_string()))?;

    Ok(EndUserResponse {
        end_user_id: non_empty(dto.end_user_id).ok_or(ProvisioningError::MissingElement("endUserId"))?,
        activation_url: non_empty(dto.activation_url),
    })
}

/// Parse an activate response, the activation url is optional
pub fn parse_activation_url(document: &str) -> Result<Option<String>, ProvisioningError> {
    check_for_error(document)?;

    let dto: EndUserResponseDto = serde_xml_rs::from_str(document)
        .map_err(|e| ProvisioningError::Parse(e.to_string()))?;

    Ok(non_empty(dto.activation_url))
}

/// Parse a search response into hosted users
pub fn parse_search_response(document: &str) -> Result<Vec<HostedUser>, ProvisioningError> {
    check_for_error(document)?;

    // Walked by hand: iPass may put paging elements between the <endUser> entries
    let mut users = Vec::new();
    let mut current: Option<SearchUserDto> = None;
    let mut field: Option<String> = None;
    let mut depth = 0usize;

    for event in EventReader::from_str(document) {
        match event.map_err(|e| ProvisioningError::Parse(e.to_string()))? {
            XmlEvent::StartElement { name, .. } => {
                depth += 1;
                match depth {
                    2 if name.local_name == "endUser" => current = Some(SearchUserDto::default()),
                    3 if current.is_some() => field = Some(name.local_name),
                    _ => {}
                }
            }
            XmlEvent::Characters(text) | XmlEvent::CData(text) if depth == 3 => {
                if let (Some(user), Some(field)) = (current.as_mut(), field.as_deref()) {
                    user.append(field, &text);
                }
            }
            XmlEvent::EndElement { .. } => {
                match depth {
                    2 => users.extend(current.take()),
                    3 => field = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    Ok(users
        .into_iter()
        .filter_map(SearchUserDto::into_domain)
        .collect())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_response() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<endUser>
    <endUserId>123456</endUserId>
    <selfServiceActivationUrl>https://activate.ipass.com/x?t=abc</selfServiceActivationUrl>
</endUser>"#;

        let response = parse_end_user_response(xml).unwrap();
        assert_eq!(response.end_user_id, "123456");
        assert_eq!(response.activation_url.as_deref(), Some("https://activate.ipass.com/x?t=abc"));
    }

    #[test]
    fn test_parse_update_response_without_url() {
        let xml = "<endUser><endUserId>42</endUserId></endUser>";
        let response = parse_end_user_response(xml).unwrap();
        assert_eq!(response.end_user_id, "42");
        assert!(response.activation_url.is_none());
    }

    #[test]
    fn test_missing_end_user_id() {
        let xml = "<endUser><selfServiceActivationUrl>https://a</selfServiceActivationUrl></endUser>";
        let result = parse_end_user_response(xml);
        assert!(matches!(result, Err(ProvisioningError::MissingElement("endUserId"))));
    }

    #[test]
    fn test_error_document() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<error>
    <code>DUPLICATE_EMAIL</code>
    <message>Email already exists</message>
</error>"#;

        match parse_end_user_response(xml) {
            Err(ProvisioningError::Api { code, message }) => {
                assert_eq!(code, "DUPLICATE_EMAIL");
                assert_eq!(message, "Email already exists");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_xml() {
        assert!(matches!(
            parse_end_user_response("not xml at all <"),
            Err(ProvisioningError::Parse(_))
        ));
        assert!(matches!(root_element_name(""), Err(ProvisioningError::Parse(_))));
    }

    #[test]
    fn test_parse_activation_url() {
        let xml = "<endUser><selfServiceActivationUrl>https://new</selfServiceActivationUrl></endUser>";
        assert_eq!(parse_activation_url(xml).unwrap().as_deref(), Some("https://new"));

        let xml = "<endUser><status>ACTIVE</status></endUser>";
        assert!(parse_activation_url(xml).unwrap().is_none());
    }

    #[test]
    fn test_parse_search_response() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<endUsers>
    <endUser>
        <endUserId>1001</endUserId>
        <username>jdoe@example.com</username>
        <email>john@mail.com</email>
        <fname>John</fname>
        <lname>Doe</lname>
        <selfServiceActivationUrl>https://activate/1001</selfServiceActivationUrl>
    </endUser>
    <endUser>
        <endUserId>1002</endUserId>
        <username>jdoe2@example.com</username>
        <email>john2@mail.com</email>
        <fname>John</fname>
        <lname>Doe</lname>
    </endUser>
</endUsers>"#;

        let users = parse_search_response(xml).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "jdoe");
        assert_eq!(users[0].domain, "example.com");
        assert_eq!(users[0].full_name, "John Doe");
        assert_eq!(users[0].hosted_auth_id.as_deref(), Some("1001"));
        assert_eq!(users[0].hosted_auth_url.as_deref(), Some("https://activate/1001"));
        assert!(users[1].hosted_auth_url.is_none());
    }

    #[test]
    fn test_parse_search_response_with_interleaved_elements() {
        let xml = r#"<endUsers>
    <endUser><endUserId>1</endUserId><username>a@example.com</username></endUser>
    <totalCount>2</totalCount>
    <endUser><endUserId>2</endUserId><username>b@example.com</username></endUser>
</endUsers>"#;

        let users = parse_search_response(xml).unwrap();
        let ids: Vec<_> = users.iter().map(|u| u.hosted_auth_id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_parse_search_response_skips_entries_without_login() {
        let xml = "<endUsers><endUser><endUserId>1</endUserId></endUser></endUsers>";
        assert!(parse_search_response(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_empty_search_response() {
        let users = parse_search_response("<endUsers></endUsers>").unwrap();
        assert!(users.is_empty());
    }
}
