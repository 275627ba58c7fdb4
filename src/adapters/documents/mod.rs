//! Document adapter - converts between domain types and the iPass document format

pub mod request;
pub mod response;

pub use request::{end_user_document, username_document, DocumentSettings};
pub use response::{
    check_for_error, parse_activation_url, parse_end_user_response, parse_search_response,
    EndUserResponse,
};
