/// Infrastructure layer - external frameworks and tools
pub mod http_client;
pub mod invite_http;
pub mod invite_queue;

pub use http_client::IpassHttpClient;
pub use invite_http::{ApiCredentials, HttpInviteNotifier};
pub use invite_queue::QueueInviteNotifier;
