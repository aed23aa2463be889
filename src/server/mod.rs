//! Process-boundary adapters: ambient request state in, CGI documents out.

mod request;
mod response;

pub use request::{extract_page, AmbientRequest};
pub use response::write_cgi_response;
