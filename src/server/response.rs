use std::io::{self, Write};

use http::Response;

use crate::handler::Body;

/// Write `response` as a CGI document: a `Status:` line, the headers, a
/// blank line, then the body.
pub fn write_cgi_response<W: Write>(response: &Response<Body>, out: &mut W) -> io::Result<()> {
    let status = response.status();
    match status.canonical_reason() {
        Some(reason) => write!(out, "Status: {} {}\r\n", status.as_u16(), reason)?,
        None => write!(out, "Status: {}\r\n", status.as_u16())?,
    }
    for (name, value) in response.headers() {
        out.write_all(name.as_str().as_bytes())?;
        out.write_all(b": ")?;
        out.write_all(value.as_bytes())?;
        out.write_all(b"\r\n")?;
    }
    out.write_all(b"\r\n")?;
    out.write_all(response.body())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;
    use http::StatusCode;

    #[test]
    fn test_cgi_document_layout() {
        let response = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header(CONTENT_TYPE, "text/html")
            .body(b"gone".to_vec())
            .unwrap();
        let mut out = Vec::new();
        write_cgi_response(&response, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Status: 404 Not Found\r\ncontent-type: text/html\r\n\r\ngone"
        );
    }
}
