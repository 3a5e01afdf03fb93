//! HTTP/1.1 framing for the reading upload: one POST per connection.

use core::fmt::{self, Write};

use heapless::String;

pub const REQUEST_HEAD_MAX: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Status line missing or not `HTTP/1.x NNN`
    MalformedStatusLine,
}

/// Request head for a JSON POST, terminated by the empty line.
pub fn post_head(
    host: &str,
    port: u16,
    path: &str,
    content_length: usize,
) -> Result<String<REQUEST_HEAD_MAX>, fmt::Error> {
    let mut head: String<REQUEST_HEAD_MAX> = String::new();
    write!(head, "POST {} HTTP/1.1\r\n", path)?;
    if port == 80 {
        write!(head, "Host: {}\r\n", host)?;
    } else {
        write!(head, "Host: {}:{}\r\n", host, port)?;
    }
    write!(head, "Content-Type: application/json\r\n")?;
    write!(head, "Content-Length: {}\r\n", content_length)?;
    write!(head, "Connection: close\r\n\r\n")?;
    Ok(head)
}

/// Offset of the first body byte, once the full header has been received.
pub fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|pos| pos + 4)
}

/// Status code from the first response line.
pub fn parse_status(response: &[u8]) -> Result<u16, Error> {
    let line_end = response
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(response.len());
    let line = core::str::from_utf8(&response[..line_end]).map_err(|_| Error::MalformedStatusLine)?;

    let mut parts = line.split(' ');
    let version = parts.next().ok_or(Error::MalformedStatusLine)?;
    if !version.starts_with("HTTP/1.") {
        return Err(Error::MalformedStatusLine);
    }

    let code = parts.next().ok_or(Error::MalformedStatusLine)?;
    if code.len() != 3 {
        return Err(Error::MalformedStatusLine);
    }
    code.parse().map_err(|_| Error::MalformedStatusLine)
}

pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_head_carries_exact_length() {
        let body = r#"{"light": 123.45, "timestamp": "Mon Jan 1 00:00:00 2024"}"#;
        let head = post_head("192.168.1.13", 5000, "/api/data", body.len()).unwrap();
        assert_eq!(
            head.as_str(),
            "POST /api/data HTTP/1.1\r\n\
             Host: 192.168.1.13:5000\r\n\
             Content-Type: application/json\r\n\
             Content-Length: 57\r\n\
             Connection: close\r\n\r\n"
        );
    }

    #[test]
    fn default_port_is_omitted_from_host() {
        let head = post_head("collector.local", 80, "/", 0).unwrap();
        assert!(head.contains("Host: collector.local\r\n"));
    }

    #[test]
    fn header_end_points_at_body() {
        let response = b"HTTP/1.1 200 OK\r\nContent-Length: 21\r\n\r\n{\"status\": \"success\"}";
        let end = find_header_end(response).unwrap();
        assert_eq!(&response[end..], b"{\"status\": \"success\"}");
        assert_eq!(find_header_end(b"HTTP/1.1 200 OK\r\n"), None);
    }

    #[test]
    fn status_codes() {
        assert_eq!(parse_status(b"HTTP/1.1 200 OK\r\nServer: x\r\n"), Ok(200));
        assert_eq!(parse_status(b"HTTP/1.0 400 BAD REQUEST\r\n"), Ok(400));
        assert_eq!(parse_status(b"HTTP/1.1 204\r\n"), Ok(204));
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(!is_success(400));
    }

    #[test]
    fn malformed_status_lines() {
        assert_eq!(parse_status(b""), Err(Error::MalformedStatusLine));
        assert_eq!(parse_status(b"SSH-2.0-OpenSSH"), Err(Error::MalformedStatusLine));
        assert_eq!(parse_status(b"HTTP/1.1 20 OK\r\n"), Err(Error::MalformedStatusLine));
        assert_eq!(parse_status(b"HTTP/1.1 abc OK\r\n"), Err(Error::MalformedStatusLine));
    }
}
