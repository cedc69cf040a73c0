//! Log line rendering for each verbosity level and outcome.
//!
//! ```text
//! info   start:    GET 'https://example.com/x'
//! info   response: 200 'https://example.com/x' [0.5000 s]
//! debug  start:    POST 'https://example.com/x': {"content-type": "application/json"} {"a":1}
//! debug  response: 200 'https://example.com/x' [0.5000 s]: {"content-type": "application/json"}
//!                  {
//!                    "a": 1
//!                  }
//! any    failure:  [Error] GET 'https://example.com/x' [0.0123 s]:
//!                  error sending request
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::Duration;

use http::HeaderMap;

use super::level::Level;
use super::sink::Severity;
use crate::events::{Outcome, RequestDescriptor, ResponseDescriptor, TransportError};

/// A formatted entry ready for a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub severity: Severity,
    pub message: String,
}

/// Render the start of a request, or `None` if `level` logs nothing at start.
pub fn started(level: Level, request: &RequestDescriptor) -> Option<String> {
    match level {
        Level::Debug => {
            let mut line = request_line(request);
            if !request.headers().is_empty() {
                line.push_str(": ");
                line.push_str(&headers(request.headers()));
            }
            if let Some(text) = request.body().and_then(|b| std::str::from_utf8(b).ok()) {
                if !text.is_empty() {
                    line.push(' ');
                    line.push_str(text);
                }
            }
            Some(line)
        }
        Level::Info => Some(request_line(request)),
        Level::Error | Level::Off => None,
    }
}

/// Render the completion of a request, or `None` if `level` logs nothing for
/// this outcome.
pub fn completed(
    level: Level,
    request: &RequestDescriptor,
    outcome: &Outcome,
    elapsed: Duration,
) -> Option<Rendered> {
    match outcome {
        Outcome::Failed(error) => match level {
            Level::Debug | Level::Info | Level::Error => Some(Rendered {
                severity: Severity::Error,
                message: failure(request, error, elapsed),
            }),
            Level::Off => None,
        },
        Outcome::Response(response) => {
            let message = match level {
                Level::Debug => response_block(request, response, elapsed),
                Level::Info => status_line(request, response, elapsed),
                Level::Error | Level::Off => return None,
            };
            Some(Rendered {
                severity: Severity::Info,
                message,
            })
        }
    }
}

fn request_line(request: &RequestDescriptor) -> String {
    format!("{} '{}'", request.method(), request.url())
}

fn status_line(request: &RequestDescriptor, response: &ResponseDescriptor, elapsed: Duration) -> String {
    format!(
        "{} '{}' {}",
        response.status().as_u16(),
        request.url(),
        seconds(elapsed)
    )
}

fn response_block(
    request: &RequestDescriptor,
    response: &ResponseDescriptor,
    elapsed: Duration,
) -> String {
    let mut block = format!(
        "{}: {}",
        status_line(request, response, elapsed),
        headers(response.headers())
    );
    if let Some(text) = response.body().and_then(|b| body(b)) {
        block.push('\n');
        block.push_str(&text);
    }
    block
}

fn failure(request: &RequestDescriptor, error: &TransportError, elapsed: Duration) -> String {
    format!(
        "[Error] {} '{}' {}:\n{}",
        request.method(),
        request.url(),
        seconds(elapsed),
        error
    )
}

fn seconds(elapsed: Duration) -> String {
    format!("[{:.4} s]", elapsed.as_secs_f64())
}

/// `{"name": "value", ...}` sorted by name; repeated names join their values.
pub fn headers(map: &HeaderMap) -> String {
    let mut fields: BTreeMap<&str, Vec<Cow<'_, str>>> = BTreeMap::new();
    for (name, value) in map {
        fields
            .entry(name.as_str())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()));
    }

    let rendered = fields
        .iter()
        .map(|(name, values)| format!("{:?}: {:?}", name, values.join(", ")))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", rendered)
}

/// Pretty JSON if the body parses as JSON, else the raw UTF-8 text, else nothing.
pub fn body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) {
        if let Ok(pretty) = serde_json::to_string_pretty(&value) {
            return Some(pretty);
        }
    }
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
    use http::{Method, StatusCode};
    use url::Url;

    fn get_x() -> RequestDescriptor {
        RequestDescriptor::new(Method::GET, Url::parse("https://example.com/x").unwrap())
    }

    fn ok_response() -> Outcome {
        ResponseDescriptor::new(StatusCode::OK).into()
    }

    fn offline() -> Outcome {
        TransportError::new("The Internet connection appears to be offline.").into()
    }

    #[test]
    fn test_info_lines() {
        assert_eq!(started(Level::Info, &get_x()).unwrap(), "GET 'https://example.com/x'");

        let rendered = completed(Level::Info, &get_x(), &ok_response(), Duration::from_millis(500)).unwrap();
        assert_eq!(rendered.severity, Severity::Info);
        assert_eq!(rendered.message, "200 'https://example.com/x' [0.5000 s]");
    }

    #[test]
    fn test_debug_start_with_headers_and_body() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        let request = RequestDescriptor::new(Method::POST, Url::parse("https://httpbin.org/post").unwrap())
            .with_headers(headers)
            .with_body(r#"{"key":"value"}"#);

        assert_eq!(
            started(Level::Debug, &request).unwrap(),
            r#"POST 'https://httpbin.org/post': {"accept": "*/*", "content-type": "application/json"} {"key":"value"}"#
        );
    }

    #[test]
    fn test_debug_start_without_headers_skips_binary_body() {
        let request = get_x().with_body(vec![0xff, 0xfe, 0x00]);
        assert_eq!(started(Level::Debug, &request).unwrap(), "GET 'https://example.com/x'");
    }

    #[test]
    fn test_error_and_off_are_silent_at_start() {
        assert!(started(Level::Error, &get_x()).is_none());
        assert!(started(Level::Off, &get_x()).is_none());
    }

    #[test]
    fn test_failure_logged_for_every_level_but_off() {
        for level in [Level::Debug, Level::Info, Level::Error] {
            let rendered = completed(level, &get_x(), &offline(), Duration::from_millis(12)).unwrap();
            assert_eq!(rendered.severity, Severity::Error);
            assert_eq!(
                rendered.message,
                "[Error] GET 'https://example.com/x' [0.0120 s]:\nThe Internet connection appears to be offline."
            );
        }
        assert!(completed(Level::Off, &get_x(), &offline(), Duration::ZERO).is_none());
    }

    #[test]
    fn test_success_silent_for_error_and_off() {
        assert!(completed(Level::Error, &get_x(), &ok_response(), Duration::ZERO).is_none());
        assert!(completed(Level::Off, &get_x(), &ok_response(), Duration::ZERO).is_none());
    }

    #[test]
    fn test_debug_response_pretty_prints_json() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let response = ResponseDescriptor::new(StatusCode::CREATED)
            .with_headers(headers)
            .with_body(r#"{"id":7,"tags":["a","b"]}"#);

        let rendered = completed(Level::Debug, &get_x(), &response.into(), Duration::from_secs(1)).unwrap();
        let (head, body) = rendered.message.split_once('\n').unwrap();
        assert_eq!(head, r#"201 'https://example.com/x' [1.0000 s]: {"content-type": "application/json"}"#);

        let logged: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(logged, serde_json::json!({"id": 7, "tags": ["a", "b"]}));
        assert!(body.contains("\n  "));
    }

    #[test]
    fn test_debug_response_falls_back_to_text() {
        let response = ResponseDescriptor::new(StatusCode::OK).with_body("plain <b>text</b>");
        let rendered = completed(Level::Debug, &get_x(), &response.into(), Duration::ZERO).unwrap();
        assert_eq!(rendered.message, "200 'https://example.com/x' [0.0000 s]: {}\nplain <b>text</b>");
    }

    #[test]
    fn test_debug_response_omits_undecodable_body() {
        let response = ResponseDescriptor::new(StatusCode::OK).with_body(vec![0xc3, 0x28]);
        let rendered = completed(Level::Debug, &get_x(), &response.into(), Duration::ZERO).unwrap();
        assert_eq!(rendered.message, "200 'https://example.com/x' [0.0000 s]: {}");
    }

    #[test]
    fn test_repeated_headers_are_joined() {
        let mut map = HeaderMap::new();
        map.append("set-cookie", HeaderValue::from_static("a=1"));
        map.append("set-cookie", HeaderValue::from_static("b=2"));
        assert_eq!(headers(&map), r#"{"set-cookie": "a=1, b=2"}"#);
    }
}
