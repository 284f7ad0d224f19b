//! Decide from the response head whether a body is an artifact worth keeping.
//!
//! Kept free of curl so the rules can be tested on plain header lines.

use std::fmt;

/// Why a response was not saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Status other than 200.
    Status(u32),
    /// Status 200 but the Content-Type did not contain the accepted type.
    ContentType(Option<String>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Status(code) => write!(f, "HTTP {}", code),
            SkipReason::ContentType(Some(ct)) => write!(f, "Content-Type {:?}", ct),
            SkipReason::ContentType(None) => write!(f, "no Content-Type"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Skip(SkipReason),
}

/// Accept iff `status` is exactly 200 and `content_type` contains `accepted`.
///
/// Containment is a case-sensitive substring test: `application/pdf; charset=binary`
/// is accepted, and so is any other value that merely embeds the accepted string.
pub fn classify_response(status: u32, content_type: Option<&str>, accepted: &str) -> Verdict {
    if status != 200 {
        return Verdict::Skip(SkipReason::Status(status));
    }
    match content_type {
        Some(ct) if ct.contains(accepted) => Verdict::Accept,
        other => Verdict::Skip(SkipReason::ContentType(other.map(str::to_string))),
    }
}

/// Parse the status code out of `HTTP/1.1 200 OK` or `HTTP/2 404`.
pub fn parse_status_line(line: &str) -> Option<u32> {
    let mut parts = line.split_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    let code = parts.next()?;
    if code.len() != 3 {
        return None;
    }
    code.parse().ok()
}

/// Status and Content-Type of the most recent response, built from raw header lines.
///
/// A new status line starts a new head, so after redirects or `100 Continue`
/// only the final response is described.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: Option<u32>,
    pub content_type: Option<String>,
}

impl ResponseHead {
    pub fn observe_line(&mut self, line: &str) {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(code) = parse_status_line(line) {
            *self = ResponseHead {
                status: Some(code),
                content_type: None,
            };
            return;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-type") {
                self.content_type = Some(value.trim().to_string());
            }
        }
    }

    /// A head without a status line is reported as status 0.
    pub fn verdict(&self, accepted: &str) -> Verdict {
        classify_response(
            self.status.unwrap_or(0),
            self.content_type.as_deref(),
            accepted,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDF: &str = "application/pdf";

    #[test]
    fn ok_pdf_is_accepted() {
        assert_eq!(classify_response(200, Some("application/pdf"), PDF), Verdict::Accept);
        assert_eq!(
            classify_response(200, Some("application/pdf; charset=binary"), PDF),
            Verdict::Accept
        );
    }

    #[test]
    fn substring_match_is_loose() {
        assert_eq!(
            classify_response(200, Some("x-application/pdf-preview"), PDF),
            Verdict::Accept
        );
    }

    #[test]
    fn match_is_case_sensitive() {
        assert_eq!(
            classify_response(200, Some("Application/PDF"), PDF),
            Verdict::Skip(SkipReason::ContentType(Some("Application/PDF".to_string())))
        );
    }

    #[test]
    fn wrong_or_missing_content_type_is_skipped() {
        assert_eq!(
            classify_response(200, Some("text/html; charset=utf-8"), PDF),
            Verdict::Skip(SkipReason::ContentType(Some("text/html; charset=utf-8".to_string())))
        );
        assert_eq!(
            classify_response(200, None, PDF),
            Verdict::Skip(SkipReason::ContentType(None))
        );
    }

    #[test]
    fn non_200_is_skipped_even_for_pdf() {
        assert_eq!(
            classify_response(404, Some("text/html"), PDF),
            Verdict::Skip(SkipReason::Status(404))
        );
        assert_eq!(
            classify_response(206, Some(PDF), PDF),
            Verdict::Skip(SkipReason::Status(206))
        );
        assert_eq!(
            classify_response(500, Some(PDF), PDF),
            Verdict::Skip(SkipReason::Status(500))
        );
    }

    #[test]
    fn status_lines() {
        assert_eq!(parse_status_line("HTTP/1.1 200 OK"), Some(200));
        assert_eq!(parse_status_line("HTTP/2 404"), Some(404));
        assert_eq!(parse_status_line("HTTP/1.0 301 Moved Permanently"), Some(301));
        assert_eq!(parse_status_line("Content-Type: text/html"), None);
        assert_eq!(parse_status_line("HTTP/1.1 20 OK"), None);
        assert_eq!(parse_status_line(""), None);
    }

    #[test]
    fn head_tracks_final_response_after_redirect() {
        let mut head = ResponseHead::default();
        for line in [
            "HTTP/1.1 302 Found\r\n",
            "Location: /elsewhere\r\n",
            "Content-Type: text/html\r\n",
            "\r\n",
            "HTTP/1.1 200 OK\r\n",
            "content-type: application/pdf\r\n",
            "\r\n",
        ] {
            head.observe_line(line);
        }
        assert_eq!(head.status, Some(200));
        assert_eq!(head.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(head.verdict(PDF), Verdict::Accept);
    }

    #[test]
    fn head_without_status_is_skipped() {
        let head = ResponseHead::default();
        assert_eq!(head.verdict(PDF), Verdict::Skip(SkipReason::Status(0)));
    }

    #[test]
    fn skip_reason_display() {
        assert_eq!(SkipReason::Status(404).to_string(), "HTTP 404");
        assert_eq!(
            SkipReason::ContentType(Some("text/html".into())).to_string(),
            "Content-Type \"text/html\""
        );
        assert_eq!(SkipReason::ContentType(None).to_string(), "no Content-Type");
    }
}
