//! Best-effort pattern extraction from the gate's landing page.
//!
//! The viewer's markup is an external, unversioned format that the remote can
//! change at any time. Everything that reads it lives here, behind
//! [`ExtractionRules`], so format drift is a contained, testable unit rather
//! than string checks scattered across the pipeline. Callers can override any
//! rule through [`crate::config::RetrievalConfigBuilder::extraction`].
//!
//! Extraction is degraded-info, never an error: a body that matches nothing
//! yields `None` fields and `false` flags.

use once_cell::sync::Lazy;
use regex::Regex;

/// Landing-page substring present iff the gate asks for a passcode.
pub const DEFAULT_PASSCODE_MARKER: &str = "visitor[passcode]";

/// Landing-page substring present iff the gate asks for an email address.
pub const DEFAULT_EMAIL_MARKER: &str = "visitor[email]";

/// Substring the gate embeds in an authentication response it rejected,
/// even when the HTTP status still reads 200.
pub const DEFAULT_REJECTION_MARKER: &str = "review the problems";

static DEFAULT_AUTH_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"name="authenticity_token"\s+value="(?P<token>[^"]+)""#)
        .unwrap_or_else(|e| panic!("default auth token pattern: {e}"))
});

static DEFAULT_PAGE_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""pages":\s*(?P<count>\d+)"#)
        .unwrap_or_else(|e| panic!("default page count pattern: {e}"))
});

/// The patterns used to scan the gate's free-form markup.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    /// Substring marking an email field on the landing page.
    pub email_marker: String,
    /// Substring marking a passcode field on the landing page.
    pub passcode_marker: String,
    /// Substring marking a rejected authentication response body.
    pub rejection_marker: String,
    /// Pattern capturing the one-time form token as `token`.
    pub auth_token: Regex,
    /// Pattern capturing the reported page count as `count`.
    pub page_count: Regex,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            email_marker: DEFAULT_EMAIL_MARKER.to_string(),
            passcode_marker: DEFAULT_PASSCODE_MARKER.to_string(),
            rejection_marker: DEFAULT_REJECTION_MARKER.to_string(),
            auth_token: DEFAULT_AUTH_TOKEN.clone(),
            page_count: DEFAULT_PAGE_COUNT.clone(),
        }
    }
}

/// What a landing-page scan discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingFacts {
    pub requires_email: bool,
    pub requires_passcode: bool,
    /// Retrievable page count, or `None` when the pattern did not match.
    pub page_count: Option<usize>,
    /// One-time form token, or `None` when the pattern did not match.
    pub auth_token: Option<String>,
}

impl ExtractionRules {
    /// Scan a landing-page body. Pure text search, no HTML parsing.
    pub fn scan(&self, html: &str) -> LandingFacts {
        LandingFacts {
            requires_email: html.contains(&self.email_marker),
            requires_passcode: html.contains(&self.passcode_marker),
            page_count: self.scan_page_count(html),
            auth_token: self
                .auth_token
                .captures(html)
                .map(|c| c["token"].to_string()),
        }
    }

    /// `true` if an authentication response body carries the gate's
    /// rejection marker.
    pub fn is_rejection(&self, body: &str) -> bool {
        body.contains(&self.rejection_marker)
    }

    fn scan_page_count(&self, html: &str) -> Option<usize> {
        let reported: usize = self
            .page_count
            .captures(html)?
            .name("count")?
            .as_str()
            .parse()
            .ok()?;
        // The viewer reports one more page than is retrievable — apparently a
        // placeholder page the remote counts. Unverified domain knowledge,
        // preserved as observed.
        Some(reported.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDING: &str = r#"
        <html><body>
        <script>var viewer = {"pages": 6};</script>
        <form action="/view/abc123" method="post">
          <input type="hidden" name="authenticity_token" value="tok-123abc">
          <input type="email" name="visitor[email]">
          <input type="password" name="visitor[passcode]">
        </form>
        </body></html>"#;

    #[test]
    fn scan_gated_landing_page() {
        let facts = ExtractionRules::default().scan(LANDING);
        assert!(facts.requires_email);
        assert!(facts.requires_passcode);
        assert_eq!(facts.auth_token.as_deref(), Some("tok-123abc"));
    }

    #[test]
    fn page_count_is_reported_minus_one() {
        let facts = ExtractionRules::default().scan(LANDING);
        assert_eq!(facts.page_count, Some(5));
    }

    #[test]
    fn page_count_of_zero_does_not_underflow() {
        let facts = ExtractionRules::default().scan(r#"{"pages": 0}"#);
        assert_eq!(facts.page_count, Some(0));
    }

    #[test]
    fn unparsable_body_degrades_to_none() {
        let facts = ExtractionRules::default().scan("<html><body>hello</body></html>");
        assert!(!facts.requires_email);
        assert!(!facts.requires_passcode);
        assert_eq!(facts.page_count, None);
        assert_eq!(facts.auth_token, None);
    }

    #[test]
    fn scanning_is_idempotent() {
        let rules = ExtractionRules::default();
        assert_eq!(rules.scan(LANDING), rules.scan(LANDING));
    }

    #[test]
    fn rejection_marker_detected() {
        let rules = ExtractionRules::default();
        assert!(rules.is_rejection("<p>Please review the problems below</p>"));
        assert!(!rules.is_rejection("<p>Welcome</p>"));
    }
}
