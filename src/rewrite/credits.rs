//! Credit and attribution removal
//!
//! Two independent passes run over a document:
//! 1. Text pass: an element whose lower-cased descendant text contains one of
//!    the configured phrases, and whose text is shorter than the length
//!    threshold, is removed.
//! 2. Selector pass: every element matching one of the configured selectors is
//!    removed.
//!
//! `html`, `head` and `body` are never removed.

use crate::config::CreditsConfig;
use crate::document::{parse_selector, Document, DocumentError, ElementId};
use scraper::Selector;
use tracing::trace;

/// Elements the passes never remove
const STRUCTURAL_ELEMENTS: &[&str] = &["html", "head", "body"];

/// Compiled credit removal policy
#[derive(Debug, Clone)]
pub struct CreditRules {
    phrases: Vec<String>,
    selectors: Vec<Selector>,
    max_text_length: usize,
}

impl CreditRules {
    /// Compiles the policy from configuration
    ///
    /// # Errors
    ///
    /// * `DocumentError::InvalidSelector` - a configured selector does not parse
    pub fn from_config(config: &CreditsConfig) -> Result<Self, DocumentError> {
        let selectors = config
            .selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;

        let phrases = config
            .phrases
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        Ok(Self {
            phrases,
            selectors,
            max_text_length: config.max_text_length,
        })
    }

    /// Runs both passes and returns the number of elements removed
    pub fn remove_credits(&self, doc: &mut Document) -> usize {
        self.text_pass(doc) + self.selector_pass(doc)
    }

    fn text_pass(&self, doc: &mut Document) -> usize {
        let mut removed = 0;

        for element in doc.elements() {
            if !self.removable(doc, element) {
                continue;
            }

            let text = doc.text(element);
            if text.chars().count() >= self.max_text_length {
                continue;
            }

            let lower = text.to_lowercase();
            if self.phrases.iter().any(|p| lower.contains(p.as_str())) {
                trace!(text = %text.trim(), "Removing credit text");
                doc.remove(element);
                removed += 1;
            }
        }

        removed
    }

    fn selector_pass(&self, doc: &mut Document) -> usize {
        let mut removed = 0;

        for selector in &self.selectors {
            for element in doc.select_with(selector) {
                if self.removable(doc, element) {
                    doc.remove(element);
                    removed += 1;
                }
            }
        }

        removed
    }

    fn removable(&self, doc: &Document, element: ElementId) -> bool {
        doc.is_attached(element)
            && doc
                .tag_name(element)
                .map_or(false, |name| !STRUCTURAL_ELEMENTS.contains(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> CreditRules {
        CreditRules::from_config(&CreditsConfig::default()).unwrap()
    }

    #[test]
    fn test_removes_short_credit_text() {
        let mut doc = Document::parse(
            r#"<body><main><h1>Welcome</h1></main><p>Website by <a href="https://agency.example">Agency</a></p></body>"#,
        );
        let removed = rules().remove_credits(&mut doc);

        assert!(removed >= 1);
        let html = doc.serialize();
        assert!(!html.contains("Website by"));
        assert!(html.contains("Welcome"));
    }

    #[test]
    fn test_matching_is_case_insensitive_and_italian() {
        let mut doc = Document::parse(
            "<body><div id=\"a\">Sito realizzato da Studio X</div><div id=\"b\">POWERED BY Engine</div><div id=\"c\">Ciao</div></body>",
        );
        rules().remove_credits(&mut doc);

        assert!(doc.select("#a").unwrap().is_empty());
        assert!(doc.select("#b").unwrap().is_empty());
        assert_eq!(doc.select("#c").unwrap().len(), 1);
    }

    #[test]
    fn test_long_text_is_kept() {
        let long = format!("{} made by our team", "x".repeat(200));
        let mut doc = Document::parse(&format!("<body><section>{}</section></body>", long));

        rules().remove_credits(&mut doc);

        assert_eq!(doc.select("section").unwrap().len(), 1);
    }

    #[test]
    fn test_threshold_boundary() {
        let config = CreditsConfig {
            max_text_length: 10,
            ..CreditsConfig::default()
        };
        let rules = CreditRules::from_config(&config).unwrap();

        // 9 characters: below the threshold, removed
        let mut doc = Document::parse("<body><span>x made by</span></body>");
        rules.remove_credits(&mut doc);
        assert!(doc.select("span").unwrap().is_empty());

        // exactly 10 characters: kept
        let mut doc = Document::parse("<body><span>xx made by</span></body>");
        rules.remove_credits(&mut doc);
        assert_eq!(doc.select("span").unwrap().len(), 1);
    }

    #[test]
    fn test_structural_elements_survive() {
        let mut doc = Document::parse(
            r#"<html class="author-theme"><head><title>Made by me</title></head><body class="credit">Made by me</body></html>"#,
        );
        rules().remove_credits(&mut doc);

        assert_eq!(doc.select("html").unwrap().len(), 1);
        assert_eq!(doc.select("head").unwrap().len(), 1);
        assert_eq!(doc.select("body").unwrap().len(), 1);
    }

    #[test]
    fn test_selector_pass() {
        let mut doc = Document::parse(
            r#"<body>
                <div class="site-credits">long text that has no trigger phrase in it at all</div>
                <div id="copyright-notice">2024</div>
                <span class="post-author">Jane</span>
                <div class="content">Keep</div>
            </body>"#,
        );
        rules().remove_credits(&mut doc);

        let html = doc.serialize();
        assert!(!html.contains("site-credits"));
        assert!(!html.contains("copyright-notice"));
        assert!(!html.contains("post-author"));
        assert!(html.contains("Keep"));
    }

    #[test]
    fn test_custom_policy() {
        let config = CreditsConfig {
            phrases: vec!["Hosted On".to_string()],
            selectors: vec![".badge".to_string()],
            ..CreditsConfig::default()
        };
        let rules = CreditRules::from_config(&config).unwrap();
        let mut doc = Document::parse(
            r#"<body><p>hosted on Somewhere</p><p>Made by me</p><i class="badge">b</i></body>"#,
        );
        rules.remove_credits(&mut doc);

        let html = doc.serialize();
        assert!(!html.contains("Somewhere"));
        assert!(html.contains("Made by me"));
        assert!(!html.contains("badge"));
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let config = CreditsConfig {
            selectors: vec!["[class*=".to_string()],
            ..CreditsConfig::default()
        };
        assert!(matches!(
            CreditRules::from_config(&config),
            Err(DocumentError::InvalidSelector { .. })
        ));
    }
}
