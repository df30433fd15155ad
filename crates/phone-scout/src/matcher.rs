//! Title-to-model matching.
//!
//! A listing title matches a catalog model when every distinguishing token of
//! the model name (brand/family prefix removed) appears in the title as an
//! uppercase substring. Order is ignored and there is no fuzzy matching, so a
//! miss is always preferred over a wrong listing.

/// Brand and family phrase shared by every model in the default catalog.
pub const DEFAULT_BRAND_PREFIX: &str = "Samsung Galaxy";

/// Conjunctive substring matcher for one brand/family prefix.
#[derive(Debug, Clone)]
pub struct ModelMatcher {
    prefix: String,
}

impl Default for ModelMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_BRAND_PREFIX)
    }
}

impl ModelMatcher {
    /// Create a matcher that strips `prefix` from the front of model names.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim().to_uppercase(),
        }
    }

    /// Uppercased tokens of `model_name` left after removing the leading prefix.
    pub fn key_terms(&self, model_name: &str) -> Vec<String> {
        let upper = model_name.trim().to_uppercase();
        let rest = if !self.prefix.is_empty() && upper.starts_with(&self.prefix) {
            &upper[self.prefix.len()..]
        } else {
            upper.as_str()
        };
        rest.split_whitespace().map(str::to_string).collect()
    }

    /// Does `title` name the catalog model `model_name`?
    ///
    /// A model that reduces to no tokens matches nothing.
    pub fn matches(&self, title: &str, model_name: &str) -> bool {
        let terms = self.key_terms(model_name);
        if terms.is_empty() {
            return false;
        }
        let title = title.to_uppercase();
        terms.iter().all(|term| title.contains(term.as_str()))
    }
}

/// Match with the default brand prefix.
pub fn matches(title: &str, model_name: &str) -> bool {
    ModelMatcher::default().matches(title, model_name)
}
