//! The recorded entity: one way the code under test let you down without failing.

use std::fmt;

use crate::tags::TagSet;

/// A single recorded disappointment.
///
/// The setters mutate in place and return `&mut Self` so they can be chained. The collector runtime wraps
/// these calls behind its store lock; this type itself knows nothing about locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disappointment {
    pub test_name: String,
    pub message: String,
    pub tags: TagSet,
    pub error: Option<String>,
}

impl Disappointment {
    /// Create a disappointment with tags deduplicated in first-occurrence order.
    pub fn new<I, S>(test_name: impl Into<String>, message: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            test_name: test_name.into(),
            message: message.into(),
            tags: tags.into_iter().collect(),
            error: None,
        }
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = message.into();
        self
    }

    /// Attach an error; only its rendered text is kept.
    pub fn set_error(&mut self, error: impl fmt::Display) -> &mut Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn add_tags<I, S>(&mut self, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags);
        self
    }
}

impl fmt::Display for Disappointment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tags.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{} ({})", self.message, self.tags)
        }
    }
}
