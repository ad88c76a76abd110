//! Element locators
//!
//! A [`Locator`] is a chain of steps resolved left to right against the page,
//! mirroring how Playwright composes `page.locator(..).nth(..).filter(..)`.
//! Locators are plain data: they serialise straight into bridge requests and
//! compare by value in tests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One refinement in a locator chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocatorStep {
    /// CSS selector, scoped to the previous step
    Css { selector: String },
    /// Element by `title` attribute
    Title { text: String },
    /// Form control by associated label text
    Label { text: String },
    /// ARIA role with optional accessible name
    Role { role: String, name: Option<String> },
    /// The n-th match of the previous step
    Nth { index: i32 },
    /// Keep matches whose text contains the given string
    HasText { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    steps: Vec<LocatorStep>,
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_step(LocatorStep::Css {
            selector: selector.into(),
        })
    }

    pub fn title(text: impl Into<String>) -> Self {
        Self::from_step(LocatorStep::Title { text: text.into() })
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self::from_step(LocatorStep::Label { text: text.into() })
    }

    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::from_step(LocatorStep::Role {
            role: role.into(),
            name: Some(name.into()),
        })
    }

    fn from_step(step: LocatorStep) -> Self {
        Self { steps: vec![step] }
    }

    fn then(&self, step: LocatorStep) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    /// Descendants of this locator matching `selector`
    pub fn locator(&self, selector: impl Into<String>) -> Self {
        self.then(LocatorStep::Css {
            selector: selector.into(),
        })
    }

    pub fn nth(&self, index: i32) -> Self {
        self.then(LocatorStep::Nth { index })
    }

    pub fn first(&self) -> Self {
        self.nth(0)
    }

    pub fn has_text(&self, text: impl Into<String>) -> Self {
        self.then(LocatorStep::HasText { text: text.into() })
    }

    pub fn steps(&self) -> &[LocatorStep] {
        &self.steps
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            match step {
                LocatorStep::Css { selector } => write!(f, "{}", selector)?,
                LocatorStep::Title { text } => write!(f, "title={:?}", text)?,
                LocatorStep::Label { text } => write!(f, "label={:?}", text)?,
                LocatorStep::Role { role, name: Some(name) } => {
                    write!(f, "role={}[name={:?}]", role, name)?
                }
                LocatorStep::Role { role, name: None } => write!(f, "role={}", role)?,
                LocatorStep::Nth { index } => write!(f, "nth={}", index)?,
                LocatorStep::HasText { text } => write!(f, "has-text={:?}", text)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_display() {
        let next = Locator::css(".pages-items")
            .nth(1)
            .locator(".pages-item-next a.action.next");
        assert_eq!(
            next.to_string(),
            ".pages-items >> nth=1 >> .pages-item-next a.action.next"
        );
    }

    #[test]
    fn test_chaining_does_not_mutate_parent() {
        let grid = Locator::css(".products-grid");
        let item = grid.locator(".product-item");
        assert_eq!(grid.steps().len(), 1);
        assert_eq!(item.steps().len(), 2);
    }

    #[test]
    fn test_serialises_tagged_steps() {
        let button = Locator::role("button", "Sign In");
        let json = serde_json::to_value(&button).unwrap();
        assert_eq!(json["steps"][0]["kind"], "role");
        assert_eq!(json["steps"][0]["name"], "Sign In");

        let filtered = Locator::css(".message-success").has_text("Thank you");
        let json = serde_json::to_value(&filtered).unwrap();
        assert_eq!(json["steps"][1]["kind"], "has_text");
    }
}
