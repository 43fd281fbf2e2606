//! The output format mini-language: a free-form string in which every
//! `{name}` and `{url}` is replaced verbatim. There is no escaping.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_FORMAT_TEMPLATE;

const NAME_PLACEHOLDER: &str = "{name}";
const URL_PLACEHOLDER: &str = "{url}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatTemplate(String);

impl FormatTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Substitutes all placeholders in a single left-to-right scan, so a
    /// substituted value is never itself scanned for placeholders.
    pub fn render(&self, name: &str, url: &str) -> String {
        let mut rendered = String::with_capacity(self.0.len() + name.len() + url.len());
        let mut rest = self.0.as_str();

        while let Some(start) = rest.find('{') {
            let (before, tail) = rest.split_at(start);
            rendered.push_str(before);

            if let Some(after) = tail.strip_prefix(NAME_PLACEHOLDER) {
                rendered.push_str(name);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(URL_PLACEHOLDER) {
                rendered.push_str(url);
                rest = after;
            } else {
                rendered.push('{');
                rest = tail.strip_prefix('{').unwrap_or_default();
            }
        }
        rendered.push_str(rest);

        rendered
    }
}

impl Default for FormatTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT_TEMPLATE)
    }
}

impl std::fmt::Display for FormatTemplate {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl std::str::FromStr for FormatTemplate {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err("Format template must not be empty".to_owned());
        }
        Ok(Self::new(input))
    }
}
