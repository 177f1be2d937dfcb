//! `key = value` text grouped under `## Annotation` headers.

use crate::error::DeclarationError;
use crate::key::Key;
use crate::option::{ConfigOption, Flags};

use super::Describe;

#[derive(Debug, Default)]
pub struct IniDescriber {
    output: String,
}

impl Describe for IniDescriber {
    fn annotate(&mut self, annotation: &str) {
        self.output.push_str("\n## ");
        self.output.push_str(annotation);
        self.output.push('\n');
    }

    fn add_option(&mut self, key: &Key, option: &ConfigOption) {
        if option.has_flag(Flags::DISABLED) {
            self.output.push_str("# ");
        }
        let value = option.str_value();
        if value.is_empty() {
            self.output.push_str(&format!("{key} =\n"));
        } else {
            self.output.push_str(&format!("{key} = {value}\n"));
        }
    }

    fn finalize(self) -> Result<String, DeclarationError> {
        Ok(self.output)
    }
}
