//! Rust source that re-creates the declarations.
//!
//! The output is a list of statements for a function body returning
//! `Result<_, DeclarationError>` with `declaration: &mut Declaration`, `Key`,
//! `DefaultValue` and `serde_json::json` in scope.

use std::fmt::Write;

use crate::error::DeclarationError;
use crate::key::Key;
use crate::option::{ConfigOption, DefaultValue, Flags, Validator};

use super::Describe;

const FLAG_SETTERS: [(Flags, &str); 6] = [
    (Flags::DISABLED, "disable"),
    (Flags::IGNORED, "ignore"),
    (Flags::INTERNAL, "internal"),
    (Flags::EXPERIMENTAL, "experimental"),
    (Flags::NO_DEFAULT, "no_default"),
    (Flags::REQUIRED, "required"),
];

#[derive(Debug, Default)]
pub struct CodeDescriber {
    output: String,
}

impl Describe for CodeDescriber {
    fn annotate(&mut self, annotation: &str) {
        let _ = write!(self.output, "\ndeclaration.annotate({annotation:?})?;\n");
    }

    fn add_option(&mut self, key: &Key, option: &ConfigOption) {
        let default = match option.default_value() {
            DefaultValue::Unset => "DefaultValue::Unset".to_string(),
            DefaultValue::Value(value) => format!("json!({value})"),
        };
        let _ = write!(
            self.output,
            "declaration.declare(Key::parse({:?})?, {default})?",
            key.to_string()
        );
        for (flag, setter) in FLAG_SETTERS {
            if option.has_flag(flag) {
                let _ = write!(self.output, ".{setter}()");
            }
        }
        if let Some(description) = option.description() {
            let _ = write!(self.output, ".set_description({description:?})");
        }
        if !option.validators().is_empty() {
            let validators = Validator::join(option.validators());
            let _ = write!(self.output, ".set_validators({validators:?})");
        }
        self.output.push_str(";\n");
    }

    fn finalize(self) -> Result<String, DeclarationError> {
        Ok(self.output)
    }
}
