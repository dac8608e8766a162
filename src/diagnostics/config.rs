/*!
# Diagnostics Configuration

One switch per rule category. Every switch defaults to enabled, so a
configuration file only has to list what it turns off:

```toml
duplicate_operand = false
column_overflow = false
```

TOML and YAML files are supported; the format is picked from the file
extension.
*/

use super::Category;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_true")]
    pub unknown_statement: bool,
    #[serde(default = "default_true")]
    pub invalid_language_id: bool,
    #[serde(default = "default_true")]
    pub unbalanced_parentheses: bool,
    #[serde(default = "default_true")]
    pub missing_terminator: bool,
    #[serde(default = "default_true")]
    pub missing_parameter: bool,
    #[serde(default = "default_true")]
    pub malformed_parameter: bool,
    #[serde(default = "default_true")]
    pub parameter_too_long: bool,
    #[serde(default = "default_true")]
    pub unknown_operand: bool,
    #[serde(default = "default_true")]
    pub duplicate_operand: bool,
    #[serde(default = "default_true")]
    pub empty_operand_parameter: bool,
    #[serde(default = "default_true")]
    pub operand_parameter_too_long: bool,
    #[serde(default = "default_true")]
    pub unknown_sub_operand: bool,
    #[serde(default = "default_true")]
    pub empty_sub_operand: bool,
    #[serde(default = "default_true")]
    pub sub_operand_too_long: bool,
    #[serde(default = "default_true")]
    pub missing_required_operand: bool,
    #[serde(default = "default_true")]
    pub dependency_violation: bool,
    #[serde(default = "default_true")]
    pub mutually_exclusive: bool,
    #[serde(default = "default_true")]
    pub required_group: bool,
    #[serde(default = "default_true")]
    pub move_statement: bool,
    #[serde(default = "default_true")]
    pub missing_inline_data: bool,
    #[serde(default = "default_true")]
    pub column_overflow: bool,
    #[serde(default = "default_true")]
    pub standalone_comment: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self::all(true)
    }
}

impl DiagnosticsConfig {
    /// Configuration with every category set to `enabled`.
    pub fn all(enabled: bool) -> Self {
        Self {
            unknown_statement: enabled,
            invalid_language_id: enabled,
            unbalanced_parentheses: enabled,
            missing_terminator: enabled,
            missing_parameter: enabled,
            malformed_parameter: enabled,
            parameter_too_long: enabled,
            unknown_operand: enabled,
            duplicate_operand: enabled,
            empty_operand_parameter: enabled,
            operand_parameter_too_long: enabled,
            unknown_sub_operand: enabled,
            empty_sub_operand: enabled,
            sub_operand_too_long: enabled,
            missing_required_operand: enabled,
            dependency_violation: enabled,
            mutually_exclusive: enabled,
            required_group: enabled,
            move_statement: enabled,
            missing_inline_data: enabled,
            column_overflow: enabled,
            standalone_comment: enabled,
        }
    }

    fn switch_mut(&mut self, category: Category) -> &mut bool {
        match category {
            Category::UnknownStatement => &mut self.unknown_statement,
            Category::InvalidLanguageId => &mut self.invalid_language_id,
            Category::UnbalancedParentheses => &mut self.unbalanced_parentheses,
            Category::MissingTerminator => &mut self.missing_terminator,
            Category::MissingParameter => &mut self.missing_parameter,
            Category::MalformedParameter => &mut self.malformed_parameter,
            Category::ParameterTooLong => &mut self.parameter_too_long,
            Category::UnknownOperand => &mut self.unknown_operand,
            Category::DuplicateOperand => &mut self.duplicate_operand,
            Category::EmptyOperandParameter => &mut self.empty_operand_parameter,
            Category::OperandParameterTooLong => &mut self.operand_parameter_too_long,
            Category::UnknownSubOperand => &mut self.unknown_sub_operand,
            Category::EmptySubOperand => &mut self.empty_sub_operand,
            Category::SubOperandTooLong => &mut self.sub_operand_too_long,
            Category::MissingRequiredOperand => &mut self.missing_required_operand,
            Category::DependencyViolation => &mut self.dependency_violation,
            Category::MutuallyExclusive => &mut self.mutually_exclusive,
            Category::RequiredGroup => &mut self.required_group,
            Category::MoveStatement => &mut self.move_statement,
            Category::MissingInlineData => &mut self.missing_inline_data,
            Category::ColumnOverflow => &mut self.column_overflow,
            Category::StandaloneComment => &mut self.standalone_comment,
        }
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::UnknownStatement => self.unknown_statement,
            Category::InvalidLanguageId => self.invalid_language_id,
            Category::UnbalancedParentheses => self.unbalanced_parentheses,
            Category::MissingTerminator => self.missing_terminator,
            Category::MissingParameter => self.missing_parameter,
            Category::MalformedParameter => self.malformed_parameter,
            Category::ParameterTooLong => self.parameter_too_long,
            Category::UnknownOperand => self.unknown_operand,
            Category::DuplicateOperand => self.duplicate_operand,
            Category::EmptyOperandParameter => self.empty_operand_parameter,
            Category::OperandParameterTooLong => self.operand_parameter_too_long,
            Category::UnknownSubOperand => self.unknown_sub_operand,
            Category::EmptySubOperand => self.empty_sub_operand,
            Category::SubOperandTooLong => self.sub_operand_too_long,
            Category::MissingRequiredOperand => self.missing_required_operand,
            Category::DependencyViolation => self.dependency_violation,
            Category::MutuallyExclusive => self.mutually_exclusive,
            Category::RequiredGroup => self.required_group,
            Category::MoveStatement => self.move_statement,
            Category::MissingInlineData => self.missing_inline_data,
            Category::ColumnOverflow => self.column_overflow,
            Category::StandaloneComment => self.standalone_comment,
        }
    }

    pub fn set_enabled(&mut self, category: Category, enabled: bool) {
        *self.switch_mut(category) = enabled;
    }

    pub fn with_disabled(mut self, category: Category) -> Self {
        self.set_enabled(category, false);
        self
    }

    pub fn with_only(categories: &[Category]) -> Self {
        let mut config = Self::all(false);
        for &category in categories {
            config.set_enabled(category, true);
        }
        config
    }

    pub fn disabled_categories(&self) -> Vec<Category> {
        Category::ALL
            .iter()
            .copied()
            .filter(|&category| !self.is_enabled(category))
            .collect()
    }

    /// Loads a configuration, choosing TOML or YAML by extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let is_yaml = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        if is_yaml {
            Self::load_from_yaml(path)
        } else {
            Self::load_from_file(path)
        }
    }

    /// Loads a TOML configuration.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read diagnostics config from {}",
                path.as_ref().display()
            )
        })?;

        let config: Self = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse diagnostics config from {}",
                path.as_ref().display()
            )
        })?;

        tracing::debug!("Loaded diagnostics config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read diagnostics config from {}",
                path.as_ref().display()
            )
        })?;

        let config: Self = serde_yaml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse YAML diagnostics config from {}",
                path.as_ref().display()
            )
        })?;

        Ok(config)
    }

    /// Writes the configuration as TOML.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize diagnostics config to TOML")?;

        std::fs::write(&path, content).with_context(|| {
            format!(
                "Failed to write diagnostics config to {}",
                path.as_ref().display()
            )
        })?;

        Ok(())
    }

    /// Returns warnings about suspicious settings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let disabled = self.disabled_categories();

        if disabled.len() == Category::ALL.len() {
            warnings.push("All diagnostic categories are disabled".to_string());
        }
        if !self.unbalanced_parentheses && !self.missing_terminator {
            warnings.push(
                "Both unbalanced_parentheses and missing_terminator are disabled; \
                 statement boundary errors will go unreported"
                    .to_string(),
            );
        }
        warnings
    }
}
