/*!
# Statement Schema Store

Read-only catalog of MCS statement definitions. Each statement lists its
operands, each operand lists the nested values (sub-operands) it accepts.

The store is loaded from JSON and never changes after loading, so a single
instance can be shared between threads behind an `Arc`.

## Schema format

```json
{
  "operandSets": { "dataSource": [ { "name": "RELFILE", "parameter": "number", "length": 4 } ] },
  "statements": [
    {
      "name": "++MAC",
      "parameter": "name",
      "parameterLength": 8,
      "inlineData": true,
      "include": ["dataSource"],
      "operands": [
        { "name": "DISTLIB", "parameter": "ddname", "length": 8 },
        { "name": "FROMDS", "parameter": "dataset",
          "values": [ { "name": "DSN", "type": "string", "length": 44 } ] }
      ]
    }
  ]
}
```

Operand names may declare aliases separated by `|` (`"DESC|DESCRIPTION"`);
`mutuallyExclusive` uses the same separator.
*/

pub mod languages;

use crate::core::SchemaError;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

pub use languages::{is_language_code, is_variant_base, LANGUAGE_CODES, LANGUAGE_VARIANT_BASES};

/// Built-in SMP/E statement catalog.
const BUILTIN_SCHEMA: &str = include_str!("smpe.json");

static BUILTIN: Lazy<std::result::Result<Arc<SchemaStore>, String>> = Lazy::new(|| {
    SchemaStore::from_json(BUILTIN_SCHEMA)
        .map(Arc::new)
        .map_err(|e| format!("{:#}", e))
});

/// Nested value accepted inside an operand, e.g. `DSN` inside `FROMDS(...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubOperandDefinition {
    pub name: String,
    pub value_type: String,
    /// Maximum length of the value; zero means unconstrained and optional.
    pub max_length: usize,
    pub description: Option<String>,
}

/// Definition of one statement operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandDefinition {
    /// Accepted spellings; the first one is the canonical name.
    pub aliases: Vec<String>,
    pub description: Option<String>,
    /// Human-readable hint for the parameter; `None` for flag operands.
    pub parameter_hint: Option<String>,
    pub max_length: usize,
    pub required: bool,
    pub required_group: Option<String>,
    pub allowed_if: Option<String>,
    pub mutually_exclusive_with: Vec<String>,
    pub sub_operands: Vec<Arc<SubOperandDefinition>>,
}

impl OperandDefinition {
    pub fn name(&self) -> &str {
        self.aliases.first().map(String::as_str).unwrap_or_default()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.aliases.iter().any(|alias| alias == name)
    }

    pub fn expects_parameter(&self) -> bool {
        self.parameter_hint
            .as_deref()
            .map_or(false, |hint| !hint.is_empty())
    }

    pub fn has_sub_operands(&self) -> bool {
        !self.sub_operands.is_empty()
    }

    pub fn find_sub_operand(&self, name: &str) -> Option<&Arc<SubOperandDefinition>> {
        self.sub_operands.iter().find(|value| value.name == name)
    }

    /// Aliases joined the way they are written in the schema.
    pub fn display_name(&self) -> String {
        self.aliases.join("|")
    }
}

/// Definition of one MCS statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementDefinition {
    pub name: String,
    pub description: Option<String>,
    /// Hint for the statement's own parameter (`++PTF(sysmod-id)`).
    pub parameter: Option<String>,
    pub max_parameter_length: usize,
    pub operands: Vec<Arc<OperandDefinition>>,
    pub accepts_language_variant: bool,
    pub expects_inline_data: bool,
}

impl StatementDefinition {
    pub fn expects_parameter(&self) -> bool {
        self.parameter.as_deref().map_or(false, |p| !p.is_empty())
    }

    /// Resolves any alias to its operand definition.
    pub fn find_operand(&self, name: &str) -> Option<&Arc<OperandDefinition>> {
        self.operands.iter().find(|operand| operand.matches(name))
    }

    /// Required groups in order of first appearance, with their members.
    pub fn required_groups(&self) -> Vec<(&str, Vec<&Arc<OperandDefinition>>)> {
        let mut groups: Vec<(&str, Vec<&Arc<OperandDefinition>>)> = Vec::new();
        for operand in &self.operands {
            let Some(group) = operand.required_group.as_deref() else {
                continue;
            };
            match groups.iter_mut().find(|(id, _)| *id == group) {
                Some((_, members)) => members.push(operand),
                None => groups.push((group, vec![operand])),
            }
        }
        groups
    }
}

/// How a statement name relates to the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StatementClass {
    /// Name found as written.
    Known,
    /// Base name plus a valid national language suffix (`++MSGENU`).
    LanguageVariant { base: String, language: String },
    /// Variant-capable base with a suffix that is not a language code.
    InvalidLanguage { base: String, suffix: String },
    /// Nothing matched.
    Unknown,
}

/// Result of resolving a statement name against the store.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub class: StatementClass,
    pub definition: Option<Arc<StatementDefinition>>,
}

impl Resolution {
    /// Language suffix carried by the name, empty when there is none.
    pub fn language_id(&self) -> &str {
        match &self.class {
            StatementClass::LanguageVariant { language, .. } => language,
            StatementClass::InvalidLanguage { suffix, .. } => suffix,
            StatementClass::Known | StatementClass::Unknown => "",
        }
    }
}

/// Name-indexed catalog of statement definitions.
#[derive(Debug, Clone, Default)]
pub struct SchemaStore {
    statements: HashMap<String, Arc<StatementDefinition>>,
    order: Vec<String>,
}

impl SchemaStore {
    /// Returns the embedded SMP/E schema.
    pub fn builtin() -> Result<Arc<SchemaStore>> {
        BUILTIN
            .as_ref()
            .map(Arc::clone)
            .map_err(|e| anyhow::anyhow!("Built-in schema is invalid: {}", e))
    }

    /// Loads a schema from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema from {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to load schema from {}", path.display()))
    }

    /// Parses and validates a schema document.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawSchema = serde_json::from_str(json).context("Failed to parse schema JSON")?;
        let store = raw.into_store()?;
        tracing::debug!("Loaded schema with {} statements", store.len());
        Ok(store)
    }

    /// Builds a store from already constructed definitions.
    pub fn from_definitions<I>(definitions: I) -> std::result::Result<Self, SchemaError>
    where
        I: IntoIterator<Item = StatementDefinition>,
    {
        let mut store = SchemaStore::default();
        for definition in definitions {
            store.insert(definition)?;
        }
        Ok(store)
    }

    fn insert(&mut self, definition: StatementDefinition) -> std::result::Result<(), SchemaError> {
        if !definition.name.starts_with("++") {
            return Err(SchemaError::InvalidStatementName(definition.name));
        }
        if self.statements.contains_key(&definition.name) {
            return Err(SchemaError::DuplicateStatement(definition.name));
        }
        for operand in &definition.operands {
            if let Some(target) = &operand.allowed_if {
                if definition.find_operand(target).is_none() {
                    return Err(SchemaError::UnknownAllowedIf {
                        statement: definition.name.clone(),
                        operand: operand.name().to_string(),
                        target: target.clone(),
                    });
                }
            }
        }
        self.order.push(definition.name.clone());
        self.statements
            .insert(definition.name.clone(), Arc::new(definition));
        Ok(())
    }

    /// Exact lookup by statement name.
    pub fn lookup(&self, name: &str) -> Option<&Arc<StatementDefinition>> {
        self.statements.get(name)
    }

    /// Resolves a statement name, falling back to the language variant
    /// heuristic when the exact name is not defined.
    pub fn classify(&self, name: &str) -> Resolution {
        if let Some(definition) = self.lookup(name) {
            return Resolution {
                class: StatementClass::Known,
                definition: Some(Arc::clone(definition)),
            };
        }

        if let Some((base, suffix)) = languages::split_language_suffix(name) {
            let base_definition = self.lookup(base);
            let variant_capable = is_variant_base(base)
                || base_definition.map_or(false, |d| d.accepts_language_variant);

            if variant_capable {
                return if is_language_code(suffix) {
                    Resolution {
                        class: StatementClass::LanguageVariant {
                            base: base.to_string(),
                            language: suffix.to_string(),
                        },
                        definition: base_definition.cloned(),
                    }
                } else {
                    Resolution {
                        class: StatementClass::InvalidLanguage {
                            base: base.to_string(),
                            suffix: suffix.to_string(),
                        },
                        definition: None,
                    }
                };
            }
        }

        Resolution {
            class: StatementClass::Unknown,
            definition: None,
        }
    }

    /// Statement definitions in schema order.
    pub fn statements(&self) -> impl Iterator<Item = &Arc<StatementDefinition>> {
        self.order.iter().filter_map(|name| self.statements.get(name))
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

// JSON form of the schema

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchema {
    #[serde(default)]
    operand_sets: HashMap<String, Vec<RawOperand>>,
    statements: Vec<RawStatement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatement {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameter: Option<String>,
    #[serde(default)]
    parameter_length: usize,
    #[serde(default)]
    language_variants: bool,
    #[serde(default)]
    inline_data: bool,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    operands: Vec<RawOperand>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOperand {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameter: Option<String>,
    #[serde(default)]
    length: usize,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    required_group: Option<String>,
    #[serde(default)]
    allowed_if: Option<String>,
    #[serde(default)]
    mutually_exclusive: Option<String>,
    #[serde(default)]
    values: Vec<RawValue>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawValue {
    name: String,
    #[serde(rename = "type", default = "default_value_type")]
    value_type: String,
    #[serde(default)]
    length: usize,
    #[serde(default)]
    description: Option<String>,
}

fn default_value_type() -> String {
    "string".to_string()
}

fn split_names(names: &str) -> Vec<String> {
    names
        .split('|')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl RawSchema {
    fn into_store(self) -> std::result::Result<SchemaStore, SchemaError> {
        let mut store = SchemaStore::default();
        for statement in self.statements {
            let mut operands = Vec::new();
            let mut seen: HashSet<String> = HashSet::new();

            for set in &statement.include {
                let members = self.operand_sets.get(set).ok_or_else(|| {
                    SchemaError::UnknownOperandSet {
                        statement: statement.name.clone(),
                        set: set.clone(),
                    }
                })?;
                operands.extend(members.iter().cloned());
            }
            operands.extend(statement.operands);

            let mut definitions = Vec::with_capacity(operands.len());
            // Later declarations override included ones with the same name
            for operand in operands.into_iter().rev() {
                let definition = operand.into_definition(&statement.name)?;
                if seen.insert(definition.name().to_string()) {
                    definitions.push(Arc::new(definition));
                }
            }
            definitions.reverse();

            store.insert(StatementDefinition {
                name: statement.name,
                description: statement.description,
                parameter: statement.parameter,
                max_parameter_length: statement.parameter_length,
                operands: definitions,
                accepts_language_variant: statement.language_variants,
                expects_inline_data: statement.inline_data,
            })?;
        }
        Ok(store)
    }
}

impl RawOperand {
    fn into_definition(self, statement: &str) -> std::result::Result<OperandDefinition, SchemaError> {
        let aliases = split_names(&self.name);
        if aliases.is_empty() {
            return Err(SchemaError::EmptyOperandName(statement.to_string()));
        }
        Ok(OperandDefinition {
            aliases,
            description: self.description,
            parameter_hint: self.parameter,
            max_length: self.length,
            required: self.required,
            required_group: self.required_group,
            allowed_if: self.allowed_if,
            mutually_exclusive_with: self
                .mutually_exclusive
                .as_deref()
                .map(split_names)
                .unwrap_or_default(),
            sub_operands: self
                .values
                .into_iter()
                .map(|value| {
                    Arc::new(SubOperandDefinition {
                        name: value.name,
                        value_type: value.value_type,
                        max_length: value.length,
                        description: value.description,
                    })
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "operandSets": {
            "source": [ { "name": "RELFILE", "parameter": "number", "length": 4 } ]
        },
        "statements": [
            { "name": "++VER", "parameter": "srel", "parameterLength": 4 },
            { "name": "++MSG", "parameter": "name", "languageVariants": true, "inlineData": true,
              "include": ["source"],
              "operands": [
                { "name": "DESC|DESCRIPTION", "parameter": "text", "length": 64 },
                { "name": "FROMDS", "parameter": "dataset",
                  "values": [ { "name": "DSN", "type": "string", "length": 44 }, { "name": "VOL", "length": 6 } ] }
              ] }
        ]
    }"#;

    #[test]
    fn test_load_sample_schema() {
        let store = SchemaStore::from_json(SAMPLE).unwrap();
        assert_eq!(store.len(), 2);

        let msg = store.lookup("++MSG").unwrap();
        assert!(msg.expects_inline_data);
        assert_eq!(msg.operands.len(), 3);
        assert_eq!(msg.operands[0].name(), "RELFILE");

        let desc = msg.find_operand("DESCRIPTION").unwrap();
        assert_eq!(desc.name(), "DESC");
        assert_eq!(desc.max_length, 64);

        let fromds = msg.find_operand("FROMDS").unwrap();
        assert!(fromds.has_sub_operands());
        assert_eq!(fromds.find_sub_operand("VOL").unwrap().value_type, "string");
    }

    #[test]
    fn test_statement_order_is_preserved() {
        let store = SchemaStore::from_json(SAMPLE).unwrap();
        let names: Vec<_> = store.statements().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["++VER", "++MSG"]);
    }

    #[test]
    fn test_classify_language_variants() {
        let store = SchemaStore::from_json(SAMPLE).unwrap();

        assert_eq!(store.classify("++MSG").class, StatementClass::Known);

        let variant = store.classify("++MSGENU");
        assert_eq!(
            variant.class,
            StatementClass::LanguageVariant {
                base: "++MSG".to_string(),
                language: "ENU".to_string()
            }
        );
        assert_eq!(variant.language_id(), "ENU");
        assert!(variant.definition.is_some());

        let invalid = store.classify("++MSGXYZ");
        assert!(matches!(invalid.class, StatementClass::InvalidLanguage { .. }));
        assert!(invalid.definition.is_none());

        assert_eq!(store.classify("++VERENU").class, StatementClass::Unknown);
        assert_eq!(store.classify("++BOGUS").class, StatementClass::Unknown);
    }

    #[test]
    fn test_duplicate_statement_rejected() {
        let json = r#"{ "statements": [ { "name": "++VER" }, { "name": "++VER" } ] }"#;
        let err = SchemaStore::from_json(json).unwrap_err();
        assert!(format!("{:#}", err).contains("defined more than once"));
    }

    #[test]
    fn test_unknown_allowed_if_rejected() {
        let json = r#"{ "statements": [ { "name": "++HOLD", "operands": [
            { "name": "CATEGORY", "parameter": "cat", "allowedIf": "FIXCAT" } ] } ] }"#;
        let err = SchemaStore::from_json(json).unwrap_err();
        assert!(format!("{:#}", err).contains("FIXCAT"));
    }

    #[test]
    fn test_unknown_operand_set_rejected() {
        let json = r#"{ "statements": [ { "name": "++MAC", "include": ["missing"] } ] }"#;
        assert!(SchemaStore::from_json(json).is_err());
    }

    #[test]
    fn test_required_groups() {
        let json = r#"{ "statements": [ { "name": "++HOLD", "operands": [
            { "name": "ERROR", "requiredGroup": "type" },
            { "name": "FMID", "parameter": "fmid" },
            { "name": "SYSTEM", "requiredGroup": "type" } ] } ] }"#;
        let store = SchemaStore::from_json(json).unwrap();
        let hold = store.lookup("++HOLD").unwrap();
        let groups = hold.required_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "type");
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn test_builtin_schema_loads() {
        let store = SchemaStore::builtin().unwrap();
        assert!(store.lookup("++PTF").is_some());
        assert!(store.lookup("++MOVE").is_some());
        assert!(store.lookup("++MAC").unwrap().expects_inline_data);
    }
}
