//! Plugin configuration: the raw JSON shape and its resolved, immutable form
use crate::cli::{similar_help_suggestions, PrintableMessage};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

pub const DEFAULT_URQL_IMPORT_FROM: &str = "@urql/solid-start";
const DEFAULT_DOCUMENT_VARIABLE_SUFFIX: &str = "Document";
const STRING_DOCUMENT_MODE: &str = "string";

const KNOWN_OPTIONS: &[&str] = &[
    "withPrimitives",
    "urqlImportFrom",
    "namingConvention",
    "transformUnderscore",
    "typesPrefix",
    "typesSuffix",
    "documentVariablePrefix",
    "documentVariableSuffix",
    "omitOperationSuffix",
    "dedupeOperationSuffix",
    "importOperationTypesFrom",
    "operationTypesPath",
    "documentMode",
];

#[derive(Debug)]
pub enum Error {
    Read(std::io::Error),
    Json(serde_json::Error),
}

impl From<(&Path, Error)> for PrintableMessage {
    fn from((config_path, error): (&Path, Error)) -> Self {
        let reason = match error {
            Error::Read(io_error) => io_error.to_string(),
            Error::Json(json_error) => format!("JSON parse error: {json_error}"),
        };
        PrintableMessage::new_simple_program_error(&format!(
            "error in config file `{}`: {reason}",
            config_path.display()
        ))
    }
}

#[derive(Debug, PartialEq)]
pub enum Warning {
    UnknownOption {
        name: String,
        suggestion: Option<String>,
    },
    UnsupportedDocumentMode(String),
    UnknownNamingConvention(String),
}

impl From<(&Path, Warning)> for PrintableMessage {
    fn from((config_path, warning): (&Path, Warning)) -> Self {
        let (title, help_text) = match warning {
            Warning::UnknownOption { name, suggestion } => (
                format!("unknown config option `{name}`"),
                format!(
                    "This option is ignored.{}",
                    suggestion.unwrap_or_default()
                ),
            ),
            Warning::UnsupportedDocumentMode(mode) => (
                format!("unsupported document mode `{mode}`"),
                String::from("Documents are always emitted as strings; this option is ignored."),
            ),
            Warning::UnknownNamingConvention(convention) => (
                format!("unknown naming convention `{convention}`"),
                String::from("Supported conventions are `pascalCase` and `keep`; falling back to `pascalCase`."),
            ),
        };
        let mut message = PrintableMessage::new_simple_warning(&title);
        message.with_source_information(config_path, None);
        message.with_help_text(&help_text);
        message
    }
}

/// Config file contents as written by the user
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawPluginConfig {
    pub with_primitives: Option<bool>,
    pub urql_import_from: Option<String>,
    naming_convention: Option<String>,
    transform_underscore: Option<bool>,
    types_prefix: Option<String>,
    types_suffix: Option<String>,
    document_variable_prefix: Option<String>,
    document_variable_suffix: Option<String>,
    omit_operation_suffix: Option<bool>,
    dedupe_operation_suffix: Option<bool>,
    import_operation_types_from: Option<String>,
    operation_types_path: Option<String>,
    document_mode: Option<String>,
    #[serde(flatten)]
    unknown: BTreeMap<String, serde_json::Value>,
}

impl RawPluginConfig {
    pub fn try_from_reader(reader: impl Read) -> Result<Self, Error> {
        serde_json::from_reader(reader).map_err(Error::Json)
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(Error::Read)?;
        Self::try_from_reader(BufReader::new(file))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingConvention {
    PascalCase,
    Keep,
}

impl NamingConvention {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "pascalCase" | "change-case-all#pascalCase" | "change-case#pascalCase" => {
                Some(NamingConvention::PascalCase)
            }
            "keep" => Some(NamingConvention::Keep),
            _ => None,
        }
    }
}

/// Options shared with the host that resolves operations
#[derive(Debug, Clone, PartialEq)]
pub struct BaseConfig {
    pub naming_convention: NamingConvention,
    pub transform_underscore: bool,
    pub types_prefix: String,
    pub types_suffix: String,
    pub document_variable_prefix: String,
    pub document_variable_suffix: String,
    pub omit_operation_suffix: bool,
    pub dedupe_operation_suffix: bool,
    /// Namespace that operation result and variables types are referenced through
    pub import_operation_types_from: Option<String>,
    /// Module the namespace above is imported from
    pub operation_types_path: Option<String>,
}

impl Default for BaseConfig {
    fn default() -> Self {
        BaseConfig {
            naming_convention: NamingConvention::PascalCase,
            transform_underscore: false,
            types_prefix: String::new(),
            types_suffix: String::new(),
            document_variable_prefix: String::new(),
            document_variable_suffix: DEFAULT_DOCUMENT_VARIABLE_SUFFIX.to_string(),
            omit_operation_suffix: false,
            dedupe_operation_suffix: false,
            import_operation_types_from: None,
            operation_types_path: None,
        }
    }
}

/// Resolved once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginConfig {
    pub with_primitives: bool,
    pub urql_import_from: String,
    pub base: BaseConfig,
}

impl Default for PluginConfig {
    fn default() -> Self {
        PluginConfig {
            with_primitives: true,
            urql_import_from: DEFAULT_URQL_IMPORT_FROM.to_string(),
            base: BaseConfig::default(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

impl PluginConfig {
    pub fn resolve(raw: RawPluginConfig) -> (Self, Vec<Warning>) {
        let mut warnings = raw
            .unknown
            .keys()
            .map(|name| Warning::UnknownOption {
                name: name.clone(),
                suggestion: similar_help_suggestions(
                    name,
                    KNOWN_OPTIONS.iter().map(|known| known.to_string()),
                ),
            })
            .collect::<Vec<_>>();

        if let Some(mode) = raw.document_mode {
            if mode != STRING_DOCUMENT_MODE {
                warnings.push(Warning::UnsupportedDocumentMode(mode));
            }
        }

        let defaults = BaseConfig::default();
        let naming_convention = match raw.naming_convention {
            None => defaults.naming_convention,
            Some(name) => NamingConvention::from_name(&name).unwrap_or_else(|| {
                warnings.push(Warning::UnknownNamingConvention(name));
                defaults.naming_convention
            }),
        };

        let base = BaseConfig {
            naming_convention,
            transform_underscore: raw
                .transform_underscore
                .unwrap_or(defaults.transform_underscore),
            types_prefix: raw.types_prefix.unwrap_or(defaults.types_prefix),
            types_suffix: raw.types_suffix.unwrap_or(defaults.types_suffix),
            document_variable_prefix: raw
                .document_variable_prefix
                .unwrap_or(defaults.document_variable_prefix),
            document_variable_suffix: raw
                .document_variable_suffix
                .unwrap_or(defaults.document_variable_suffix),
            omit_operation_suffix: raw
                .omit_operation_suffix
                .unwrap_or(defaults.omit_operation_suffix),
            dedupe_operation_suffix: raw
                .dedupe_operation_suffix
                .unwrap_or(defaults.dedupe_operation_suffix),
            import_operation_types_from: non_empty(raw.import_operation_types_from),
            operation_types_path: non_empty(raw.operation_types_path),
        };

        let config = PluginConfig {
            // Only an explicit `false` disables primitives
            with_primitives: raw.with_primitives != Some(false),
            urql_import_from: non_empty(raw.urql_import_from)
                .unwrap_or_else(|| DEFAULT_URQL_IMPORT_FROM.to_string()),
            base,
        };
        (config, warnings)
    }
}
