//! Resolution of parsed documents into operation descriptors.
//!
//! `DocumentHost` plays the part of the surrounding code generator and owns
//! every naming decision plus the document constants.
//! The primitives renderer only sees it through [`BaseVisitor`].
use super::naming::pascal_case;
use super::{ParsedDocument, ParsedTextType};
use crate::cli::{similar_help_suggestions, PrintableMessage};
use crate::config::{BaseConfig, NamingConvention};
use graphql_parser::query::{
    Definition, FragmentDefinition, FragmentSpread, OperationDefinition, Selection, SelectionSet,
    Type, VariableDefinition,
};
use graphql_parser::Pos;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

type Fragment = FragmentDefinition<'static, ParsedTextType>;
type Selections = SelectionSet<'static, ParsedTextType>;
type Variables = [VariableDefinition<'static, ParsedTextType>];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
    Fragment,
}

impl OperationKind {
    fn type_suffix(&self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
            OperationKind::Subscription => "Subscription",
            OperationKind::Fragment => "Fragment",
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
            OperationKind::Fragment => "fragment",
        }
    }
}

/// Everything the host knows about one definition, already resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Name as written in the document, empty when anonymous
    pub name: String,
    pub kind: OperationKind,
    pub document_variable_name: String,
    pub result_type_name: String,
    /// Empty for fragments
    pub variables_type_name: String,
    /// Carried for plugins built on the same host; the primitives renderer ignores it
    #[allow(dead_code)]
    pub has_required_variables: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertNameOptions {
    pub use_types_prefix: bool,
    pub use_types_suffix: bool,
}

impl ConvertNameOptions {
    fn types() -> Self {
        ConvertNameOptions {
            use_types_prefix: true,
            use_types_suffix: true,
        }
    }
}

/// Capabilities of the host that resolves operations, as seen by plugins
pub trait BaseVisitor {
    /// Import lines the host needs; entries may be empty
    fn imports(&self) -> Vec<String>;

    fn convert_name(&self, name: &str, options: ConvertNameOptions) -> String;
}

#[derive(Debug)]
pub struct ResolvedDefinition {
    pub descriptor: OperationDescriptor,
    /// `None` for fragments, which are inlined into the documents spreading them
    pub document_constant: Option<String>,
}

#[derive(Debug)]
pub enum Warning {
    AnonymousOperation {
        position: Pos,
        kind: OperationKind,
    },
    DuplicateOperationName {
        position: Pos,
        name: String,
        first_path: PathBuf,
    },
    DuplicateFragmentName {
        position: Pos,
        name: String,
        first_path: PathBuf,
    },
    UnknownFragment {
        position: Pos,
        name: String,
        possible_names: Vec<String>,
    },
}

impl From<(&str, &Path, Warning)> for PrintableMessage {
    fn from((contents, file_path, warning): (&str, &Path, Warning)) -> Self {
        match warning {
            Warning::AnonymousOperation { position, kind } => PrintableMessage::new_compile_warning(
                &format!("anonymous {} operation", kind.keyword()),
                file_path,
                contents,
                &position,
                Some("Unnamed operations generate unsuffixed declarations that collide with each other. Give this operation a name."),
            ),
            Warning::DuplicateOperationName { position, name, first_path } => PrintableMessage::new_compile_warning(
                &format!("duplicate operation name `{name}`"),
                file_path,
                contents,
                &position,
                Some(&format!(
                    "`{name}` is already defined in `{}`; their generated declarations will collide.",
                    first_path.display(),
                )),
            ),
            Warning::DuplicateFragmentName { position, name, first_path } => PrintableMessage::new_compile_warning(
                &format!("duplicate fragment name `{name}`"),
                file_path,
                contents,
                &position,
                Some(&format!(
                    "Only the definition in `{}` is inlined into documents spreading `{name}`.",
                    first_path.display(),
                )),
            ),
            Warning::UnknownFragment { position, name, possible_names } => {
                let extra = similar_help_suggestions(&name, possible_names.into_iter())
                    .unwrap_or_default();
                PrintableMessage::new_compile_warning(
                    &format!("unknown spread fragment name `{name}`"),
                    file_path,
                    contents,
                    &position,
                    Some(&format!(
                        "This fragment is not defined in any document and will be missing from the generated document.{extra}"
                    )),
                )
            }
        }
    }
}

struct OperationParts<'a> {
    kind: OperationKind,
    name: Option<&'a str>,
    position: Pos,
    variable_definitions: &'a Variables,
    selection_set: &'a Selections,
}

impl<'a> From<&'a OperationDefinition<'static, ParsedTextType>> for OperationParts<'a> {
    fn from(operation: &'a OperationDefinition<'static, ParsedTextType>) -> Self {
        match operation {
            OperationDefinition::SelectionSet(selection_set) => OperationParts {
                kind: OperationKind::Query,
                name: None,
                position: selection_set.span.0,
                variable_definitions: &[],
                selection_set,
            },
            OperationDefinition::Query(query) => OperationParts {
                kind: OperationKind::Query,
                name: query.name.as_deref(),
                position: query.position,
                variable_definitions: &query.variable_definitions,
                selection_set: &query.selection_set,
            },
            OperationDefinition::Mutation(mutation) => OperationParts {
                kind: OperationKind::Mutation,
                name: mutation.name.as_deref(),
                position: mutation.position,
                variable_definitions: &mutation.variable_definitions,
                selection_set: &mutation.selection_set,
            },
            OperationDefinition::Subscription(subscription) => OperationParts {
                kind: OperationKind::Subscription,
                name: subscription.name.as_deref(),
                position: subscription.position,
                variable_definitions: &subscription.variable_definitions,
                selection_set: &subscription.selection_set,
            },
        }
    }
}

fn has_required_variables(variable_definitions: &Variables) -> bool {
    variable_definitions.iter().any(|variable| {
        matches!(variable.var_type, Type::NonNullType(_)) && variable.default_value.is_none()
    })
}

/// Every fragment spread inside `root`, not following into the fragments themselves
fn spreads_of(root: &Selections) -> Vec<&FragmentSpread<'static, ParsedTextType>> {
    let mut spreads = Vec::new();
    let mut pending = vec![root];
    while let Some(selection_set) = pending.pop() {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => pending.push(&field.selection_set),
                Selection::InlineFragment(inline) => pending.push(&inline.selection_set),
                Selection::FragmentSpread(spread) => spreads.push(spread),
            }
        }
    }
    spreads.sort_by_key(|spread| (spread.position.line, spread.position.column));
    spreads
}

fn escape_template_literal(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

/// A fragment definition and the document it was first defined in
struct LoadedFragment<'a> {
    definition: &'a Fragment,
    path: &'a Path,
}

pub struct DocumentHost<'a> {
    config: &'a BaseConfig,
    documents: &'a [ParsedDocument],
    fragments: HashMap<&'a str, LoadedFragment<'a>>,
}

impl<'a> DocumentHost<'a> {
    pub fn new(config: &'a BaseConfig, documents: &'a [ParsedDocument]) -> Self {
        let mut fragments = HashMap::new();
        for parsed in documents {
            for definition in &parsed.document.definitions {
                if let Definition::Fragment(fragment) = definition {
                    fragments
                        .entry(fragment.name.as_str())
                        .or_insert(LoadedFragment {
                            definition: fragment,
                            path: parsed.path.as_path(),
                        });
                }
            }
        }
        DocumentHost {
            config,
            documents,
            fragments,
        }
    }

    /// Resolves every definition of every document, in document order.
    pub fn resolve_all(&self) -> (Vec<ResolvedDefinition>, Vec<PrintableMessage>) {
        let mut resolved = Vec::new();
        let mut messages = Vec::new();
        // Keyed by converted name, since that is what the generated identifiers collide on
        let mut seen_names: HashMap<String, &'a Path> = HashMap::new();
        for parsed in self.documents {
            let mut warnings = Vec::new();
            for definition in &parsed.document.definitions {
                let selection_set = match definition {
                    Definition::Operation(operation) => {
                        let parts = OperationParts::from(operation);
                        match parts.name {
                            None => warnings.push(Warning::AnonymousOperation {
                                position: parts.position,
                                kind: parts.kind,
                            }),
                            Some(name) => match seen_names
                                .entry(self.convert_name(name, ConvertNameOptions::default()))
                            {
                                Entry::Occupied(first) => {
                                    warnings.push(Warning::DuplicateOperationName {
                                        position: parts.position,
                                        name: name.to_string(),
                                        first_path: first.get().to_path_buf(),
                                    })
                                }
                                Entry::Vacant(vacancy) => {
                                    vacancy.insert(parsed.path.as_path());
                                }
                            },
                        }
                        let descriptor = self.resolve_operation(&parts);
                        let document_constant =
                            self.document_constant(&descriptor, operation, parts.selection_set);
                        resolved.push(ResolvedDefinition {
                            descriptor,
                            document_constant: Some(document_constant),
                        });
                        parts.selection_set
                    }
                    Definition::Fragment(fragment) => {
                        if let Some(first) = self.fragments.get(fragment.name.as_str()) {
                            if !std::ptr::eq(first.definition, fragment) {
                                warnings.push(Warning::DuplicateFragmentName {
                                    position: fragment.position,
                                    name: fragment.name.clone(),
                                    first_path: first.path.to_path_buf(),
                                });
                            }
                        }
                        resolved.push(ResolvedDefinition {
                            descriptor: self.resolve_fragment(fragment),
                            document_constant: None,
                        });
                        &fragment.selection_set
                    }
                };
                warnings.extend(self.unknown_spreads(selection_set));
            }
            messages.extend(warnings.into_iter().map(|warning| {
                PrintableMessage::from((parsed.contents.as_str(), parsed.path.as_path(), warning))
            }));
        }
        (resolved, messages)
    }

    fn resolve_operation(&self, parts: &OperationParts<'_>) -> OperationDescriptor {
        let name = parts.name.unwrap_or("");
        let converted = self.convert_name(name, ConvertNameOptions::default());
        let stem = format!("{}{}", converted, self.operation_suffix(&converted, parts.kind));
        OperationDescriptor {
            name: name.to_string(),
            kind: parts.kind,
            document_variable_name: format!(
                "{}{}{}",
                self.config.document_variable_prefix, converted, self.config.document_variable_suffix
            ),
            result_type_name: self.operation_type_name(&stem),
            variables_type_name: self.operation_type_name(&format!("{stem}Variables")),
            has_required_variables: has_required_variables(parts.variable_definitions),
        }
    }

    fn resolve_fragment(&self, fragment: &Fragment) -> OperationDescriptor {
        let converted = self.convert_name(&fragment.name, ConvertNameOptions::default());
        let stem = format!(
            "{}{}",
            converted,
            self.operation_suffix(&converted, OperationKind::Fragment)
        );
        OperationDescriptor {
            name: fragment.name.clone(),
            kind: OperationKind::Fragment,
            document_variable_name: format!("{converted}FragmentDoc"),
            result_type_name: self.operation_type_name(&stem),
            variables_type_name: String::new(),
            has_required_variables: false,
        }
    }

    fn operation_suffix(&self, converted: &str, kind: OperationKind) -> &'static str {
        let suffix = kind.type_suffix();
        if self.config.omit_operation_suffix {
            return "";
        }
        if self.config.dedupe_operation_suffix
            && converted.to_lowercase().ends_with(&suffix.to_lowercase())
        {
            return "";
        }
        suffix
    }

    fn operation_type_name(&self, stem: &str) -> String {
        let name = self.decorate(stem, ConvertNameOptions::types());
        match &self.config.import_operation_types_from {
            Some(namespace) => format!("{namespace}.{name}"),
            None => name,
        }
    }

    fn decorate(&self, converted: &str, options: ConvertNameOptions) -> String {
        let prefix = if options.use_types_prefix {
            self.config.types_prefix.as_str()
        } else {
            ""
        };
        let suffix = if options.use_types_suffix {
            self.config.types_suffix.as_str()
        } else {
            ""
        };
        format!("{prefix}{converted}{suffix}")
    }

    /// Fragments transitively spread from `root`, keyed (and so ordered) by name
    fn used_fragments(&self, root: &'a Selections) -> BTreeMap<&'a str, &'a Fragment> {
        let mut used = BTreeMap::new();
        let mut pending = spreads_of(root);
        while let Some(spread) = pending.pop() {
            let name = spread.fragment_name.as_str();
            if used.contains_key(name) {
                continue;
            }
            // Unknown spreads are reported per document by `unknown_spreads`
            if let Some(fragment) = self.fragments.get(name) {
                used.insert(name, fragment.definition);
                pending.extend(spreads_of(&fragment.definition.selection_set));
            }
        }
        used
    }

    fn unknown_spreads(&self, root: &Selections) -> Vec<Warning> {
        spreads_of(root)
            .into_iter()
            .filter(|spread| !self.fragments.contains_key(spread.fragment_name.as_str()))
            .map(|spread| Warning::UnknownFragment {
                position: spread.position,
                name: spread.fragment_name.clone(),
                possible_names: self.fragments.keys().map(|name| name.to_string()).collect(),
            })
            .collect()
    }

    /// `export const <Document> = \`...\`;` holding the operation and its fragments
    fn document_constant(
        &self,
        descriptor: &OperationDescriptor,
        operation: &OperationDefinition<'static, ParsedTextType>,
        selection_set: &'a Selections,
    ) -> String {
        let mut printed = vec![operation.to_string()];
        printed.extend(
            self.used_fragments(selection_set)
                .values()
                .map(|fragment| fragment.to_string()),
        );
        format!(
            "export const {} = `\n{}`;",
            descriptor.document_variable_name,
            escape_template_literal(&printed.join("\n"))
        )
    }
}

impl BaseVisitor for DocumentHost<'_> {
    fn imports(&self) -> Vec<String> {
        let operation_types_import = match (
            &self.config.import_operation_types_from,
            &self.config.operation_types_path,
        ) {
            (Some(namespace), Some(path)) => format!("import * as {namespace} from '{path}';"),
            _ => String::new(),
        };
        vec![operation_types_import]
    }

    fn convert_name(&self, name: &str, options: ConvertNameOptions) -> String {
        let converted = match self.config.naming_convention {
            NamingConvention::PascalCase => pascal_case(name, self.config.transform_underscore),
            NamingConvention::Keep => name.to_string(),
        };
        self.decorate(&converted, options)
    }
}
