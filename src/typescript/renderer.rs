use crate::config::PluginConfig;
use crate::graphql::host::{BaseVisitor, ConvertNameOptions, OperationDescriptor, OperationKind};
use crate::graphql::naming::kebab_key;

/// Renders `createQuery`/`createMutation` wrappers on top of a host's resolution.
///
/// Holds no state besides the frozen config, so operations may be rendered in
/// any order.
pub struct OperationRenderer<'a, V> {
    base: &'a V,
    config: &'a PluginConfig,
}

impl<'a, V: BaseVisitor> OperationRenderer<'a, V> {
    pub fn new(base: &'a V, config: &'a PluginConfig) -> Self {
        OperationRenderer { base, config }
    }

    /// The host's imports plus the primitives import, without blank entries.
    pub fn render_imports(&self) -> Vec<String> {
        let mut imports = self.base.imports();
        if self.config.with_primitives {
            imports.push(format!(
                "import {{ createQuery, createMutation }} from '{}';",
                self.config.urql_import_from
            ));
        }
        imports.retain(|import| !import.is_empty());
        imports
    }

    /// The exported wrapper for one operation, or an empty string when there is none.
    pub fn render_operation(&self, descriptor: &OperationDescriptor) -> String {
        let operation_name = self
            .base
            .convert_name(&descriptor.name, ConvertNameOptions::default());

        if !self.config.with_primitives {
            return String::new();
        }

        match descriptor.kind {
            OperationKind::Query => query_primitive(&operation_name, descriptor),
            OperationKind::Mutation => mutation_primitive(&operation_name, descriptor),
            // Subscriptions have no primitive
            OperationKind::Subscription | OperationKind::Fragment => String::new(),
        }
    }
}

fn query_primitive(operation_name: &str, descriptor: &OperationDescriptor) -> String {
    format!(
        "export const query{} = createQuery<{}, {}>(\n  {},\n  '{}'\n);",
        operation_name,
        descriptor.result_type_name,
        descriptor.variables_type_name,
        descriptor.document_variable_name,
        kebab_key(operation_name),
    )
}

fn mutation_primitive(operation_name: &str, descriptor: &OperationDescriptor) -> String {
    format!(
        "export const action{} = () => createMutation<{}, {}>(\n  {},\n  '{}'\n);",
        operation_name,
        descriptor.result_type_name,
        descriptor.variables_type_name,
        descriptor.document_variable_name,
        kebab_key(operation_name),
    )
}
