use crate::cli::PrintableMessage;
use crate::config::PluginConfig;
use crate::graphql::host::DocumentHost;
use crate::graphql::ParsedDocument;
use renderer::OperationRenderer;

mod renderer;

const HEADER: &str = "/* eslint-disable */
// This file was automatically generated and should not be edited.

";

pub struct Compile {
    pub contents: String,
    pub messages: Vec<PrintableMessage>,
}

/// Builds the generated module for all documents, in the order given.
pub fn compile(documents: &[ParsedDocument], config: &PluginConfig) -> Compile {
    let host = DocumentHost::new(&config.base, documents);
    let renderer = OperationRenderer::new(&host, config);

    let mut sections = Vec::new();
    let imports = renderer.render_imports();
    if !imports.is_empty() {
        sections.push(imports.join("\n"));
    }

    let (resolved, messages) = host.resolve_all();
    for definition in resolved {
        if let Some(document_constant) = definition.document_constant {
            sections.push(document_constant);
        }
        let primitive = renderer.render_operation(&definition.descriptor);
        if !primitive.is_empty() {
            sections.push(primitive);
        }
    }

    Compile {
        contents: format!("{}{}\n", HEADER, sections.join("\n\n")),
        messages,
    }
}
