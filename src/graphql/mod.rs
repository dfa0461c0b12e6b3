use crate::cli::PrintableMessage;
use graphql_parser::query::Document;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

pub mod host;
pub mod naming;

pub type ParsedTextType = String;

/// A `.graphql` file, read and parsed
#[derive(Debug)]
pub struct ParsedDocument {
    pub path: PathBuf,
    pub contents: String,
    pub document: Document<'static, ParsedTextType>,
}

fn read_graphql_file(path: &Path) -> Result<String, PrintableMessage> {
    File::open(path)
        .and_then(|file| {
            let mut buf_reader = BufReader::new(file);
            let mut contents = String::new();
            buf_reader.read_to_string(&mut contents)?;
            Ok(contents)
        })
        .map_err(|io_error| PrintableMessage::new_compile_error_from_read_io_error(&io_error, path))
}

fn parse_graphql_file(
    contents: &str,
    file_path: &Path,
) -> Result<Document<'static, ParsedTextType>, PrintableMessage> {
    let parsed = graphql_parser::parse_query::<ParsedTextType>(contents).map_err(|parse_error| {
        let mut error = PrintableMessage::new_simple_compile_error(&format!("{parse_error}"));
        error.with_source_information(file_path, None);
        error
    })?;
    Ok(parsed.into_static())
}

pub fn load_document(path: &Path) -> Result<ParsedDocument, PrintableMessage> {
    let contents = read_graphql_file(path)?;
    let document = parse_graphql_file(&contents, path)?;
    Ok(ParsedDocument {
        path: path.to_path_buf(),
        contents,
        document,
    })
}

fn makedir_p(path: &Path) -> Result<(), PrintableMessage> {
    std::fs::create_dir_all(path)
        .map_err(|io_error| PrintableMessage::new_compile_error_from_write_io_error(&io_error, path))
}

pub fn write_generated_file(path: &Path, contents: &str) -> Result<(), PrintableMessage> {
    if let Some(parent_dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        makedir_p(parent_dir)?;
    }
    std::fs::write(path, contents)
        .map_err(|io_error| PrintableMessage::new_compile_error_from_write_io_error(&io_error, path))
}
