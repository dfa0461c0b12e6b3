use crate::config::{self, PluginConfig};
use clap::Parser;
use colored::Colorize;
use graphql_parser::Pos;
use std::fmt;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE_NAME: &str = ".codegenrc.json";
const DEFAULT_OUTPUT_FILE_NAME: &str = "solid-urql.ts";
const GENERATED_DIR_NAME: &str = "__generated__";

/// Generates SolidStart urql primitives (`createQuery`/`createMutation` wrappers)
/// for every GraphQL operation found under DIR.
#[derive(Parser, Debug)]
#[command(name = "solid-urql-codegen", version, author, about)]
struct Args {
    /// Directory to recursively search for `.graphql` documents
    #[arg(value_name = "DIR", default_value = ".")]
    root_dir: PathBuf,

    /// Path of JSON config file (defaults to DIR/.codegenrc.json when present)
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Path of the generated file (defaults to DIR/__generated__/solid-urql.ts)
    #[arg(short = 'o', long = "output-file", value_name = "FILE")]
    output_file: Option<PathBuf>,

    /// Module the primitives are imported from, overriding `urqlImportFrom`
    #[arg(long = "urql-import-from", value_name = "MODULE")]
    urql_import_from: Option<String>,

    /// Skip generating primitives, overriding `withPrimitives`
    #[arg(long = "no-primitives")]
    no_primitives: bool,

    /// Sets the number of threads (defaults to number of CPU cores)
    #[arg(long = "num-threads", value_name = "NUMBER")]
    number_threads: Option<u8>,
}

/// User configured runtime configuration
#[derive(Debug)]
pub struct RuntimeConfig {
    root_dir: PathBuf,
    output_path: PathBuf,
    number_threads: u8,
    plugin_config: PluginConfig,
}

impl RuntimeConfig {
    /// Parses the command line and loads the config file, returning config warnings alongside.
    pub fn from_cli() -> Result<(Self, Vec<PrintableMessage>), PrintableMessage> {
        let args = Args::parse();
        let (config_path, required) = match args.config_file {
            Some(path) => (path, true),
            None => (args.root_dir.join(DEFAULT_CONFIG_FILE_NAME), false),
        };

        let mut raw = if required || config_path.is_file() {
            config::RawPluginConfig::from_path(&config_path)
                .map_err(|error| PrintableMessage::from((config_path.as_path(), error)))?
        } else {
            config::RawPluginConfig::default()
        };
        if let Some(module) = args.urql_import_from {
            raw.urql_import_from = Some(module);
        }
        if args.no_primitives {
            raw.with_primitives = Some(false);
        }

        let (plugin_config, warnings) = PluginConfig::resolve(raw);
        let messages = warnings
            .into_iter()
            .map(|warning| PrintableMessage::from((config_path.as_path(), warning)))
            .collect();

        let output_path = args.output_file.unwrap_or_else(|| {
            args.root_dir
                .join(GENERATED_DIR_NAME)
                .join(DEFAULT_OUTPUT_FILE_NAME)
        });
        let number_threads = args
            .number_threads
            .filter(|count| *count > 0)
            .or_else(|| u8::try_from(num_cpus::get()).ok())
            .unwrap_or(4);

        let runtime_config = RuntimeConfig {
            root_dir: args.root_dir,
            output_path,
            number_threads,
            plugin_config,
        };
        Ok((runtime_config, messages))
    }

    pub fn root_dir_path(&self) -> &Path {
        &self.root_dir
    }

    pub fn output_file_path(&self) -> &Path {
        &self.output_path
    }

    pub fn plugin_config(&self) -> &PluginConfig {
        &self.plugin_config
    }

    pub fn thread_count(&self) -> u8 {
        self.number_threads
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Error,
    Warning,
    ProgramError,
}

/// Source line and caret placement for a message
#[derive(Debug)]
pub struct LocationInformation {
    line_number: usize,
    column: usize,
    line: String,
    help_text: Option<String>,
}

impl LocationInformation {
    pub fn new_from_contents_and_position(contents: &str, position: &Pos) -> Self {
        let line = contents
            .lines()
            .nth(position.line.saturating_sub(1))
            .unwrap_or("");
        Self::new_from_line_and_column(position.line, line, position.column)
    }

    pub fn new_from_line_and_column(line_number: usize, line: &str, column: usize) -> Self {
        LocationInformation {
            line_number,
            column,
            line: line.to_string(),
            help_text: None,
        }
    }

    pub fn with_help_text(&mut self, help_text: &str) {
        self.help_text = Some(help_text.to_string());
    }
}

/// A diagnostic destined for the user's terminal
#[derive(Debug)]
pub struct PrintableMessage {
    level: Level,
    title: String,
    file_path: Option<PathBuf>,
    location: Option<LocationInformation>,
    help_text: Option<String>,
}

impl PrintableMessage {
    fn new(level: Level, title: &str) -> Self {
        PrintableMessage {
            level,
            title: title.to_string(),
            file_path: None,
            location: None,
            help_text: None,
        }
    }

    pub fn new_simple_compile_error(title: &str) -> Self {
        Self::new(Level::Error, title)
    }

    pub fn new_simple_warning(title: &str) -> Self {
        Self::new(Level::Warning, title)
    }

    pub fn new_simple_program_error(title: &str) -> Self {
        Self::new(Level::ProgramError, title)
    }

    pub fn new_compile_warning(
        title: &str,
        file_path: &Path,
        contents: &str,
        position: &Pos,
        help_text: Option<&str>,
    ) -> Self {
        Self::new_with_position(Level::Warning, title, file_path, contents, position, help_text)
    }

    fn new_with_position(
        level: Level,
        title: &str,
        file_path: &Path,
        contents: &str,
        position: &Pos,
        help_text: Option<&str>,
    ) -> Self {
        let mut location = LocationInformation::new_from_contents_and_position(contents, position);
        if let Some(help_text) = help_text {
            location.with_help_text(help_text);
        }
        let mut message = Self::new(level, title);
        message.with_source_information(file_path, Some(location));
        message
    }

    pub fn new_compile_error_from_read_io_error(io_error: &std::io::Error, path: &Path) -> Self {
        Self::new_simple_compile_error(&format!(
            "could not read `{}`: {io_error}",
            path.display()
        ))
    }

    pub fn new_compile_error_from_write_io_error(io_error: &std::io::Error, path: &Path) -> Self {
        Self::new_simple_compile_error(&format!(
            "could not write `{}`: {io_error}",
            path.display()
        ))
    }

    pub fn with_source_information(
        &mut self,
        file_path: &Path,
        location: Option<LocationInformation>,
    ) {
        self.file_path = Some(file_path.to_path_buf());
        self.location = location;
    }

    /// Help shown when no source location is attached
    pub fn with_help_text(&mut self, help_text: &str) {
        self.help_text = Some(help_text.to_string());
    }

    pub fn is_error(&self) -> bool {
        self.level != Level::Warning
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}

impl fmt::Display for PrintableMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.level {
            Level::Error => "error".red().bold(),
            Level::Warning => "warning".yellow().bold(),
            Level::ProgramError => "program error".red().bold(),
        };
        writeln!(f, "{}{} {}", label, ":".bold(), self.title.bold())?;

        let gutter_width = self
            .location
            .as_ref()
            .map_or(1, |location| location.line_number.to_string().len() + 1);
        let gutter = " ".repeat(gutter_width);
        let bar = "|".blue().bold();

        if let Some(file_path) = &self.file_path {
            match &self.location {
                Some(location) => writeln!(
                    f,
                    "{}{} {}:{}:{}",
                    " ".repeat(gutter_width.saturating_sub(1)),
                    "-->".blue().bold(),
                    file_path.display(),
                    location.line_number,
                    location.column,
                )?,
                None => writeln!(f, " {} {}", "-->".blue().bold(), file_path.display())?,
            }
        }

        if let Some(location) = &self.location {
            let line_number = location.line_number.to_string();
            writeln!(f, "{gutter}{bar}")?;
            writeln!(f, "{} {bar} {}", line_number.blue().bold(), location.line)?;
            writeln!(
                f,
                "{gutter}{bar} {}{}",
                " ".repeat(location.column.saturating_sub(1)),
                "^".bold(),
            )?;
        }

        let help_text = self
            .location
            .as_ref()
            .and_then(|location| location.help_text.as_ref())
            .or(self.help_text.as_ref());
        if let Some(help_text) = help_text {
            writeln!(f, "{gutter}{} {}: {help_text}", "=".blue().bold(), "help".bold())?;
        }
        Ok(())
    }
}

/// Appends a "Did you mean" suggestion when a close enough candidate exists.
pub fn similar_help_suggestions(
    name: &str,
    candidates: impl Iterator<Item = String>,
) -> Option<String> {
    let mut scored = candidates
        .map(|candidate| (strsim::jaro_winkler(name, &candidate), candidate))
        .filter(|(score, _)| *score > 0.8)
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    let suggestions = scored
        .into_iter()
        .take(3)
        .map(|(_, candidate)| format!("`{candidate}`"))
        .collect::<Vec<String>>();
    if suggestions.is_empty() {
        return None;
    }
    Some(format!(" Did you mean {}?", suggestions.join(" or ")))
}

/// Prints the result of the program to the screen.
pub fn print_work_result(result: Result<Vec<PrintableMessage>, Vec<PrintableMessage>>) {
    let (messages, failed) = match result {
        Ok(messages) => (messages, false),
        Err(messages) => (messages, true),
    };
    let has_errors = messages.iter().any(PrintableMessage::is_error);
    for message in messages {
        println!("{message}");
    }
    if failed || has_errors {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_pick_closest_names() {
        let candidates = vec!["withPrimitives".to_string(), "typesPrefix".to_string()];
        assert_eq!(
            similar_help_suggestions("withPrimitive", candidates.into_iter()),
            Some(" Did you mean `withPrimitives`?".to_string()),
        );
    }

    #[test]
    fn suggestions_empty_for_unrelated_names() {
        let candidates = vec!["withPrimitives".to_string()];
        assert_eq!(similar_help_suggestions("zzz", candidates.into_iter()), None);
    }

    #[test]
    fn renders_location_with_caret_and_help() {
        colored::control::set_override(false);
        let contents = "query {\n  ...Missing\n}\n";
        let message = PrintableMessage::new_compile_warning(
            "unknown spread fragment name `Missing`",
            Path::new("ops.graphql"),
            contents,
            &Pos { line: 2, column: 3 },
            Some("Check the fragment name."),
        );
        let rendered = message.to_string();
        assert!(rendered.starts_with("warning: unknown spread fragment name `Missing`\n"));
        assert!(rendered.contains(" --> ops.graphql:2:3\n"));
        assert!(rendered.contains("2 |   ...Missing\n  |   ^\n"));
        assert!(rendered.contains("  = help: Check the fragment name.\n"));
        assert!(!message.is_error());
    }
}
