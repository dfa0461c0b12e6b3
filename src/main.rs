extern crate crossbeam_channel as channel;

use cli::{PrintableMessage, RuntimeConfig};
use worker_pool::WorkerPool;

mod cli;
mod config;
mod graphql;
mod typescript;
mod worker_pool;

fn run() -> Result<Vec<PrintableMessage>, Vec<PrintableMessage>> {
    let (runtime_config, mut messages) = RuntimeConfig::from_cli().map_err(|error| vec![error])?;

    let documents = WorkerPool::new(runtime_config.thread_count())
        .work(runtime_config.root_dir_path())
        .map_err(|mut errors| {
            messages.append(&mut errors);
            std::mem::take(&mut messages)
        })?;
    if documents.is_empty() {
        return Ok(messages);
    }

    let the_compile = typescript::compile(&documents, runtime_config.plugin_config());
    messages.extend(the_compile.messages);
    if let Err(error) =
        graphql::write_generated_file(runtime_config.output_file_path(), &the_compile.contents)
    {
        messages.push(error);
        return Err(messages);
    }
    Ok(messages)
}

fn main() {
    cli::print_work_result(run());
}
