use crate::cli::PrintableMessage;
use crate::graphql::{self, ParsedDocument};
use channel::{Receiver, Sender};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const SKIPPED_DIR_NAMES: &[&str] = &["node_modules", "__generated__"];

type WorkResult = Result<ParsedDocument, PrintableMessage>;

#[derive(Debug)]
enum Message {
    Work(Work),
    Quit,
}

#[derive(Debug)]
enum Work {
    GraphQL(PathBuf),
    DirEntry(PathBuf),
}

fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SKIPPED_DIR_NAMES.contains(&name))
}

impl Work {
    fn run_dir_entry(&self, path: &Path) -> Result<Vec<Work>, std::io::Error> {
        let readdir = fs::read_dir(path)?;
        let mut more_work = vec![];
        for raw_entry in readdir {
            let entry = raw_entry?;
            // Symlinked directories are not followed, so link cycles cannot loop the walk
            let file_type = entry.file_type()?;
            let path = entry.path();
            if file_type.is_dir() {
                if !is_skipped_dir(&path) {
                    more_work.push(Work::DirEntry(path));
                }
            } else if path.is_file() && path.extension().is_some_and(|x| x == "graphql") {
                more_work.push(Work::GraphQL(path));
            }
        }
        Ok(more_work)
    }

    /// Runs this unit of work, returning any work it discovered.
    fn run(&self, results: &Sender<WorkResult>) -> Vec<Work> {
        let (more_work, result) = match self {
            Work::DirEntry(path) => match self.run_dir_entry(path) {
                Ok(more_work) => (more_work, None),
                Err(io_error) => (
                    vec![],
                    Some(Err(PrintableMessage::new_compile_error_from_read_io_error(
                        &io_error, path,
                    ))),
                ),
            },
            Work::GraphQL(path) => (vec![], Some(graphql::load_document(path))),
        };
        if let Some(result) = result {
            results
                .send(result)
                .expect("result receiver outlives workers");
        }
        more_work
    }
}

struct Worker {
    threads: usize,
    num_pending: Arc<AtomicUsize>,
    tx: Sender<Message>,
    rx: Receiver<Message>,
    results: Sender<WorkResult>,
}

impl Worker {
    fn run(self) {
        while let Ok(Message::Work(work)) = self.rx.recv() {
            for more_work in work.run(&self.results) {
                // Count new work before finishing the current one so the count never hits zero early
                self.num_pending.fetch_add(1, Ordering::SeqCst);
                self.send(Message::Work(more_work));
            }
            if self.num_pending.fetch_sub(1, Ordering::SeqCst) == 1 {
                for _ in 0..self.threads {
                    self.send(Message::Quit);
                }
            }
        }
    }

    fn send(&self, message: Message) {
        self.tx
            .send(message)
            .expect("every worker holds a receiver");
    }
}

pub struct WorkerPool {
    num_workers: usize,
}

impl WorkerPool {
    pub fn new(num_workers: u8) -> WorkerPool {
        WorkerPool {
            num_workers: usize::from(num_workers.max(1)),
        }
    }

    /// Finds and parses every `.graphql` document below `root_dir`, sorted by path.
    pub fn work(&self, root_dir: &Path) -> Result<Vec<ParsedDocument>, Vec<PrintableMessage>> {
        let threads = self.num_workers;
        let (tx, rx) = channel::unbounded();
        let (results_tx, results_rx) = channel::unbounded();
        let num_pending = Arc::new(AtomicUsize::new(1));
        tx.send(Message::Work(Work::DirEntry(root_dir.to_path_buf())))
            .map_err(|_| vec![PrintableMessage::new_simple_program_error("work queue closed")])?;

        let handles = (0..threads)
            .map(|_| {
                let worker = Worker {
                    threads,
                    num_pending: num_pending.clone(),
                    tx: tx.clone(),
                    rx: rx.clone(),
                    results: results_tx.clone(),
                };
                thread::spawn(|| worker.run())
            })
            .collect::<Vec<_>>();
        drop(tx);
        drop(rx);
        drop(results_tx);

        let mut errors = Vec::new();
        for handle in handles {
            if handle.join().is_err() {
                errors.push(PrintableMessage::new_simple_program_error(
                    "a worker thread panicked",
                ));
            }
        }

        let mut documents = Vec::new();
        for result in results_rx.iter() {
            match result {
                Ok(document) => documents.push(document),
                Err(message) => errors.push(message),
            }
        }
        if !errors.is_empty() {
            errors.sort_by(|a, b| a.file_path().cmp(&b.file_path()));
            return Err(errors);
        }
        documents.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(documents)
    }
}
