mod source;

pub use source::RouteSource;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, IsTerminal, Read, Stdin, StdoutLock, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use circu_forge::ValidatedRoute;
use circu_forge::io::catalog::Catalog;
use circu_forge::io::read_route;

/// Returns `true` if stderr is a terminal (interactive).
pub fn stderr_is_tty() -> bool {
    io::stderr().is_terminal()
}

/// Returns `true` if stdin is a terminal (interactive).
pub fn stdin_is_tty() -> bool {
    io::stdin().is_terminal()
}

pub enum InputSource {
    File(BufReader<File>),
    Stdin(BufReader<Stdin>),
}

impl Read for InputSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputSource::File(r) => r.read(buf),
            InputSource::Stdin(r) => r.read(buf),
        }
    }
}

impl BufRead for InputSource {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            InputSource::File(r) => r.fill_buf(),
            InputSource::Stdin(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            InputSource::File(r) => r.consume(amt),
            InputSource::Stdin(r) => r.consume(amt),
        }
    }
}

pub fn open_input(path: Option<&Path>) -> Result<InputSource> {
    match path {
        Some(p) => {
            let file = File::open(p)
                .with_context(|| format!("Failed to open input file: {}", p.display()))?;
            Ok(InputSource::File(BufReader::new(file)))
        }
        None => Ok(InputSource::Stdin(BufReader::new(io::stdin()))),
    }
}

pub enum OutputTarget {
    File(BufWriter<File>),
    Stdout(BufWriter<StdoutLock<'static>>),
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::File(w) => w.write(buf),
            OutputTarget::Stdout(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::File(w) => w.flush(),
            OutputTarget::Stdout(w) => w.flush(),
        }
    }
}

pub fn create_output(path: Option<&Path>) -> Result<OutputTarget> {
    match path {
        Some(p) => {
            let file = File::create(p)
                .with_context(|| format!("Failed to create output file: {}", p.display()))?;
            Ok(OutputTarget::File(BufWriter::new(file)))
        }
        None => Ok(OutputTarget::Stdout(BufWriter::new(io::stdout().lock()))),
    }
}

/// Loads and validates the route named by `source`.
pub fn load_route(source: &RouteSource) -> Result<ValidatedRoute> {
    match source {
        RouteSource::Catalog(id) => {
            let entry = Catalog::builtin().require_route(id)?;
            Ok(ValidatedRoute {
                route: entry.route.clone(),
                warnings: Vec::new(),
            })
        }
        RouteSource::Stdin => {
            if stdin_is_tty() {
                bail!(
                    "No route file specified and stdin is a terminal.\n\nUsage: cforge eval <ROUTE> or pipe JSON via stdin."
                );
            }
            let input = open_input(None)?;
            read_route(input).context("Failed to read route from stdin")
        }
        RouteSource::File(path) => {
            let input = open_input(Some(path))?;
            read_route(input).with_context(|| format!("Failed to read route: {}", path.display()))
        }
    }
}

/// Loads every source; at most one may read stdin.
pub fn load_routes(sources: &[&RouteSource]) -> Result<Vec<ValidatedRoute>> {
    let stdin_uses = sources
        .iter()
        .filter(|s| matches!(s, RouteSource::Stdin))
        .count();
    if stdin_uses > 1 {
        bail!("Only one route can be read from stdin");
    }
    sources.iter().map(|s| load_route(s)).collect()
}
