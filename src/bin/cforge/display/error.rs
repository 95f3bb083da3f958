use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = HintCollector::collect(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn new() -> Self {
        Self {
            hints: Vec::new(),
            has_typed_hints: false,
        }
    }

    fn collect(err: &Error) -> Option<Vec<String>> {
        let mut collector = Self::new();

        collector.collect_io_hints(err);
        collector.collect_validation_hints(err);
        collector.collect_generation_hints(err);
        collector.collect_compare_hints(err);

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        if collector.hints.is_empty() {
            None
        } else {
            Some(collector.hints)
        }
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_io_hints(&mut self, err: &Error) {
        use circu_forge::io::{Error as IoError, Format};

        let Some(io_err) = err.downcast_ref::<IoError>() else {
            return;
        };

        self.mark_typed();

        match io_err {
            IoError::Io { source } => self.collect_std_io_hints(source),

            IoError::Parse {
                format: Format::Json,
                ..
            } => {
                self.add("The route file is not valid JSON");
                self.add("Check for trailing commas, unquoted keys, or truncated input");
            }

            IoError::Parse {
                format: Format::Toml,
                ..
            } => {
                self.add("The scoring configuration is not valid TOML");
                self.add("Expected keys: [weights] recycled_content, recovery, carbon_savings");
            }

            IoError::Write { .. } => {
                self.add("Serializing the result failed");
                self.add("This may indicate a bug, please report if reproducible");
            }

            IoError::InvalidRoute(e) => self.add_validation_hints(e),

            IoError::Catalog { route, .. } => {
                self.add(format!("The built-in route '{}' failed validation", route));
                self.add("This is a packaging bug, please report it");
            }

            IoError::UnknownReference { kind, id } => {
                self.add(format!("No {} named '{}' in the built-in catalog", kind, id));
                self.add("Run `cforge catalog` to list available routes");
            }
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check the path spelling and ensure the file exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            ErrorKind::InvalidData => {
                self.add("Input is not valid UTF-8 text");
                self.add("Route payloads must be UTF-8 encoded JSON");
            }

            ErrorKind::UnexpectedEof => {
                self.add("Unexpected end of input");
                self.add("The file may be truncated or incomplete");
            }

            ErrorKind::BrokenPipe => {
                self.add("Output consumer terminated early");
                self.add("This may occur when piping to commands like `head`");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn collect_validation_hints(&mut self, err: &Error) {
        use circu_forge::ValidationError;

        let Some(e) = err.downcast_ref::<ValidationError>() else {
            return;
        };

        self.mark_typed();
        self.add_validation_hints(e);
    }

    fn add_validation_hints(&mut self, e: &circu_forge::ValidationError) {
        use circu_forge::ValidationError;

        match e {
            ValidationError::NotAnObject => {
                self.add("A route must be a JSON object with a `stages` array");
            }

            ValidationError::NoStages => {
                self.add("The route needs at least one stage");
                self.add("Check that the `stages` key is spelled correctly");
            }

            ValidationError::UnknownStageType { value, .. } => {
                self.add(format!("'{}' is not a known stage type", value));
                self.add(
                    "Valid types: extraction, beneficiation, smelting, refining, manufacturing, \
                     use, eol, recycling",
                );
            }

            ValidationError::DuplicateStageId { id, .. } => {
                self.add(format!("Rename one of the stages called '{}'", id));
                self.add("Loop targets resolve by id, so ids must be unique");
            }

            ValidationError::InvalidField { field, .. } => {
                self.add(format!("Inspect `{}` on the reported stage", field));
                self.add("Metrics must be finite, non-negative numbers");
            }

            ValidationError::InvalidRouteField { field, .. } => {
                self.add(format!("Inspect the route-level field `{}`", field));
            }
        }
    }

    fn collect_generation_hints(&mut self, err: &Error) {
        use circu_forge::io::generator::GenerationError;

        let Some(e) = err.downcast_ref::<GenerationError>() else {
            return;
        };

        self.mark_typed();

        match e {
            GenerationError::Upstream(_) => {
                self.add("The generator could not produce a route for this request");
                self.add("Try a different ore name or omit --grade");
            }

            GenerationError::Status { status, .. } if *status >= 500 => {
                self.add("The generator service reported an internal error");
                self.add("Retry later or check the service logs");
            }

            GenerationError::Status { .. } => {
                self.add("The generator rejected the request");
                self.add("Check --endpoint and the request parameters");
            }

            GenerationError::Transport(_) => {
                self.add("Could not connect to the generator service");
                self.add("Check --endpoint or the CFORGE_GENERATOR_URL variable");
            }

            GenerationError::Timeout(_) => {
                self.add("The generator is slow to respond");
                self.add("Increase --timeout and try again");
            }

            GenerationError::Decode(_) => {
                self.add("The generator response was not JSON");
                self.add("Check that --endpoint points at the route generator");
            }

            GenerationError::InvalidRoute(inner) => {
                self.add("The generator returned a route that failed validation");
                self.add_validation_hints(inner);
            }
        }
    }

    fn collect_compare_hints(&mut self, err: &Error) {
        use circu_forge::CompareError;

        let Some(e) = err.downcast_ref::<CompareError>() else {
            return;
        };

        self.mark_typed();

        match e {
            CompareError::MetalMismatch { expected, .. } => {
                self.add(format!("Every scenario must produce '{}'", expected));
                self.add("Drop --metal to compare routes without the metal check");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("terminal") || msg.contains("stdin") {
            self.add("Input appears to be from a terminal");
            self.add("Provide a route file or pipe JSON to stdin");
            return;
        }

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
            self.add("Verify the file exists and is readable");
            return;
        }

        if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
            return;
        }

        if msg.contains("weight") {
            self.add("Weights must be finite and non-negative");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    let mut text = String::new();

    text.push_str(&err.to_string());

    let mut source = err.source();
    while let Some(cause) = source {
        text.push('\n');
        text.push_str(&cause.to_string());
        source = cause.source();
    }

    text.to_lowercase()
}
