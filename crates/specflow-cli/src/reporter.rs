/// Progress observer injected into commands.
///
/// Keeps console concerns out of `specflow-core`; tests swap in a
/// recording implementation.
pub trait Reporter {
    /// A step or section heading.
    fn progress(&self, message: &str);
    /// A completed per-file action; rendered indented under the last heading.
    fn success(&self, message: &str);
    /// A per-item failure, reported before the error propagates.
    fn failure(&self, message: &str);
}

pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn progress(&self, message: &str) {
        println!("{message}");
    }

    fn success(&self, message: &str) {
        println!("  {message}");
    }

    fn failure(&self, message: &str) {
        eprintln!("  {message}");
    }
}

/// Used with `--json` so stdout stays machine-parseable; failures still
/// reach stderr.
pub struct QuietReporter;

impl Reporter for QuietReporter {
    fn progress(&self, _message: &str) {}

    fn success(&self, _message: &str) {}

    fn failure(&self, message: &str) {
        eprintln!("  {message}");
    }
}
