use nu_ansi_term::{Color, Style};
use std::fmt;

/// Formats a byte count with binary prefixes, eg. `1.5 KiB`
pub fn bytes_to_human(bytes: u64) -> String {
    use number_prefix::NumberPrefix;

    match NumberPrefix::binary(bytes as f64) {
        NumberPrefix::Standalone(b) => format!("{b} B"),
        NumberPrefix::Prefixed(prefix, n) => format!("{n:.1} {prefix}B"),
    }
}

/// Joins an error and all of its sources, outermost first
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();

    while let Some(err) = source {
        msg.push_str(": ");
        msg.push_str(&err.to_string());
        source = err.source();
    }

    msg
}

/// User facing progress output. Everything except failures is suppressed when
/// not verbose.
#[derive(Clone, Copy)]
pub struct Reporter {
    verbose: bool,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn debug(&self, msg: impl fmt::Display) {
        log::debug!("{msg}");
        if self.verbose {
            println!("{} {msg}", Style::new().dimmed().paint("DEBUG"));
        }
    }

    pub fn uploaded(&self, name: &str, size: u64) {
        log::info!("created object {name} ({size} bytes)");
        if self.verbose {
            println!(
                "{} {name} {}",
                Color::Green.paint("OK"),
                Style::new().dimmed().paint(bytes_to_human(size)),
            );
        }
    }

    pub fn failed(&self, err: &crate::Error) {
        eprintln!("{} {}", Color::Red.paint("ERR"), error_chain(err));
    }
}
