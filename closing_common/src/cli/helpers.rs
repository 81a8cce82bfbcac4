//! Helper functions that are common to CLI apps

use crate::cli::constants::*;
use crate::core::types::TransactionId;
use crate::validation;
use std::io::{stdin, stdout, Write};

/// **Contains full variants of all existing commands.**
///
/// Wrapped by `help()` so we can unit-test the contents,
/// so that we don't forget to include a newly-added command to help.
fn help_contents_full() -> String {
    format!("{HELP} {PENDING} {SHOW} {RECONCILE} {SETTLE} {LAST} {QUIT}")
}

/// **Contains short variants of all existing commands.**
fn help_contents_short() -> String {
    "h p s r t l q".to_string()
}

/// **Prints all existing commands in their full and short variants.**
pub fn help() {
    println!("{}", help_contents_full());
    println!("{}", help_contents_short());
}

/// **Reads standard input into a line.**
///
/// Signals an empty line so we can ignore it (in the main loop).
/// End of input is reported as `Err`, so the caller can stop.
pub fn read_from_stdin(label: &str) -> std::io::Result<Option<String>> {
    let mut lock = stdout().lock();
    write!(lock, "\n{label}")?;
    lock.flush()?;
    drop(lock);

    let mut line = String::new();
    if stdin().read_line(&mut line)? == 0 {
        return Err(std::io::ErrorKind::UnexpectedEof.into());
    }

    if line.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(line))
    }
}

/// **Parses the id argument of a command**
///
/// Prints the usage line if the argument is missing,
/// and an error message if it isn't a valid id.
pub fn id_argument(words: &[&str], usage: &str) -> Option<TransactionId> {
    let Some(word) = words.get(1) else {
        println!("{usage}");
        return None;
    };

    match validation::parse_transaction_id(word) {
        Ok(id) => Some(id),
        Err(msg) => {
            eprintln!("[ERROR] {}", msg);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{help_contents_full, help_contents_short, id_argument};

    #[test]
    fn test_help_contents() {
        let expected = "help pending show reconcile settle last quit".to_string();
        assert_eq!(help_contents_full(), expected);
    }

    #[test]
    fn test_help_contents_short() {
        let expected = "h p s r t l q".to_string();
        assert_eq!(help_contents_short(), expected);
    }

    #[test]
    fn test_id_argument() {
        assert_eq!(Some(3), id_argument(&["reconcile", "3"], "usage"));
        assert_eq!(None, id_argument(&["reconcile"], "usage"));
        assert_eq!(None, id_argument(&["reconcile", "x"], "usage"));
    }
}
