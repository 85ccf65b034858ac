pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Pick a command's input: `--input <file>` first, then the individual flags,
/// then JSON piped on stdin.
///
/// `from_flags` returns `None` when no flag was given. Stdin is only read in
/// that case, so a command driven by flags never blocks on an open pipe.
pub fn resolve<T, F>(path: Option<&str>, from_flags: F, usage: &str) -> Result<T, Box<dyn std::error::Error>>
where
    T: DeserializeOwned,
    F: FnOnce() -> Result<Option<T>, Box<dyn std::error::Error>>,
{
    if let Some(path) = path {
        return file::read_input(path);
    }
    if let Some(value) = from_flags()? {
        return Ok(value);
    }
    stdin::read_stdin()?.ok_or_else(|| usage.into())
}
