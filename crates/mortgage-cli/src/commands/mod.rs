pub mod amortization;
pub mod strategy;

use serde::de::DeserializeOwned;

use crate::input;

/// Typed input from `--input <file>` or piped stdin, if either is present.
pub(crate) fn load_input<T: DeserializeOwned>(
    path: &Option<String>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(input::file::read_input(path)?));
    }
    input::stdin::read_stdin()
}
