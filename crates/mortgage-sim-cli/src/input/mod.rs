pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// A request from `--input`, else from piped stdin. `None` means the caller
/// builds it from flags.
pub fn read_request<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => file::read_json(path).map(Some),
        None => stdin::read_piped(),
    }
}
