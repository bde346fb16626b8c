pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a request from `--input <file>` or, failing that, piped stdin.
pub fn read_request<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json(path);
    }
    stdin::read_stdin()?.ok_or_else(|| "--input <file.json> or stdin required".into())
}
