use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Piped JSON from stdin, parsed as `T`. `None` when stdin is a terminal or
/// nothing was piped.
pub fn read_piped<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw)?;
    parse_piped(&raw)
}

fn parse_piped<T: DeserializeOwned>(raw: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let body = raw.trim();
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| format!("Failed to parse piped request: {e}").into())
}
