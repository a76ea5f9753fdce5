//! Decode command handler.

use color_eyre::Result;

use crate::config::Config;
use crate::wire::{self, HeaderMode};

use super::App;

impl App {
    /// Decode a single wire value and print the text.
    pub fn run_decode(&self, value: &str, header: Option<HeaderMode>) -> Result<()> {
        let mode = match header {
            Some(mode) => mode,
            None => Config::load()?.decoder.header,
        };

        let decoded = wire::decode_with(value, mode);
        if decoded.is_fallback() {
            tracing::debug!(%mode, "value is not an envelope, printed as is");
        }
        println!("{}", decoded.as_str());
        Ok(())
    }
}
