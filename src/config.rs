use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::pet::{canvas_fits, SPRITE_SIZE};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_CANVAS_WIDTH: &str = "800";
const DEFAULT_CANVAS_HEIGHT: &str = "600";
const DEFAULT_SPRITE_ROOT: &str = "/static/sprites/cat";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Server settings, read from `PET_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Canvas the pet starts on, until a client reconfigures it.
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// URL prefix the sprite files are served under.
    pub sprite_root: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Missing keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let canvas_width = parse(&lookup, "PET_CANVAS_WIDTH", DEFAULT_CANVAS_WIDTH)?;
        let canvas_height = parse(&lookup, "PET_CANVAS_HEIGHT", DEFAULT_CANVAS_HEIGHT)?;
        // Same bound `/pet/init` enforces; the pet must fit on its canvas.
        if !canvas_fits(canvas_width, canvas_height) {
            let (key, value) = if canvas_width < SPRITE_SIZE {
                ("PET_CANVAS_WIDTH", canvas_width)
            } else {
                ("PET_CANVAS_HEIGHT", canvas_height)
            };
            return Err(ConfigError::Invalid {
                key,
                value: value.to_string(),
            });
        }

        Ok(Self {
            bind_addr: parse(&lookup, "PET_BIND_ADDR", DEFAULT_BIND_ADDR)?,
            canvas_width,
            canvas_height,
            sprite_root: lookup("PET_SPRITE_ROOT")
                .unwrap_or_else(|| DEFAULT_SPRITE_ROOT.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError> {
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    let parsed: Result<T, _> = value.trim().parse();
    parsed.map_err(|_| ConfigError::Invalid { key, value })
}
