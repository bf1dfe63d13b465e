use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `netmedic`.
///
/// Only configuration and programming mistakes live here. Operational
/// problems (a check timing out, a fix action failing, another run holding
/// the interface) are captured as data inside the report and never surface
/// as an `Err`.
#[derive(Debug, Error)]
pub enum NetmedicError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Engine wiring ───────────────────────────────────────────────────
    #[error("engine: {0}")]
    Engine(#[from] EngineError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Engine errors ───────────────────────────────────────────────────────────

/// Fatal errors returned by the engine. These indicate a broken setup, not
/// a broken network.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("malformed action registry: {0}")]
    Registry(String),

    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("internal: {0}")]
    Internal(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, NetmedicError>;
