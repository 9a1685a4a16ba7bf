//! Error types shared by the loops and the GL setup code.

use thiserror::Error;

/// Everything that can stop the render loop before its first frame. None of these are
/// recoverable, the caller decides how the process goes down.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to make the rendering context current: {0}")]
    Context(String),

    #[error("failed to create a GL {object}: {reason}")]
    CreateObject { object: &'static str, reason: String },

    #[error("error compiling {stage} shader:\n{log}")]
    ShaderCompile { stage: &'static str, log: String },

    #[error("error linking program:\n{log}")]
    ProgramLink { log: String },

    #[error("shader program has no active attribute `{0}`")]
    MissingAttribute(&'static str),

    #[error("failed to load asset `{path}`: {source}")]
    Asset {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Returned by a control handle once the loop on the other end has stopped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("the {0} loop is no longer running")]
    Closed(&'static str),
}
