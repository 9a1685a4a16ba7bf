//! This module contains the thin layer over the platform: the SDL2 application, the GL driver
//! and the shader, texture and mesh helpers built on it.

pub mod app;
pub mod driver;
pub mod mesh;
pub mod shader;
pub mod texture;

pub use app::*;
