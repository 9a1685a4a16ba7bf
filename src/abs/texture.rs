//! Structs and functions for handling textures.
//!
//! [`RgbaImage`] is the CPU side of the texture, [`upload`] puts it on the GPU.

use image::GenericImageView;

use crate::abs::driver::{Driver, check};
use crate::error::SetupError;

/// Decoded pixels ready for `glTexImage2D`: rows top to bottom, four bytes per pixel in R, G, B,
/// A order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    /// Decodes a PNG file into RGBA8 pixels.
    pub fn decode(bytes: &[u8]) -> Result<Self, SetupError> {
        let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?;
        let (width, height) = image.dimensions();
        Ok(Self {
            width,
            height,
            pixels: image.to_rgba8().into_raw(),
        })
    }
}

/// Uploads the image as a 2D texture with nearest filtering and leaves it bound.
pub fn upload<D: Driver>(gl: &D, image: &RgbaImage) -> Result<D::Texture, SetupError> {
    let texture = gl
        .create_texture()
        .map_err(|reason| SetupError::CreateObject {
            object: "texture",
            reason,
        })?;
    gl.bind_texture(glow::TEXTURE_2D, Some(texture));
    gl.tex_parameter_i32(
        glow::TEXTURE_2D,
        glow::TEXTURE_MIN_FILTER,
        glow::NEAREST as i32,
    );
    gl.tex_parameter_i32(
        glow::TEXTURE_2D,
        glow::TEXTURE_MAG_FILTER,
        glow::NEAREST as i32,
    );
    gl.tex_image_2d_rgba(image.width as i32, image.height as i32, &image.pixels);
    check(gl, "texture upload");

    log::debug!("Uploaded {}x{} texture", image.width, image.height);
    Ok(texture)
}

#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    let image = image::RgbaImage::from_raw(width, height, pixels.to_vec()).unwrap();
    let mut bytes = std::io::Cursor::new(Vec::new());
    image.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}
