//! GPU state of the demo and the per-frame draw.
//!
//! [`Renderer`] owns every GL object the demo creates. It is built once on the render thread by
//! [`Renderer::setup`] and only ever used from that thread afterwards. Nothing is deleted
//! explicitly, the objects live until the context goes away with the process.

use crate::abs::driver::{Driver, check};
use crate::abs::mesh::{Attribs, Mesh, QUAD_VERTICES, QuadVertex};
use crate::abs::shader;
use crate::abs::texture::{self, RgbaImage};
use crate::error::SetupError;

const VERTEX_SHADER: &str = include_str!("shaders/quad/vert.glsl");
const FRAGMENT_SHADER: &str = include_str!("shaders/quad/frag.glsl");

/// Shader sources for the textured quad.
#[derive(Debug, Clone, Copy)]
pub struct ShaderSources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

impl Default for ShaderSources<'static> {
    fn default() -> Self {
        Self {
            vertex: VERTEX_SHADER,
            fragment: FRAGMENT_SHADER,
        }
    }
}

pub struct Renderer<D: Driver> {
    program: D::Program,
    quad: Mesh<D>,
    texture: D::Texture,
    attribs: Attribs,
    sampler: Option<D::UniformLocation>,
}

impl<D: Driver> Renderer<D> {
    /// Sets the viewport, builds the program, uploads the quad and the texture.
    pub fn setup(
        gl: &D,
        (width, height): (u32, u32),
        shaders: ShaderSources<'_>,
        image: &RgbaImage,
    ) -> Result<Self, SetupError> {
        gl.viewport(0, 0, width as i32, height as i32);
        check(gl, "viewport");

        let program = shader::program(gl, shaders.vertex, shaders.fragment)?;
        gl.use_program(Some(program));
        check(gl, "use_program");

        let attribs = Attribs {
            position: gl
                .get_attrib_location(program, "pos")
                .ok_or(SetupError::MissingAttribute("pos"))?,
            tex_coord: gl
                .get_attrib_location(program, "texIn")
                .ok_or(SetupError::MissingAttribute("texIn"))?,
        };
        let sampler = gl.get_uniform_location(program, "texture");
        if sampler.is_none() {
            log::warn!("Uniform `texture` is not active, sampling unit 0 by default");
        }
        gl.enable_vertex_attrib_array(attribs.position);
        gl.enable_vertex_attrib_array(attribs.tex_coord);
        check(gl, "attribute setup");

        let quad = Mesh::new::<QuadVertex>(gl, &QUAD_VERTICES, glow::TRIANGLE_FAN)?;
        let texture = texture::upload(gl, image)?;

        gl.clear_color(0.0, 0.0, 0.0, 1.0);

        log::info!(
            "GL ready: {width}x{height} viewport, {} vertices, {}x{} texture",
            quad.vertex_count(),
            image.width,
            image.height
        );

        Ok(Self {
            program,
            quad,
            texture,
            attribs,
            sampler,
        })
    }

    /// Draws one frame and blocks until the GPU is done with it.
    pub fn draw(&self, gl: &D) {
        gl.clear(glow::COLOR_BUFFER_BIT);
        gl.use_program(Some(self.program));
        self.quad.bind::<QuadVertex>(gl, &self.attribs);

        gl.active_texture(glow::TEXTURE0);
        gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
        gl.uniform_1_i32(self.sampler.as_ref(), 0);

        self.quad.draw(gl);
        gl.flush();
        gl.finish();
        check(gl, "draw");
    }
}
