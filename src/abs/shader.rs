//! OpenGL shaders
//!
//! Compiles the individual stages and links them into a program. Failures carry the log the
//! driver reported so the caller can show exactly what went wrong.

use crate::abs::driver::{Driver, check};
use crate::error::SetupError;

fn stage_name(kind: u32) -> &'static str {
    match kind {
        glow::VERTEX_SHADER => "vertex",
        glow::FRAGMENT_SHADER => "fragment",
        _ => "unknown",
    }
}

/// Compiles a shader of the given kind from source.
pub fn compile<D: Driver>(gl: &D, kind: u32, source: &str) -> Result<D::Shader, SetupError> {
    let stage = stage_name(kind);
    let shader = gl
        .create_shader(kind)
        .map_err(|reason| SetupError::CreateObject {
            object: "shader",
            reason,
        })?;
    check(gl, "create_shader");
    gl.shader_source(shader, source);
    check(gl, "shader_source");
    gl.compile_shader(shader);
    check(gl, "compile_shader");

    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(SetupError::ShaderCompile { stage, log });
    }

    log::debug!("Compiled {stage} shader");
    Ok(shader)
}

/// Links a program from already compiled shaders.
pub fn link<D: Driver>(gl: &D, shaders: &[D::Shader]) -> Result<D::Program, SetupError> {
    let program = gl
        .create_program()
        .map_err(|reason| SetupError::CreateObject {
            object: "program",
            reason,
        })?;

    for shader in shaders {
        gl.attach_shader(program, *shader);
    }
    gl.link_program(program);

    if !gl.get_program_link_status(program) {
        let log = gl.get_program_info_log(program);
        gl.delete_program(program);
        return Err(SetupError::ProgramLink { log });
    }

    Ok(program)
}

/// Compiles both stages and links them.
pub fn program<D: Driver>(gl: &D, vertex: &str, fragment: &str) -> Result<D::Program, SetupError> {
    let fragment = compile(gl, glow::FRAGMENT_SHADER, fragment)?;
    let vertex = compile(gl, glow::VERTEX_SHADER, vertex)?;
    link(gl, &[fragment, vertex])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abs::driver::mock::{Call, MockGl};

    #[test]
    fn test_compile_failure_carries_driver_log() {
        let mut gl = MockGl::default();
        gl.compile_failure = Some((
            glow::VERTEX_SHADER,
            "0:3(9): error: syntax error, unexpected IDENTIFIER".to_string(),
        ));

        let err = program(&gl, "attribute vec4 pos garbage", "void main() {}").unwrap_err();
        match &err {
            SetupError::ShaderCompile { stage, log } => {
                assert_eq!(*stage, "vertex");
                assert!(log.contains("syntax error, unexpected IDENTIFIER"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().contains("syntax error, unexpected IDENTIFIER"));

        let calls = gl.calls.lock().unwrap();
        assert!(calls.iter().any(|c| matches!(c, Call::DeleteShader(_))));
        assert!(!calls.contains(&Call::LinkProgram));
    }

    #[test]
    fn test_link_failure_carries_driver_log() {
        let mut gl = MockGl::default();
        gl.link_failure = Some("error: vertex shader lacks `main'".to_string());

        let err = program(&gl, "", "").unwrap_err();
        assert!(matches!(
            &err,
            SetupError::ProgramLink { log } if log.contains("lacks `main'")
        ));
        assert!(gl.calls.lock().unwrap().contains(&Call::DeleteProgram));
    }

    #[test]
    fn test_program_attaches_both_stages() {
        let gl = MockGl::default();
        program(&gl, "", "").unwrap();

        let calls = gl.calls.lock().unwrap();
        let attached = calls
            .iter()
            .filter(|c| matches!(c, Call::AttachShader(_)))
            .count();
        assert_eq!(attached, 2);
        assert!(calls.contains(&Call::LinkProgram));
    }
}
