//! The two tutorial programs, as data.
//!
//! Both demos run the same init and draw loop; everything that differs
//! between them lives in a [`Demo`]: the vertex constants, the SPIR-V pair
//! compiled by the build script, the clear color, and whether the frame
//! uniforms are written.

use crate::renderer::vertex::{Vertex, FULLSCREEN, TRIANGLE};

const PASSTHROUGH_VERT: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/passthrough.vert.spv"));
const TRIANGLE_FRAG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/triangle.frag.spv"));
const HEART_FRAG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/heart.frag.spv"));

const CLEAR_BLACK: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

pub struct Demo {
    pub name: &'static str,
    pub title: &'static str,
    pub vertices: &'static [Vertex],
    pub vertex_shader: &'static [u8],
    pub fragment_shader: &'static [u8],
    pub clear_color: [f32; 4],
    /// Whether the renderer writes [`FrameUniforms`] every frame.
    ///
    /// [`FrameUniforms`]: crate::renderer::uniforms::FrameUniforms
    pub uniforms: bool,
}

impl Demo {
    /// The white triangle.
    pub fn triangle() -> Self {
        Demo {
            name: "triangle",
            title: "First App",
            vertices: &TRIANGLE,
            vertex_shader: PASSTHROUGH_VERT,
            fragment_shader: TRIANGLE_FRAG,
            clear_color: CLEAR_BLACK,
            uniforms: false,
        }
    }

    /// The beating heart: same geometry upload, but a fullscreen triangle
    /// and an implicit-function fragment shader driven by the frame
    /// uniforms.
    pub fn heart() -> Self {
        Demo {
            name: "heart",
            title: "Heart",
            vertices: &FULLSCREEN,
            vertex_shader: PASSTHROUGH_VERT,
            fragment_shader: HEART_FRAG,
            clear_color: CLEAR_BLACK,
            uniforms: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSTHROUGH_VERT_SRC: &str = include_str!("data/passthrough.vert");
    const TRIANGLE_FRAG_SRC: &str = include_str!("data/triangle.frag");
    const HEART_FRAG_SRC: &str = include_str!("data/heart.frag");

    fn spirv_magic(bytes: &[u8]) -> u32 {
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[test]
    fn both_demos_upload_exactly_three_vertices() {
        assert_eq!(Demo::triangle().vertices.len(), 3);
        assert_eq!(Demo::heart().vertices.len(), 3);
    }

    #[test]
    fn triangle_demo_is_the_plain_white_triangle() {
        let demo = Demo::triangle();
        assert_eq!(demo.title, "First App");
        assert_eq!(demo.clear_color, CLEAR_BLACK);
        assert!(!demo.uniforms);
    }

    #[test]
    fn heart_demo_is_animated_and_fullscreen() {
        let demo = Demo::heart();
        assert!(demo.uniforms);
        assert_eq!(demo.vertices, &FULLSCREEN[..]);
    }

    #[test]
    fn embedded_shaders_are_spirv() {
        for demo in &[Demo::triangle(), Demo::heart()] {
            for spirv in &[demo.vertex_shader, demo.fragment_shader] {
                assert_eq!(spirv.len() % 4, 0);
                assert_eq!(spirv_magic(spirv), 0x0723_0203);
            }
        }
    }

    #[test]
    fn shader_sources_target_the_pinned_glsl_version() {
        for src in &[PASSTHROUGH_VERT_SRC, TRIANGLE_FRAG_SRC, HEART_FRAG_SRC] {
            assert!(src.starts_with("#version 450"));
            assert!(src.contains("void main()"));
        }
    }

    #[test]
    fn vertex_shader_is_a_passthrough() {
        assert!(PASSTHROUGH_VERT_SRC.contains("layout(location = 0) in vec4 position"));
        assert!(PASSTHROUGH_VERT_SRC.contains("gl_Position = position"));
    }

    #[test]
    fn triangle_fragment_writes_constant_white() {
        assert!(TRIANGLE_FRAG_SRC.contains("vec4(1.0, 1.0, 1.0, 1.0)"));
        assert!(!TRIANGLE_FRAG_SRC.contains("uniform"));
    }

    #[test]
    fn heart_fragment_reads_the_frame_uniform_block() {
        assert!(HEART_FRAG_SRC.contains("uniform FrameUniforms"));
        for field in &["resolution", "time", "pulse"] {
            assert!(
                HEART_FRAG_SRC.contains(field),
                "missing uniform field {}",
                field
            );
        }
    }

    #[test]
    fn heart_fragment_evaluates_the_implicit_curve() {
        assert!(HEART_FRAG_SRC.contains("float heart(vec2 p)"));
        assert!(HEART_FRAG_SRC.contains("gl_FragCoord"));
    }
}
