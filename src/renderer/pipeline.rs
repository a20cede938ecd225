use gfx_hal::{format as f, pass::Subpass, prelude::*, pso, Backend};
use std::io::Cursor;
use std::mem::{self, ManuallyDrop};
use std::ptr;

use super::vertex::Vertex;
use crate::error::Error;

const ENTRY_NAME: &str = "main";

/// Graphics pipeline for a demo: embedded SPIR-V pair, one vertex buffer
/// binding carrying a vec4 position, triangle list, alpha blending.
pub struct Pipeline<'a, B: Backend> {
    device: &'a B::Device,
    pub pipeline: ManuallyDrop<B::GraphicsPipeline>,
    pub pipeline_layout: ManuallyDrop<B::PipelineLayout>,
}

impl<'a, B: Backend> Pipeline<'a, B> {
    pub fn new(
        device: &'a B::Device,
        vertex_shader: &[u8],
        fragment_shader: &[u8],
        render_pass: &B::RenderPass,
        set_layout: Option<&B::DescriptorSetLayout>,
    ) -> Result<Self, Error> {
        let pipeline_layout =
            ManuallyDrop::new(unsafe { device.create_pipeline_layout(set_layout, &[]) }?);

        let vs_module = Self::shader_module(device, vertex_shader)?;
        let fs_module = Self::shader_module(device, fragment_shader)?;

        let (vs_entry, fs_entry) = (
            pso::EntryPoint {
                entry: ENTRY_NAME,
                module: &vs_module,
                specialization: pso::Specialization::default(),
            },
            pso::EntryPoint {
                entry: ENTRY_NAME,
                module: &fs_module,
                specialization: pso::Specialization::default(),
            },
        );

        let shader_entries = pso::GraphicsShaderSet {
            vertex: vs_entry,
            hull: None,
            domain: None,
            geometry: None,
            fragment: Some(fs_entry),
        };

        let subpass = Subpass {
            index: 0,
            main_pass: render_pass,
        };

        let mut pipeline_desc = pso::GraphicsPipelineDesc::new(
            shader_entries,
            pso::Primitive::TriangleList,
            pso::Rasterizer::FILL,
            &*pipeline_layout,
            subpass,
        );
        pipeline_desc.blender.targets.push(pso::ColorBlendDesc {
            mask: pso::ColorMask::ALL,
            blend: Some(pso::BlendState::ALPHA),
        });

        pipeline_desc.vertex_buffers.push(pso::VertexBufferDesc {
            binding: 0,
            stride: mem::size_of::<Vertex>() as u32,
            rate: pso::VertexInputRate::Vertex,
        });

        pipeline_desc.attributes.push(pso::AttributeDesc {
            location: 0,
            binding: 0,
            element: pso::Element {
                format: f::Format::Rgba32Sfloat,
                offset: 0,
            },
        });

        let graphics_pipeline = unsafe { device.create_graphics_pipeline(&pipeline_desc, None) }?;

        unsafe {
            device.destroy_shader_module(vs_module);
            device.destroy_shader_module(fs_module);
        }

        Ok(Pipeline {
            device,
            pipeline: ManuallyDrop::new(graphics_pipeline),
            pipeline_layout,
        })
    }

    fn shader_module(device: &B::Device, spirv: &[u8]) -> Result<B::ShaderModule, Error> {
        let words = pso::read_spirv(Cursor::new(spirv))?;
        Ok(unsafe { device.create_shader_module(&words) }?)
    }
}

impl<'a, B: Backend> Drop for Pipeline<'a, B> {
    fn drop(&mut self) {
        unsafe {
            self.device
                .destroy_graphics_pipeline(ManuallyDrop::into_inner(ptr::read(&self.pipeline)));
            self.device
                .destroy_pipeline_layout(ManuallyDrop::into_inner(ptr::read(
                    &self.pipeline_layout,
                )));
        }
    }
}
