//! The per-frame draw loop and everything it owns.
//!
//! One renderer per demo: a vertex buffer holding the demo's three
//! vertices, the pipeline built from its shader pair, an optional uniform
//! block when the demo animates, and the swapchain plus per-frame
//! synchronization primitives. Each frame is the same fixed sequence:
//! acquire an image, record the command buffer, submit, present.

use gfx_hal::{
    adapter, buffer as b, command, format as f, image as i, pass, pool,
    prelude::*,
    queue::{family::QueueFamilyId, Submission},
    window, Backend,
};

use std::borrow::Borrow;
use std::iter;
use std::mem::ManuallyDrop;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

mod buffer;
mod memory;
mod pipeline;
mod swapchain;
pub mod uniforms;
pub mod vertex;

use buffer::Buffer;
use memory::Memory;
use pipeline::Pipeline;
use swapchain::Swapchain;
use uniforms::{pulse, FrameUniforms, Uniforms};
use vertex::Vertex;

use crate::demo::Demo;
use crate::error::Error;

const FRAMES_IN_FLIGHT: usize = 2;

pub struct Renderer<'a, B: Backend> {
    frame: usize,
    start: Instant,
    vertex_count: u32,
    clear_color: [f32; 4],
    device: &'a B::Device,
    resized: Arc<AtomicBool>,
    command_pools: Vec<B::CommandPool>,
    command_buffers: Vec<B::CommandBuffer>,
    submission_complete_semaphores: Vec<B::Semaphore>,
    submission_complete_fences: Vec<B::Fence>,
    framebuffers: Vec<Option<B::Framebuffer>>,
    uniforms: Option<ManuallyDrop<Uniforms<'a, B>>>,
    vertices: ManuallyDrop<Memory<'a, B, Vertex>>,
    swapchain: ManuallyDrop<Swapchain<'a, B>>,
    render_pass: ManuallyDrop<B::RenderPass>,
    pipeline: ManuallyDrop<Pipeline<'a, B>>,
}

impl<'a, B> Renderer<'a, B>
where
    B: Backend,
{
    pub fn new(
        surface: &'a mut B::Surface,
        adapter: &'a adapter::Adapter<B>,
        device: &'a B::Device,
        family: QueueFamilyId,
        init_dims: window::Extent2D,
        resized: Arc<AtomicBool>,
        demo: &Demo,
    ) -> Result<Self, Error> {
        let memory_types = adapter.physical_device.memory_properties().memory_types;
        let limits = adapter.physical_device.limits();

        let uniforms = if demo.uniforms {
            Some(Uniforms::new(device, &memory_types, &limits)?)
        } else {
            None
        };

        let vertex_buffer = Buffer::new(device, demo.vertices.len(), b::Usage::VERTEX, &limits)?;
        let mut vertices = Memory::new(vertex_buffer, &memory_types)?;
        vertices.write(demo.vertices)?;

        let swapchain = Swapchain::new(device, surface, adapter, init_dims)?;
        let render_pass = Self::create_render_pass(device, swapchain.format)?;
        let pipeline = Pipeline::new(
            device,
            demo.vertex_shader,
            demo.fragment_shader,
            &render_pass,
            uniforms.as_ref().map(|u| &*u.layout),
        )?;

        let mut command_pools = Self::create_command_pools(device, family)?;
        let command_buffers = Self::allocate_command_buffers(&mut command_pools);
        let submission_complete_semaphores = Self::create_semaphores(device)?;
        let submission_complete_fences = Self::create_fences(device)?;

        Ok(Renderer {
            frame: 0,
            start: Instant::now(),
            vertex_count: demo.vertices.len() as u32,
            clear_color: demo.clear_color,
            device,
            resized,
            command_pools,
            command_buffers,
            submission_complete_semaphores,
            submission_complete_fences,
            framebuffers: (0..FRAMES_IN_FLIGHT).map(|_| None).collect(),
            uniforms: uniforms.map(ManuallyDrop::new),
            vertices: ManuallyDrop::new(vertices),
            swapchain: ManuallyDrop::new(swapchain),
            render_pass: ManuallyDrop::new(render_pass),
            pipeline: ManuallyDrop::new(pipeline),
        })
    }

    pub fn render(&mut self, queue: &mut B::CommandQueue) {
        if self.resized.swap(false, Ordering::Relaxed) {
            self.swapchain
                .recreate()
                .expect("failed to reconfigure the swapchain");
        }

        let surface_image = unsafe {
            match self.swapchain.surface.acquire_image(!0) {
                Ok((image, _)) => image,
                Err(_) => {
                    self.swapchain
                        .recreate()
                        .expect("failed to reconfigure the swapchain");
                    return;
                }
            }
        };

        let frame_idx = self.frame % FRAMES_IN_FLIGHT;

        unsafe {
            let fence = &self.submission_complete_fences[frame_idx];
            self.device
                .wait_for_fence(fence, !0)
                .expect("failed to wait for the frame fence");
            self.device
                .reset_fence(fence)
                .expect("failed to reset the frame fence");
            // This slot's previous submission has retired; its framebuffer
            // and command buffer are free to reuse.
            if let Some(framebuffer) = self.framebuffers[frame_idx].take() {
                self.device.destroy_framebuffer(framebuffer);
            }
            self.command_pools[frame_idx].reset(false);
        }

        let extent = self.swapchain.extent;
        let framebuffer = unsafe {
            self.device.create_framebuffer(
                &self.render_pass,
                iter::once(surface_image.borrow()),
                i::Extent {
                    width: extent.width,
                    height: extent.height,
                    depth: 1,
                },
            )
        }
        .expect("failed to create a framebuffer");

        if let Some(uniforms) = self.uniforms.as_mut() {
            let time = self.start.elapsed().as_secs_f32();
            uniforms
                .update(FrameUniforms {
                    resolution: [extent.width as f32, extent.height as f32],
                    time,
                    pulse: pulse(time),
                })
                .expect("failed to write frame uniforms");
        }

        let cmd_buffer = &mut self.command_buffers[frame_idx];
        unsafe {
            cmd_buffer.begin_primary(command::CommandBufferFlags::ONE_TIME_SUBMIT);
            cmd_buffer.set_viewports(0, &[self.swapchain.viewport.clone()]);
            cmd_buffer.set_scissors(0, &[self.swapchain.viewport.rect]);
            cmd_buffer.bind_graphics_pipeline(&self.pipeline.pipeline);
            cmd_buffer.bind_vertex_buffers(
                0,
                iter::once((&*self.vertices.buffer.buf, b::SubRange::WHOLE)),
            );
            if let Some(uniforms) = self.uniforms.as_ref() {
                cmd_buffer.bind_graphics_descriptor_sets(
                    &self.pipeline.pipeline_layout,
                    0,
                    iter::once(&uniforms.set),
                    &[],
                );
            }
            cmd_buffer.begin_render_pass(
                &self.render_pass,
                &framebuffer,
                self.swapchain.viewport.rect,
                &[command::ClearValue {
                    color: command::ClearColor {
                        float32: self.clear_color,
                    },
                }],
                command::SubpassContents::Inline,
            );
            cmd_buffer.draw(0..self.vertex_count, 0..1);
            cmd_buffer.end_render_pass();
            cmd_buffer.finish();

            let submission = Submission {
                command_buffers: iter::once(&*cmd_buffer),
                wait_semaphores: None,
                signal_semaphores: iter::once(&self.submission_complete_semaphores[frame_idx]),
            };

            queue.submit(
                submission,
                Some(&self.submission_complete_fences[frame_idx]),
            );

            let result = queue.present_surface(
                &mut self.swapchain.surface,
                surface_image,
                Some(&self.submission_complete_semaphores[frame_idx]),
            );

            if result.is_err() {
                self.swapchain
                    .recreate()
                    .expect("failed to reconfigure the swapchain");
            }
        }

        self.framebuffers[frame_idx] = Some(framebuffer);
        self.frame += 1;
    }

    fn create_render_pass(device: &B::Device, format: f::Format) -> Result<B::RenderPass, Error> {
        let attachment = pass::Attachment {
            format: Some(format),
            samples: 1,
            ops: pass::AttachmentOps::new(
                pass::AttachmentLoadOp::Clear,
                pass::AttachmentStoreOp::Store,
            ),
            stencil_ops: pass::AttachmentOps::DONT_CARE,
            layouts: i::Layout::Undefined..i::Layout::Present,
        };

        let subpass = pass::SubpassDesc {
            colors: &[(0, i::Layout::ColorAttachmentOptimal)],
            depth_stencil: None,
            inputs: &[],
            resolves: &[],
            preserves: &[],
        };

        Ok(unsafe { device.create_render_pass(&[attachment], &[subpass], &[]) }?)
    }

    // One pool per frame slot, so resetting a slot cannot touch the other
    // slot's still-in-flight commands.
    fn create_command_pools(
        device: &B::Device,
        family: QueueFamilyId,
    ) -> Result<Vec<B::CommandPool>, Error> {
        let mut pools = Vec::with_capacity(FRAMES_IN_FLIGHT);
        for _ in 0..FRAMES_IN_FLIGHT {
            pools.push(unsafe {
                device.create_command_pool(family, pool::CommandPoolCreateFlags::empty())
            }?);
        }
        Ok(pools)
    }

    fn allocate_command_buffers(command_pools: &mut [B::CommandPool]) -> Vec<B::CommandBuffer> {
        command_pools
            .iter_mut()
            .map(|pool| unsafe { pool.allocate_one(command::Level::Primary) })
            .collect()
    }

    fn create_semaphores(device: &B::Device) -> Result<Vec<B::Semaphore>, Error> {
        let mut v = Vec::with_capacity(FRAMES_IN_FLIGHT);
        for _ in 0..FRAMES_IN_FLIGHT {
            v.push(device.create_semaphore()?);
        }
        Ok(v)
    }

    fn create_fences(device: &B::Device) -> Result<Vec<B::Fence>, Error> {
        let mut v = Vec::with_capacity(FRAMES_IN_FLIGHT);
        for _ in 0..FRAMES_IN_FLIGHT {
            v.push(device.create_fence(true)?);
        }
        Ok(v)
    }
}

impl<'a, B: Backend> Drop for Renderer<'a, B> {
    fn drop(&mut self) {
        let device = self.device;
        device.wait_idle().unwrap();
        unsafe {
            if let Some(uniforms) = self.uniforms.take() {
                let _ = ManuallyDrop::into_inner(uniforms);
            }
            ManuallyDrop::drop(&mut self.vertices);

            for framebuffer in self.framebuffers.drain(..).flatten() {
                device.destroy_framebuffer(framebuffer);
            }
            for pool in self.command_pools.drain(..) {
                device.destroy_command_pool(pool);
            }
            for s in self.submission_complete_semaphores.drain(..) {
                device.destroy_semaphore(s);
            }
            for f in self.submission_complete_fences.drain(..) {
                device.destroy_fence(f);
            }

            ManuallyDrop::drop(&mut self.pipeline);
            device.destroy_render_pass(ManuallyDrop::into_inner(ptr::read(&self.render_pass)));
            ManuallyDrop::drop(&mut self.swapchain);
        }
    }
}
