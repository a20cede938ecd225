//! Per-frame uniforms for the animated demo.
//!
//! A single std140 uniform block at `set = 0, binding = 0`, backed by a
//! CPU-visible buffer rewritten every frame, with the descriptor set layout
//! the pipeline needs to see it from the fragment stage.

use gfx_hal::{adapter::MemoryType, buffer as b, prelude::*, pso, Backend, Limits};
use std::f32::consts::TAU;
use std::iter;
use std::mem::ManuallyDrop;
use std::ptr;

use super::buffer::Buffer;
use super::memory::Memory;
use crate::error::Error;

/// Contents of the uniform block. Field order matches the std140 layout in
/// the fragment shader: vec2 at offset 0, two floats at 8 and 12.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub pulse: f32,
}

pub const BEATS_PER_MINUTE: f32 = 72.0;

/// Heartbeat scale factor, oscillating around 1.0.
pub fn pulse(time: f32) -> f32 {
    let phase = time * (BEATS_PER_MINUTE / 60.0) * TAU;
    1.0 + 0.06 * phase.sin()
}

pub struct Uniforms<'a, B: Backend> {
    device: &'a B::Device,
    pub layout: ManuallyDrop<B::DescriptorSetLayout>,
    pool: ManuallyDrop<B::DescriptorPool>,
    pub set: B::DescriptorSet,
    memory: Memory<'a, B, FrameUniforms>,
}

impl<'a, B: Backend> Uniforms<'a, B> {
    pub fn new(
        device: &'a B::Device,
        memory_types: &[MemoryType],
        limits: &Limits,
    ) -> Result<Self, Error> {
        let buffer = Buffer::new(device, 1, b::Usage::UNIFORM, limits)?;
        let memory = Memory::new(buffer, memory_types)?;

        let layout = ManuallyDrop::new(unsafe {
            device.create_descriptor_set_layout(
                &[pso::DescriptorSetLayoutBinding {
                    binding: 0,
                    ty: pso::DescriptorType::Buffer {
                        ty: pso::BufferDescriptorType::Uniform,
                        format: pso::BufferDescriptorFormat::Structured {
                            dynamic_offset: false,
                        },
                    },
                    count: 1,
                    stage_flags: pso::ShaderStageFlags::FRAGMENT,
                    immutable_samplers: false,
                }],
                &[],
            )
        }?);

        let mut pool = ManuallyDrop::new(unsafe {
            device.create_descriptor_pool(
                1,
                &[pso::DescriptorRangeDesc {
                    ty: pso::DescriptorType::Buffer {
                        ty: pso::BufferDescriptorType::Uniform,
                        format: pso::BufferDescriptorFormat::Structured {
                            dynamic_offset: false,
                        },
                    },
                    count: 1,
                }],
                pso::DescriptorPoolCreateFlags::empty(),
            )
        }?);

        let set = unsafe { pool.allocate_set(&layout) }?;

        unsafe {
            device.write_descriptor_sets(iter::once(pso::DescriptorSetWrite {
                set: &set,
                binding: 0,
                array_offset: 0,
                descriptors: iter::once(pso::Descriptor::Buffer(
                    &*memory.buffer.buf,
                    b::SubRange::WHOLE,
                )),
            }));
        }

        Ok(Uniforms {
            device,
            layout,
            pool,
            set,
            memory,
        })
    }

    pub fn update(&mut self, uniforms: FrameUniforms) -> Result<(), Error> {
        self.memory.write(&[uniforms])
    }
}

impl<'a, B: Backend> Drop for Uniforms<'a, B> {
    fn drop(&mut self) {
        unsafe {
            self.device
                .destroy_descriptor_set_layout(ManuallyDrop::into_inner(ptr::read(&self.layout)));
            self.device
                .destroy_descriptor_pool(ManuallyDrop::into_inner(ptr::read(&self.pool)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn uniform_block_matches_std140_layout() {
        assert_eq!(mem::size_of::<FrameUniforms>(), 16);

        let u = FrameUniforms {
            resolution: [800.0, 600.0],
            time: 0.0,
            pulse: 1.0,
        };
        let base = &u as *const FrameUniforms as usize;
        assert_eq!(&u.resolution as *const _ as usize - base, 0);
        assert_eq!(&u.time as *const _ as usize - base, 8);
        assert_eq!(&u.pulse as *const _ as usize - base, 12);
    }

    #[test]
    fn pulse_starts_at_rest() {
        assert_eq!(pulse(0.0), 1.0);
    }

    #[test]
    fn pulse_stays_near_unity() {
        for i in 0..1000 {
            let t = i as f32 * 0.017;
            let p = pulse(t);
            assert!(p > 0.9 && p < 1.1, "pulse({}) = {}", t, p);
        }
    }

    #[test]
    fn pulse_repeats_once_per_beat() {
        let beat = 60.0 / BEATS_PER_MINUTE;
        for i in 0..10 {
            let t = i as f32 * 0.37;
            assert!((pulse(t) - pulse(t + beat)).abs() < 1e-3);
        }
    }
}
