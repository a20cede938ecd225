use gfx_hal::{adapter::MemoryType, memory as m, prelude::*, Backend, MemoryTypeId};
use std::iter;
use std::mem::{self, ManuallyDrop};
use std::ptr;

use super::buffer::Buffer;
use crate::error::Error;

/// CPU-visible memory bound to a [`Buffer`]. The same type backs the
/// one-shot vertex upload and the per-frame uniform writes.
pub struct Memory<'a, B: Backend, T> {
    pub buffer: ManuallyDrop<Buffer<'a, B, T>>,
    memory: ManuallyDrop<B::Memory>,
}

impl<'a, B: Backend, T> Memory<'a, B, T> {
    pub fn new(mut buffer: Buffer<'a, B, T>, memory_types: &[MemoryType]) -> Result<Self, Error> {
        let device = buffer.device;
        let memory = unsafe {
            let requirements = device.get_buffer_requirements(&buffer.buf);
            let upload_type = Self::upload_type(memory_types, &requirements)?;
            let memory = device.allocate_memory(upload_type, requirements.size)?;
            device.bind_buffer_memory(&memory, 0, &mut buffer.buf)?;
            memory
        };

        Ok(Memory {
            buffer: ManuallyDrop::new(buffer),
            memory: ManuallyDrop::new(memory),
        })
    }

    /// Maps, copies and flushes `data` into the buffer.
    pub fn write(&mut self, data: &[T]) -> Result<(), Error> {
        let device = self.buffer.device;
        let len = data.len() as u64 * mem::size_of::<T>() as u64;
        debug_assert!(len <= self.buffer.len);

        unsafe {
            let mapping = device.map_memory(&self.memory, m::Segment::ALL)?;
            ptr::copy_nonoverlapping(data.as_ptr() as *const u8, mapping, len as usize);
            device.flush_mapped_memory_ranges(iter::once((&*self.memory, m::Segment::ALL)))?;
            device.unmap_memory(&self.memory);
        }

        Ok(())
    }

    fn upload_type(
        memory_types: &[MemoryType],
        requirements: &m::Requirements,
    ) -> Result<MemoryTypeId, Error> {
        memory_types
            .iter()
            .enumerate()
            .position(|(id, mem_type)| {
                requirements.type_mask & (1 << id) != 0
                    && mem_type.properties.contains(m::Properties::CPU_VISIBLE)
            })
            .map(Into::into)
            .ok_or(Error::NoUploadMemory)
    }
}

impl<'a, B: Backend, T> Drop for Memory<'a, B, T> {
    fn drop(&mut self) {
        let device = self.buffer.device;
        unsafe {
            ManuallyDrop::drop(&mut self.buffer);
            device.free_memory(ManuallyDrop::into_inner(ptr::read(&self.memory)));
        }
    }
}
