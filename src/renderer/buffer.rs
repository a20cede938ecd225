use gfx_hal::{buffer, prelude::*, Backend, Limits};
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ptr;

use crate::error::Error;

/// An unbound device buffer sized for `count` elements of `T`, padded up to
/// the non-coherent atom size so whole-range flushes stay legal.
pub struct Buffer<'a, B: Backend, T> {
    pub device: &'a B::Device,
    pub buf: ManuallyDrop<B::Buffer>,
    pub len: u64,
    marker: PhantomData<T>,
}

impl<'a, B: Backend, T> Buffer<'a, B, T> {
    pub fn new(
        device: &'a B::Device,
        count: usize,
        usage: buffer::Usage,
        limits: &Limits,
    ) -> Result<Self, Error> {
        let non_coherent_alignment = limits.non_coherent_atom_size as u64;

        let stride = mem::size_of::<T>() as u64;
        let len = count as u64 * stride;
        assert_ne!(len, 0);
        let padded_size = ((len + non_coherent_alignment - 1) / non_coherent_alignment)
            * non_coherent_alignment;

        let buf = unsafe { device.create_buffer(padded_size, usage) }?;

        Ok(Buffer {
            device,
            buf: ManuallyDrop::new(buf),
            len,
            marker: PhantomData,
        })
    }
}

impl<'a, B: Backend, T> Drop for Buffer<'a, B, T> {
    fn drop(&mut self) {
        unsafe {
            self.device
                .destroy_buffer(ManuallyDrop::into_inner(ptr::read(&self.buf)))
        }
    }
}
