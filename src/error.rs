//! Initialization errors.
//!
//! Anything that can fail while bringing up the instance, device, swapchain
//! or pipeline ends up here; the render thread prints the error and exits
//! the process with a non-zero status. Steady-state rendering keeps the
//! panicking style of the underlying calls.

use std::fmt;

use gfx_hal::{buffer, device, pso, window, UnsupportedBackend};

#[derive(Debug)]
pub enum Error {
    /// No usable backend instance could be created.
    Backend(UnsupportedBackend),
    /// Surface creation for the window failed.
    Surface(window::InitError),
    /// The instance reported no adapters at all.
    NoAdapter,
    /// No queue family supports both graphics and the window surface.
    NoGraphicsQueue,
    /// Opening a logical device on the adapter failed.
    DeviceOpen(device::CreationError),
    Buffer(buffer::CreationError),
    Allocation(device::AllocationError),
    Bind(device::BindError),
    Map(device::MapError),
    /// No CPU-visible memory type matches the buffer requirements.
    NoUploadMemory,
    OutOfMemory(device::OutOfMemory),
    DescriptorAllocation(pso::AllocationError),
    Shader(device::ShaderError),
    Pipeline(pso::CreationError),
    SwapchainConfig(window::CreationError),
    Spirv(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Backend(e) => write!(f, "failed to create a backend instance: {:?}", e),
            Error::Surface(e) => write!(f, "failed to create a window surface: {:?}", e),
            Error::NoAdapter => write!(f, "no graphics adapter available"),
            Error::NoGraphicsQueue => {
                write!(f, "no queue family supports graphics on this surface")
            }
            Error::DeviceOpen(e) => write!(f, "failed to open the device: {:?}", e),
            Error::Buffer(e) => write!(f, "failed to create a buffer: {:?}", e),
            Error::Allocation(e) => write!(f, "failed to allocate device memory: {:?}", e),
            Error::Bind(e) => write!(f, "failed to bind buffer memory: {:?}", e),
            Error::Map(e) => write!(f, "failed to map device memory: {:?}", e),
            Error::NoUploadMemory => write!(f, "no CPU-visible memory type for uploads"),
            Error::OutOfMemory(e) => write!(f, "out of memory: {:?}", e),
            Error::DescriptorAllocation(e) => {
                write!(f, "failed to allocate a descriptor set: {:?}", e)
            }
            Error::Shader(e) => write!(f, "failed to create a shader module: {:?}", e),
            Error::Pipeline(e) => write!(f, "failed to create the graphics pipeline: {:?}", e),
            Error::SwapchainConfig(e) => write!(f, "failed to configure the swapchain: {:?}", e),
            Error::Spirv(e) => write!(f, "invalid SPIR-V: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<buffer::CreationError> for Error {
    fn from(e: buffer::CreationError) -> Self {
        Error::Buffer(e)
    }
}

impl From<device::AllocationError> for Error {
    fn from(e: device::AllocationError) -> Self {
        Error::Allocation(e)
    }
}

impl From<device::BindError> for Error {
    fn from(e: device::BindError) -> Self {
        Error::Bind(e)
    }
}

impl From<device::MapError> for Error {
    fn from(e: device::MapError) -> Self {
        Error::Map(e)
    }
}

impl From<device::OutOfMemory> for Error {
    fn from(e: device::OutOfMemory) -> Self {
        Error::OutOfMemory(e)
    }
}

impl From<pso::AllocationError> for Error {
    fn from(e: pso::AllocationError) -> Self {
        Error::DescriptorAllocation(e)
    }
}

impl From<device::ShaderError> for Error {
    fn from(e: device::ShaderError) -> Self {
        Error::Shader(e)
    }
}

impl From<pso::CreationError> for Error {
    fn from(e: pso::CreationError) -> Self {
        Error::Pipeline(e)
    }
}

impl From<window::CreationError> for Error {
    fn from(e: window::CreationError) -> Self {
        Error::SwapchainConfig(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Spirv(e)
    }
}
