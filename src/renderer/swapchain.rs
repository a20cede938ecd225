use gfx_hal::{adapter::Adapter, format as f, prelude::*, pso, window, Backend};

use crate::error::Error;

/// Surface configuration and the viewport that tracks it. `recreate` picks
/// up the surface's current extent, which is how window resizes propagate.
pub struct Swapchain<'a, B: Backend> {
    device: &'a B::Device,
    adapter: &'a Adapter<B>,
    pub surface: &'a mut B::Surface,
    pub viewport: pso::Viewport,
    pub extent: window::Extent2D,
    pub format: f::Format,
}

impl<'a, B: Backend> Swapchain<'a, B> {
    pub fn new(
        device: &'a B::Device,
        surface: &'a mut B::Surface,
        adapter: &'a Adapter<B>,
        initial_extent: window::Extent2D,
    ) -> Result<Self, Error> {
        let formats = surface.supported_formats(&adapter.physical_device);
        let format = formats.map_or(f::Format::Rgba8Srgb, |formats| {
            formats
                .iter()
                .find(|format| format.base_format().1 == f::ChannelType::Srgb)
                .copied()
                .unwrap_or(formats[0])
        });
        log::info!("surface format: {:?}", format);

        let viewport = pso::Viewport {
            rect: pso::Rect {
                x: 0,
                y: 0,
                w: initial_extent.width as _,
                h: initial_extent.height as _,
            },
            depth: 0.0..1.0,
        };

        let mut swapchain = Swapchain {
            device,
            adapter,
            surface,
            viewport,
            extent: initial_extent,
            format,
        };

        swapchain.recreate()?;
        Ok(swapchain)
    }

    pub fn recreate(&mut self) -> Result<(), Error> {
        let caps = self.surface.capabilities(&self.adapter.physical_device);

        // from_caps prefers the surface's current extent; self.extent is
        // only the fallback when the surface does not report one.
        let mut swap_config = window::SwapchainConfig::from_caps(&caps, self.format, self.extent);
        swap_config.present_mode = window::PresentMode::FIFO;
        let extent = swap_config.extent;

        unsafe {
            self.surface.configure_swapchain(self.device, swap_config)?;
        }

        self.extent = extent;
        self.viewport.rect.w = extent.width as _;
        self.viewport.rect.h = extent.height as _;
        log::debug!("swapchain configured at {}x{}", extent.width, extent.height);
        Ok(())
    }
}

impl<'a, B: Backend> Drop for Swapchain<'a, B> {
    fn drop(&mut self) {
        unsafe { self.surface.unconfigure_swapchain(&self.device) }
    }
}
