//! Window creation, the event loop, and the render thread.
//!
//! The winit event loop stays on the main thread; rendering runs on its own
//! thread and the two communicate through a pair of atomic flags. Any error
//! while bringing the graphics stack up is printed and the process exits
//! with a non-zero status.

#[cfg(feature = "metal")]
use gfx_backend_metal as back;

#[cfg(feature = "vulkan")]
use gfx_backend_vulkan as back;

use gfx_hal::{prelude::*, window::Extent2D, Features};

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::demo::Demo;
use crate::error::Error;
use crate::renderer::Renderer;

/// Fixed initial window size.
pub const DIMS: Extent2D = Extent2D {
    width: 800,
    height: 600,
};

/// Opens the window and runs `demo` until the window is closed or Escape
/// is pressed. Only returns by exiting the process.
pub fn run(demo: Demo) -> ! {
    let event_loop = winit::event_loop::EventLoop::new();
    let wb = winit::window::WindowBuilder::new()
        .with_title(demo.title)
        .with_inner_size(winit::dpi::Size::Physical(winit::dpi::PhysicalSize::new(
            DIMS.width,
            DIMS.height,
        )))
        .with_min_inner_size(winit::dpi::Size::Logical(winit::dpi::LogicalSize::new(
            64.0, 64.0,
        )));
    let window = match wb.build(&event_loop) {
        Ok(window) => window,
        Err(err) => {
            eprintln!("failed to create window: {}", err);
            process::exit(1);
        }
    };

    let should_close = Arc::new(AtomicBool::new(false));
    let resized = Arc::new(AtomicBool::new(false));

    let should_close_render = Arc::clone(&should_close);
    let resized_render = Arc::clone(&resized);
    let handle = thread::spawn(move || {
        if let Err(err) = render_loop(&window, demo, &should_close_render, &resized_render) {
            log::error!("initialization failed: {}", err);
            eprintln!("{}", err);
            process::exit(1);
        }
    });
    let mut handle = Some(handle);

    event_loop.run(move |event, _, control_flow| {
        if let winit::event::Event::WindowEvent { event, .. } = event {
            match event {
                winit::event::WindowEvent::CloseRequested
                | winit::event::WindowEvent::KeyboardInput {
                    input:
                        winit::event::KeyboardInput {
                            virtual_keycode: Some(winit::event::VirtualKeyCode::Escape),
                            ..
                        },
                    ..
                } => {
                    should_close.store(true, Ordering::Relaxed);
                    if let Some(handle) = handle.take() {
                        handle.join().unwrap();
                    }
                    log::info!("window closed");
                    *control_flow = winit::event_loop::ControlFlow::Exit;
                }
                winit::event::WindowEvent::Resized(size) => {
                    log::debug!("window resized to {}x{}", size.width, size.height);
                    resized.store(true, Ordering::Relaxed);
                }
                _ => {}
            }
        }
    });
}

fn render_loop(
    window: &winit::window::Window,
    demo: Demo,
    should_close: &AtomicBool,
    resized: &Arc<AtomicBool>,
) -> Result<(), Error> {
    let instance = back::Instance::create(demo.name, 1).map_err(Error::Backend)?;

    let mut adapters = instance.enumerate_adapters();
    if adapters.is_empty() {
        return Err(Error::NoAdapter);
    }
    let mut surface = unsafe { instance.create_surface(window).map_err(Error::Surface)? };
    let adapter = adapters.remove(0);
    log::info!("using adapter: {}", adapter.info.name);

    let family = adapter
        .queue_families
        .iter()
        .find(|family| {
            surface.supports_queue_family(family) && family.queue_type().supports_graphics()
        })
        .ok_or(Error::NoGraphicsQueue)?;
    let mut gpu = unsafe {
        adapter
            .physical_device
            .open(&[(family, &[1.0])], Features::empty())
            .map_err(Error::DeviceOpen)?
    };

    let mut queue_group = gpu.queue_groups.pop().ok_or(Error::NoGraphicsQueue)?;
    let queue = &mut queue_group.queues[0];
    let device = gpu.device;

    {
        let mut renderer = Renderer::new(
            &mut surface,
            &adapter,
            &device,
            queue_group.family,
            DIMS,
            Arc::clone(resized),
            &demo,
        )?;

        #[cfg(debug_assertions)]
        let mut fps_counter = fps_counter::FPSCounter::new();

        while !should_close.load(Ordering::Relaxed) {
            renderer.render(queue);
            #[cfg(debug_assertions)]
            log::trace!("fps: {}", fps_counter.tick());
        }
    }

    unsafe {
        instance.destroy_surface(surface);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_opens_at_800_by_600() {
        assert_eq!(DIMS.width, 800);
        assert_eq!(DIMS.height, 600);
    }
}
