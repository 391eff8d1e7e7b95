//! Window management implementation.

use std::sync::Arc;

use log::{error, info};
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::config::WindowConfig;

pub struct WindowManager {
    pub window: Option<Arc<Window>>,
    pub size: Option<winit::dpi::PhysicalSize<u32>>,
}

impl WindowManager {
    pub fn new() -> Self {
        Self {
            window: None,
            size: None,
        }
    }

    pub fn create_window(
        &mut self,
        event_loop: &ActiveEventLoop,
        config: &WindowConfig,
    ) -> Result<Arc<Window>, winit::error::OsError> {
        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height));

        let window = event_loop.create_window(attributes)
            .map_err(|e| {
                error!("Failed to create window: {:?}", e);
                e
            })?;

        let window = Arc::new(window);
        let size = window.inner_size();
        info!("Window created: {}x{} physical", size.width, size.height);
        self.size = Some(size);
        self.window = Some(window.clone());
        Ok(window)
    }

    pub fn set_window_size(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.size = Some(size);
    }

    pub fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    pub fn get_window(&self) -> Option<&Arc<Window>> {
        self.window.as_ref()
    }

    pub fn get_size(&self) -> Option<winit::dpi::PhysicalSize<u32>> {
        self.size
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new()
    }
}
