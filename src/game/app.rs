use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::GameConfig;
use crate::engine::audio::Audio;
use crate::engine::graphics::{Canvas, Renderer};
use crate::engine::input::InputHandler;
use crate::engine::window::WindowManager;
use crate::error::{GameError, Result};
use crate::game::state::{Frame, StateMachine};

/// GPU objects that only exist once the window does.
struct Gpu {
    surface: wgpu::Surface<'static>,
    renderer: Renderer,
}

pub struct App {
    config: GameConfig,
    window_manager: WindowManager,
    gpu: Option<Gpu>,
    input_handler: InputHandler,
    canvas: Canvas,
    audio: Audio,
    states: StateMachine,
    last_frame: Option<Instant>,
}

impl App {
    pub fn new(config: GameConfig) -> Self {
        let logical = Vec2::new(config.window.width as f32, config.window.height as f32);

        let audio = Audio::open(&config.audio);

        Self {
            window_manager: WindowManager::new(),
            gpu: None,
            input_handler: InputHandler::new(),
            canvas: Canvas::new(logical),
            audio,
            states: StateMachine::new(config.gameplay.clone(), logical),
            last_frame: None,
            config,
        }
    }

    async fn init_wgpu(&mut self, window: Arc<Window>) -> Result<()> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GameError::NoAdapter)?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let renderer = Renderer::new(
            device,
            queue,
            &surface,
            &adapter,
            size,
            self.canvas.size(),
            self.config.window.vsync,
        )?;
        self.gpu = Some(Gpu { surface, renderer });
        Ok(())
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.window_manager.set_window_size(new_size);
        if let Some(gpu) = &mut self.gpu {
            gpu.renderer.resize(new_size, &gpu.surface);
        }
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let dt = self
            .last_frame
            .replace(now)
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());

        let input = self.input_handler.begin_frame();
        self.canvas.begin_frame();
        let mut frame = Frame {
            input: &input,
            canvas: &mut self.canvas,
            audio: &mut self.audio,
        };
        self.states.update(&mut frame, dt);

        let Some(gpu) = &self.gpu else {
            return;
        };
        match gpu.renderer.render(&gpu.surface, &self.canvas) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                gpu.renderer.reconfigure(&gpu.surface);
            }
            Err(e) => error!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window_manager.get_window().is_some() {
            return;
        }

        let window = match self.window_manager.create_window(event_loop, &self.config.window) {
            Ok(window) => window,
            Err(e) => {
                error!("Failed to create window, exiting: {}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = pollster::block_on(self.init_wgpu(window)) {
            error!("Failed to initialise graphics, exiting: {}", e);
            event_loop.exit();
            return;
        }
        self.window_manager.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.frame();
                self.window_manager.request_redraw();
            }
            WindowEvent::Resized(physical_size) => {
                self.resize(physical_size);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    let pressed = event.state == ElementState::Pressed;
                    if pressed && keycode == KeyCode::Escape && self.config.window.escape_closes {
                        info!("Escape pressed, exiting");
                        event_loop.exit();
                        return;
                    }
                    self.input_handler.handle_keyboard_input_event(keycode, pressed);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input_handler
                    .handle_mouse_button(button, state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let physical = Vec2::new(position.x as f32, position.y as f32);
                let logical = match &self.gpu {
                    Some(gpu) => gpu.renderer.letterbox().to_logical(physical),
                    None => physical,
                };
                self.input_handler.handle_cursor_moved(logical);
            }
            WindowEvent::Focused(focused) => {
                self.input_handler.handle_window_focus(focused);
            }
            _ => (),
        }
    }
}
