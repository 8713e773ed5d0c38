use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{SurfaceAttributesBuilder, WindowSurface};
use glutin_winit::DisplayBuilder;
use glow::HasContext;
use log::{error, info};
use raw_window_handle::HasWindowHandle;
use std::num::NonZeroU32;
use std::path::Path;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use mascot::config::Settings;
use mascot::engine::components::Camera;
use mascot::engine::managers;
use mascot::game::Character;

struct App {
    settings: Settings,
    window: Option<Window>,
    gl_context: Option<glutin::context::PossiblyCurrentContext>,
    gl_surface: Option<glutin::surface::Surface<WindowSurface>>,
    gl: Option<glow::Context>,
    character: Option<Character>,
    camera: Camera,
    cursor: (f32, f32),
    last_frame_time: Option<Instant>,
}

impl App {
    fn new(settings: Settings) -> Self {
        let camera = Camera::new(settings.camera_position, settings.camera_fov_degrees);
        Self {
            settings,
            window: None,
            gl_context: None,
            gl_surface: None,
            gl: None,
            character: None,
            camera,
            cursor: (0.0, 0.0),
            last_frame_time: None,
        }
    }

    fn activate_at_cursor(&mut self) {
        if let Some(character) = &mut self.character {
            let (x, y) = self.cursor;
            character.on_activate(x, y, &self.camera, Instant::now());
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = event_loop
            .create_window(Window::default_attributes().with_title("Mascot"))
            .unwrap();

        let display_builder = DisplayBuilder::new();
        let (_, gl_config) = display_builder
            .build(event_loop, ConfigTemplateBuilder::new(), |mut c| c.next().unwrap())
            .unwrap();

        let display = gl_config.display();
        let ctx_attrs = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(window.window_handle().unwrap().as_raw()));

        let not_current = unsafe { display.create_context(&gl_config, &ctx_attrs).unwrap() };

        let size = window.inner_size();
        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            window.window_handle().unwrap().as_raw(),
            NonZeroU32::new(size.width.max(1)).unwrap(),
            NonZeroU32::new(size.height.max(1)).unwrap(),
        );
        let surface = unsafe { display.create_window_surface(&gl_config, &attrs).unwrap() };
        let ctx = not_current.make_current(&surface).unwrap();

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                display.get_proc_address(&std::ffi::CString::new(s).unwrap()) as *const _
            })
        };

        // A broken model leaves a live window with an empty scene rather
        // than aborting the process.
        match managers::initialize(&gl, &self.settings) {
            Ok(()) => {
                if let Some(asset) = managers::get_character_copy() {
                    let mut character = Character::from_asset(asset, &self.settings);
                    character.set_viewport(size.width as f32, size.height as f32);
                    self.character = Some(character);
                }
            }
            Err(e) => error!("failed to load assets, running without character: {e}"),
        }

        self.camera.set_aspect(size.width as f32, size.height as f32);
        self.last_frame_time = Some(Instant::now());

        unsafe {
            gl.enable(glow::DEPTH_TEST);
        }

        window.request_redraw();

        self.window = Some(window);
        self.gl_context = Some(ctx);
        self.gl_surface = Some(surface);
        self.gl = Some(gl);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(character) = &mut self.character {
                    character.shutdown();
                }
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                let (Some(surface), Some(ctx), Some(gl)) =
                    (&self.gl_surface, &self.gl_context, &self.gl)
                else {
                    return;
                };

                let now = Instant::now();
                let dt = self
                    .last_frame_time
                    .map(|t| (now - t).as_secs_f32())
                    .unwrap_or(0.0);
                self.last_frame_time = Some(now);

                unsafe {
                    gl.clear_color(0.09, 0.09, 0.12, 1.0);
                    gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
                }

                if let Some(character) = &mut self.character {
                    character.update(now, dt);
                    if let Some(shader) = managers::get_skinned_shader() {
                        character.render(gl, shader, &self.camera.view_projection());
                    }
                }

                surface.swap_buffers(ctx).unwrap();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::Resized(size) => {
                if let (Some(surface), Some(ctx)) = (&self.gl_surface, &self.gl_context) {
                    if let (Some(w), Some(h)) =
                        (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                    {
                        surface.resize(ctx, w, h);
                    }
                }
                self.camera.set_aspect(size.width as f32, size.height as f32);
                if let Some(character) = &mut self.character {
                    character.set_viewport(size.width as f32, size.height as f32);
                }
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                if let Some(character) = &mut self.character {
                    character.on_pointer_move(position.x as f32, position.y as f32);
                }
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.activate_at_cursor();
            }

            WindowEvent::Touch(touch) => {
                // A tap both reposes the joints and may start a gesture.
                self.cursor = (touch.location.x as f32, touch.location.y as f32);
                if let Some(character) = &mut self.character {
                    character.on_pointer_move(self.cursor.0, self.cursor.1);
                }
                if touch.phase == TouchPhase::Ended {
                    self.activate_at_cursor();
                }
            }

            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load_or_default(Path::new("mascot.json"));
    info!("mascot viewer {} starting", mascot::VERSION);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings);
    event_loop.run_app(&mut app)?;
    Ok(())
}
