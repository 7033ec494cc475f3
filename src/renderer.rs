// Window shell: winit events in, CPU frame out through wgpu

use std::sync::Arc;

use anyhow::Context;
use glam::Vec2;
use kiwi_3d::app::AppContext;
use kiwi_3d::config::ViewerConfig;
use kiwi_3d::input::{InputState, Key, MouseButton};
use kiwi_3d::time::FrameClock;
use wgpu::{Adapter, BindGroup, BindGroupLayout, RenderPipeline, Texture};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

/// Texture format matching the packed 0xAARRGGBB color buffer in memory.
const FRAME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

pub struct Viewer {
    adapter: Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    window: Arc<Window>,
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    frame_texture: Texture,
    frame_bind_group: BindGroup,
    surface_format: wgpu::TextureFormat,
    app: AppContext,
    input: InputState,
    clock: FrameClock,
}

impl Viewer {
    pub async fn new(event_loop: &EventLoop<()>, mut config: ViewerConfig) -> anyhow::Result<Self> {
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(config.title.clone())
                .with_inner_size(PhysicalSize::new(config.width, config.height))
                .build(event_loop)
                .map_err(|err| anyhow::anyhow!("failed to create window: {err}"))?,
        );

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Viewer Device"),
                    required_features: wgpu::Features::default(),
                    required_limits: wgpu::Limits::default(),
                },
                None, // Trace path
            )
            .await
            .context("failed to open GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;

        let size = window.inner_size();
        if size.width > 0 && size.height > 0 {
            config.width = size.width;
            config.height = size.height;
        }
        configure_surface(&surface, &adapter, &device, surface_format, size);

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blit Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let app = AppContext::with_default_scene(config)?;
        let (frame_texture, frame_bind_group) = create_frame_texture(
            &device,
            &bind_group_layout,
            app.drawer.buffers().width(),
            app.drawer.buffers().height(),
        );

        log::info!(
            "viewer ready on {} ({:?})",
            adapter.get_info().name,
            surface_format
        );

        Ok(Self {
            adapter,
            device,
            queue,
            surface,
            window,
            pipeline,
            bind_group_layout,
            frame_texture,
            frame_bind_group,
            surface_format,
            app,
            input: InputState::new(),
            clock: FrameClock::new(),
        })
    }

    pub fn run(mut self, event_loop: EventLoop<()>) -> anyhow::Result<()> {
        event_loop
            .run(move |event, target| {
                target.set_control_flow(ControlFlow::Poll);

                match event {
                    Event::WindowEvent {
                        window_id,
                        event: WindowEvent::CloseRequested,
                    } if window_id == self.window.id() => {
                        target.exit();
                    }
                    Event::WindowEvent {
                        event: WindowEvent::Resized(physical_size),
                        window_id,
                    } if window_id == self.window.id() => {
                        self.resize(physical_size);
                    }
                    Event::AboutToWait => {
                        self.window.request_redraw();
                    }
                    Event::WindowEvent {
                        event: WindowEvent::RedrawRequested,
                        window_id,
                    } if window_id == self.window.id() => {
                        self.update_and_render();
                    }
                    Event::WindowEvent { event, window_id } if window_id == self.window.id() => {
                        self.handle_window_input(event);
                    }
                    _ => {}
                }
            })
            .map_err(|err| anyhow::anyhow!("event loop terminated: {err}"))
    }

    fn handle_window_input(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard_input(event),
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    winit::event::MouseButton::Left => MouseButton::Left,
                    winit::event::MouseButton::Right => MouseButton::Right,
                    _ => return,
                };
                self.input.button(button, state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input
                    .pointer_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::Focused(false) => self.input.clear(),
            // time spent in the background must not reach the physics step
            WindowEvent::Focused(true) | WindowEvent::Occluded(false) => self.clock.reset(),
            _ => {}
        }
    }

    fn handle_keyboard_input(&mut self, event: KeyEvent) {
        let PhysicalKey::Code(keycode) = event.physical_key else {
            return;
        };
        let key = match keycode {
            KeyCode::KeyW => Key::W,
            KeyCode::KeyA => Key::A,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyD => Key::D,
            KeyCode::Space => Key::Space,
            KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
            KeyCode::KeyG => Key::G,
            KeyCode::KeyZ => Key::Z,
            KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
            KeyCode::KeyN => Key::N,
            KeyCode::Digit1 => Key::Digit1,
            KeyCode::Digit2 => Key::Digit2,
            KeyCode::Digit3 => Key::Digit3,
            _ => return,
        };
        self.input.key(key, event.state == ElementState::Pressed);
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        configure_surface(
            &self.surface,
            &self.adapter,
            &self.device,
            self.surface_format,
            new_size,
        );

        if let Err(err) = self.app.resize(new_size.width, new_size.height) {
            log::warn!("keeping old frame buffers: {}", err);
            return;
        }

        let buffers = self.app.drawer.buffers();
        let (texture, bind_group) = create_frame_texture(
            &self.device,
            &self.bind_group_layout,
            buffers.width(),
            buffers.height(),
        );
        self.frame_texture = texture;
        self.frame_bind_group = bind_group;
    }

    fn update_and_render(&mut self) {
        let dt_ms = self.clock.tick();
        let frame_input = self.input.take_frame(dt_ms);
        self.app.do_frame(&frame_input);

        let buffers = self.app.drawer.buffers();
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.frame_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(buffers.color()),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * buffers.width()),
                rows_per_image: Some(buffers.height()),
            },
            wgpu::Extent3d {
                width: buffers.width(),
                height: buffers.height(),
                depth_or_array_layers: 1,
            },
        );

        self.render();
    }

    fn render(&mut self) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                match surface_error_action(&err) {
                    SurfaceErrorAction::Reconfigure => {
                        log::debug!("{}, reconfiguring surface", err);
                        configure_surface(
                            &self.surface,
                            &self.adapter,
                            &self.device,
                            self.surface_format,
                            self.window.inner_size(),
                        );
                    }
                    SurfaceErrorAction::SkipFrame => log::debug!("{}, skipping frame", err),
                    SurfaceErrorAction::Fatal => log::error!("{}, skipping frame", err),
                }
                return;
            }
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Blit Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

/// What `render` does when the next swapchain image is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceErrorAction {
    /// The surface no longer matches the window; reconfigure it and draw next frame.
    Reconfigure,
    SkipFrame,
    Fatal,
}

fn surface_error_action(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigure,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
    }
}

fn configure_surface(
    surface: &wgpu::Surface<'static>,
    adapter: &Adapter,
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    size: PhysicalSize<u32>,
) {
    if size.width == 0 || size.height == 0 {
        return;
    }

    let surface_caps = surface.get_capabilities(adapter);
    surface.configure(
        device,
        &wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        },
    );
}

fn create_frame_texture(
    device: &wgpu::Device,
    layout: &BindGroupLayout,
    width: u32,
    height: u32,
) -> (Texture, BindGroup) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Frame Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FRAME_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Frame Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(&view),
        }],
    });

    (texture, bind_group)
}
