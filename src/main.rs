use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use futures::executor::block_on;
use structopt::StructOpt;
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

mod assets;
mod audio;
mod camera;
mod constants;
mod entities;
mod entity;
mod event_dispatch;
mod font;
mod gamepad;
mod geom;
mod input;
mod level;
mod logging;
mod sprite;
mod state;
mod texture;
mod tween;

// ---------------------------------------------------------------------------------------------------------------------

#[derive(StructOpt, Debug)]
pub struct Options {
    /// Level to start on; wraps around the number of levels
    #[structopt(short, long, default_value = "0")]
    pub level: u32,

    /// Directory holding the level files
    #[structopt(long, parse(from_os_str), default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory holding images and sounds
    #[structopt(long, parse(from_os_str), default_value = "res")]
    pub res_dir: PathBuf,

    /// Disable sound effects
    #[structopt(short, long)]
    pub mute: bool,

    /// Log filter, e.g. "debug" or "hero_platformer=debug,wgpu=warn"
    #[structopt(long)]
    pub log_filter: Option<String>,
}

// ---------------------------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    let opt = Options::from_args();
    logging::init_logging(logging::LoggingConfig {
        env_filter: opt.log_filter.clone(),
        ..Default::default()
    });

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(constants::WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(
                constants::WORLD_WIDTH as f64,
                constants::WORLD_HEIGHT as f64,
            ))
            .build(&event_loop)?,
    );
    let gpu = block_on(state::gpu_state::GpuState::new(window.clone()))?;
    let mut state = state::app_state::AppState::new(gpu, &opt)?;
    let mut last_render_time = std::time::Instant::now();

    event_loop.run(move |event, elwt| match event {
        Event::AboutToWait => {
            // we have to explicitly request a redraw
            window.request_redraw();
        }
        Event::WindowEvent { window_id, event } if window_id == window.id() => {
            if state.input(&event) {
                return;
            }
            match event {
                WindowEvent::RedrawRequested => {
                    let now = std::time::Instant::now();
                    let dt = now - last_render_time;
                    last_render_time = now;
                    state.update(dt);
                    match state.render() {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => state.reconfigure(),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Out of GPU memory");
                            elwt.exit();
                        }
                        Err(e) => log::warn!("{:?}", e),
                    }
                }
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            state: ElementState::Pressed,
                            physical_key: PhysicalKey::Code(KeyCode::Escape),
                            ..
                        },
                    ..
                } => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    state.resize(physical_size);
                }
                _ => {}
            }
        }
        _ => {}
    })?;

    Ok(())
}
