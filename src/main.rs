use std::{process::ExitCode, thread};

use crate::abs::App;
use crate::asset::{AssetService, DirAssets, EmbeddedAssets};
use crate::config::Config;
use crate::event_loop::EventLoop;
use crate::render_loop::RenderLoop;

mod abs;
mod asset;
mod config;
mod error;
mod event_loop;
mod logging;
mod render_loop;
mod renderer;

fn main() -> ExitCode {
    let config = Config::from_env();
    if let Err(err) = logging::init(config.log_level) {
        eprintln!("Failed to set up logging: {err}");
    }

    let mut app = match App::new(
        config::WINDOW_TITLE,
        config::WINDOW_WIDTH,
        config::WINDOW_HEIGHT,
    ) {
        Ok(app) => app,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let assets: Box<dyn AssetService + Send> = match &config.asset_root {
        Some(root) => {
            log::info!("Loading assets from {}", root.display());
            Box::new(DirAssets::new(root))
        }
        None => Box::new(EmbeddedAssets),
    };

    let (render_loop, render_control) =
        RenderLoop::new(app.surface(), assets, config::FRAMES_PER_SECOND);
    let render_thread = match thread::Builder::new()
        .name("render".into())
        .spawn(move || render_loop.run())
    {
        Ok(handle) => handle,
        Err(err) => {
            log::error!("Failed to spawn the render thread: {err}");
            return ExitCode::FAILURE;
        }
    };

    let (event_loop, events) = EventLoop::new(render_control.clone());
    let event_thread = match thread::Builder::new()
        .name("events".into())
        .spawn(move || event_loop.run())
    {
        Ok(handle) => handle,
        Err(err) => {
            log::error!("Failed to spawn the event thread: {err}");
            let _ = render_control.terminate();
            let _ = render_thread.join();
            return ExitCode::FAILURE;
        }
    };

    while !render_thread.is_finished() && app.pump(&events) {}

    // Either side may already be gone, the result of joining tells us what happened.
    let _ = events.terminate();
    let _ = render_control.terminate();
    let _ = event_thread.join();

    // The window and context must outlive the render thread.
    let result = render_thread.join();
    drop(app);

    match result {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(err)) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
        Err(_) => {
            log::error!("The render thread panicked");
            ExitCode::FAILURE
        }
    }
}
