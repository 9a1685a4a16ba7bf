//! SDL2 and OpenGL ES application management.
//!
//! This module defines the [`App`] struct which owns the SDL2 window and GLES 2.0 context, and
//! turns SDL events into [`HostEvent`]s. Rendering happens on another thread through an
//! [`SdlSurface`].

use std::{ffi::CString, ptr};

use sdl2::{event::Event, event::WindowEvent, mouse::MouseButton};

use crate::error::SetupError;
use crate::event_loop::{EventSender, HostEvent};
use crate::render_loop::Surface;

/// SDL reports mouse events synthesized from touches with this device id.
const TOUCH_MOUSE_ID: u32 = u32::MAX;

/// How long [`App::pump`] waits for an event before handing control back.
const PUMP_TIMEOUT_MS: u32 = 100;

/// The [`App`] struct encapsulates the SDL2 window and GL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub event_pump: sdl2::EventPump,
    raw_context: sdl2::sys::SDL_GLContext,
}

impl App {
    /// Creates the window and a GLES 2.0 context, then releases the context so the render thread
    /// can claim it.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, SetupError> {
        let sdl = sdl2::init().map_err(SetupError::Context)?;
        let video_subsystem = sdl.video().map_err(SetupError::Context)?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::GLES);
        gl_attr.set_context_version(2, 0);
        gl_attr.set_double_buffer(true);

        let window = video_subsystem
            .window(title, width, height)
            .opengl()
            .resizable()
            .build()
            .map_err(|e| SetupError::Context(e.to_string()))?;
        let gl_context = window.gl_create_context().map_err(SetupError::Context)?;

        // gl_create_context leaves the new context current on this thread.
        let raw_context = unsafe { sdl2::sys::SDL_GL_GetCurrentContext() };
        if raw_context.is_null() {
            return Err(SetupError::Context(sdl2::get_error()));
        }
        unsafe {
            sdl2::sys::SDL_GL_MakeCurrent(window.raw(), ptr::null_mut());
        }

        let event_pump = sdl.event_pump().map_err(SetupError::Context)?;

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            event_pump,
            raw_context,
        })
    }

    /// A handle the render thread can make current and present with.
    ///
    /// The surface borrows nothing, so the caller has to keep the [`App`] alive until the thread
    /// using the surface has finished.
    pub fn surface(&self) -> SdlSurface {
        SdlSurface {
            window: self.window.raw(),
            context: self.raw_context,
            size: self.window.drawable_size(),
        }
    }

    /// Waits briefly for SDL events and forwards the ones the demo understands. Returns `false`
    /// once the application should quit.
    pub fn pump(&mut self, events: &EventSender) -> bool {
        let size = self.window.size();
        let Some(first) = self.event_pump.wait_event_timeout(PUMP_TIMEOUT_MS) else {
            return true;
        };

        for event in std::iter::once(first).chain(self.event_pump.poll_iter()) {
            match event {
                Event::Quit { .. } | Event::AppTerminating { .. } => return false,
                event => {
                    if let Some(host_event) = translate(&event, size)
                        && events.send(host_event).is_err()
                    {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// Maps an SDL event onto the events the demo reacts to. Anything else is dropped.
fn translate(event: &Event, (width, height): (u32, u32)) -> Option<HostEvent> {
    let to_pixels = |x: f32, y: f32| ((x * width as f32) as i32, (y * height as f32) as i32);

    match *event {
        Event::FingerDown { x, y, .. } => {
            let (x, y) = to_pixels(x, y);
            Some(HostEvent::Touch { down: true, x, y })
        }
        Event::FingerUp { x, y, .. } => {
            let (x, y) = to_pixels(x, y);
            Some(HostEvent::Touch { down: false, x, y })
        }
        Event::FingerMotion { x, y, .. } => {
            let (x, y) = to_pixels(x, y);
            Some(HostEvent::Move { x, y })
        }
        Event::MouseButtonDown {
            which,
            mouse_btn: MouseButton::Left,
            x,
            y,
            ..
        } if which != TOUCH_MOUSE_ID => Some(HostEvent::Touch { down: true, x, y }),
        Event::MouseButtonUp {
            which,
            mouse_btn: MouseButton::Left,
            x,
            y,
            ..
        } if which != TOUCH_MOUSE_ID => Some(HostEvent::Touch { down: false, x, y }),
        Event::MouseMotion {
            which,
            ref mousestate,
            x,
            y,
            ..
        } if which != TOUCH_MOUSE_ID && mousestate.left() => Some(HostEvent::Move { x, y }),
        Event::AppWillEnterBackground { .. }
        | Event::Window {
            win_event: WindowEvent::Minimized,
            ..
        } => Some(HostEvent::Paused),
        Event::AppDidEnterForeground { .. }
        | Event::Window {
            win_event: WindowEvent::Restored,
            ..
        } => Some(HostEvent::Resumed),
        _ => None,
    }
}

/// Raw window and context handles for the render thread.
pub struct SdlSurface {
    window: *mut sdl2::sys::SDL_Window,
    context: sdl2::sys::SDL_GLContext,
    size: (u32, u32),
}

// SAFETY: the handles are only used by the one thread that owns the surface, and the App they
// come from outlives that thread.
unsafe impl Send for SdlSurface {}

impl Surface for SdlSurface {
    type Driver = glow::Context;

    fn make_current(&mut self) -> Result<glow::Context, SetupError> {
        unsafe {
            if sdl2::sys::SDL_GL_MakeCurrent(self.window, self.context) != 0 {
                return Err(SetupError::Context(sdl2::get_error()));
            }
            Ok(glow::Context::from_loader_function(|name| {
                CString::new(name)
                    .map(|name| sdl2::sys::SDL_GL_GetProcAddress(name.as_ptr()) as *const _)
                    .unwrap_or(ptr::null())
            }))
        }
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn swap_buffers(&mut self) {
        unsafe { sdl2::sys::SDL_GL_SwapWindow(self.window) }
    }
}
