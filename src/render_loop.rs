//! The fixed-rate render loop.
//!
//! A [`RenderLoop`] owns the rendering context for its whole life. It is driven by a single
//! rendezvous queue of [`Command`]s and a frame timer, and moves between the states of
//! [`LoopState`]:
//!
//! ```text
//! Running --pause--> Paused --resume--> Running
//!    \                 /
//!     +--terminate----+---> Terminated
//! ```
//!
//! While running, a frame is drawn and presented every tick. Pausing stops the timer. Resuming
//! starts it again with a fresh phase, the first frame after a resume lands one period later.

use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender},
    time::{Duration, Instant},
};

use crate::abs::driver::Driver;
use crate::abs::texture::RgbaImage;
use crate::asset::AssetService;
use crate::config::GOPHER_PNG;
use crate::error::{ControlError, SetupError};
use crate::renderer::{Renderer, ShaderSources};

/// The drawing surface and rendering context handed over by the host.
pub trait Surface {
    type Driver: Driver;

    /// Binds the context to the calling thread and loads the GL entry points. Every later GL
    /// call must come from this same thread.
    fn make_current(&mut self) -> Result<Self::Driver, SetupError>;

    /// Size of the drawable area in pixels.
    fn size(&self) -> (u32, u32);

    /// Presents the back buffer.
    fn swap_buffers(&mut self);
}

type Ack = SyncSender<()>;

/// Requests understood by the render loop. Pause and terminate are acknowledged once handled.
#[derive(Debug)]
pub enum Command {
    Pause(Ack),
    Resume,
    Terminate(Ack),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Paused,
    Terminated,
}

impl LoopState {
    /// The state after handling `command`. Terminated is final.
    pub fn on(self, command: &Command) -> LoopState {
        match (self, command) {
            (LoopState::Terminated, _) | (_, Command::Terminate(_)) => LoopState::Terminated,
            (_, Command::Pause(_)) => LoopState::Paused,
            (_, Command::Resume) => LoopState::Running,
        }
    }
}

/// Sending half of a render loop's queue. Every call blocks until the loop takes the command.
#[derive(Debug, Clone)]
pub struct RenderControl {
    commands: SyncSender<Command>,
}

impl RenderControl {
    /// Stops the frame timer. Returns once the loop has acknowledged.
    pub fn pause(&self) -> Result<(), ControlError> {
        self.request(Command::Pause)
    }

    /// Restarts the frame timer if the loop is paused.
    pub fn resume(&self) -> Result<(), ControlError> {
        self.commands
            .send(Command::Resume)
            .map_err(|_| ControlError::Closed("render"))
    }

    /// Stops the loop for good. Returns once the loop has acknowledged.
    pub fn terminate(&self) -> Result<(), ControlError> {
        self.request(Command::Terminate)
    }

    fn request(&self, command: fn(Ack) -> Command) -> Result<(), ControlError> {
        let (ack, acked) = mpsc::sync_channel(0);
        self.commands
            .send(command(ack))
            .map_err(|_| ControlError::Closed("render"))?;
        acked.recv().map_err(|_| ControlError::Closed("render"))
    }
}

/// Creates a bare control handle and the queue it feeds.
pub(crate) fn channel() -> (RenderControl, Receiver<Command>) {
    let (commands, receiver) = mpsc::sync_channel(0);
    (RenderControl { commands }, receiver)
}

pub struct RenderLoop<S: Surface> {
    commands: Receiver<Command>,
    period: Duration,
    surface: S,
    assets: Box<dyn AssetService + Send>,
    state: LoopState,
}

impl<S: Surface> RenderLoop<S> {
    /// Creates a loop that renders `fps` frames per second once running.
    pub fn new(
        surface: S,
        assets: Box<dyn AssetService + Send>,
        fps: u32,
    ) -> (Self, RenderControl) {
        let (control, commands) = channel();
        let render_loop = Self {
            commands,
            period: Duration::from_secs(1) / fps.max(1),
            surface,
            assets,
            state: LoopState::Running,
        };
        (render_loop, control)
    }

    /// Runs the loop on the calling thread until it is terminated or every control handle is
    /// gone. Fails before the first frame if the context or any GPU resource can't be set up.
    pub fn run(mut self) -> Result<(), SetupError> {
        let gl = self.surface.make_current()?;
        let renderer = self.init_gl(&gl)?;

        log::info!("Render loop started, one frame every {:?}", self.period);
        let mut next_tick = Instant::now() + self.period;

        loop {
            let command = match self.state {
                LoopState::Running => {
                    let now = Instant::now();
                    if now >= next_tick {
                        renderer.draw(&gl);
                        self.surface.swap_buffers();
                        // Late ticks are dropped rather than replayed.
                        next_tick += self.period;
                        if next_tick <= now {
                            next_tick = now + self.period;
                        }
                        continue;
                    }
                    match self.commands.recv_timeout(next_tick - now) {
                        Ok(command) => command,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                LoopState::Paused => match self.commands.recv() {
                    Ok(command) => command,
                    Err(_) => break,
                },
                LoopState::Terminated => break,
            };

            let previous = self.state;
            self.state = previous.on(&command);
            match command {
                Command::Pause(ack) => {
                    log::info!("Render loop paused");
                    let _ = ack.send(());
                }
                Command::Resume => {
                    if previous == LoopState::Paused {
                        log::info!("Render loop resumed");
                        next_tick = Instant::now() + self.period;
                    }
                }
                Command::Terminate(ack) => {
                    let _ = ack.send(());
                }
            }
        }

        log::info!("Render loop terminated");
        Ok(())
    }

    fn init_gl(&self, gl: &S::Driver) -> Result<Renderer<S::Driver>, SetupError> {
        let bytes = self
            .assets
            .load(GOPHER_PNG)
            .recv()
            .map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "asset service dropped the request",
                )
            })
            .and_then(|result| result)
            .map_err(|source| SetupError::Asset {
                path: GOPHER_PNG.to_string(),
                source,
            })?;
        let image = RgbaImage::decode(&bytes)?;

        Renderer::setup(gl, self.surface.size(), ShaderSources::default(), &image)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        thread::{self, JoinHandle},
    };

    use super::*;
    use crate::abs::driver::mock::{Call, CallLog, MockGl};
    use crate::abs::texture::encode_png;
    use crate::asset::memory::MemoryAssets;

    #[derive(Default)]
    struct MockSurface {
        calls: CallLog,
        swaps: Arc<AtomicUsize>,
        context_error: Option<String>,
        compile_failure: Option<(u32, String)>,
    }

    impl Surface for MockSurface {
        type Driver = MockGl;

        fn make_current(&mut self) -> Result<MockGl, SetupError> {
            if let Some(error) = self.context_error.take() {
                return Err(SetupError::Context(error));
            }
            let mut gl = MockGl::new(Arc::clone(&self.calls));
            gl.compile_failure = self.compile_failure.take();
            Ok(gl)
        }

        fn size(&self) -> (u32, u32) {
            (64, 32)
        }

        fn swap_buffers(&mut self) {
            self.swaps.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        control: RenderControl,
        calls: CallLog,
        swaps: Arc<AtomicUsize>,
        thread: JoinHandle<Result<(), SetupError>>,
    }

    impl Harness {
        fn spawn(surface: MockSurface) -> Self {
            Self::spawn_with(surface, gopher_assets())
        }

        fn spawn_with(surface: MockSurface, assets: MemoryAssets) -> Self {
            let calls = Arc::clone(&surface.calls);
            let swaps = Arc::clone(&surface.swaps);
            let (render_loop, control) = RenderLoop::new(surface, Box::new(assets), 200);
            let thread = thread::spawn(move || render_loop.run());
            Self {
                control,
                calls,
                swaps,
                thread,
            }
        }

        fn swaps(&self) -> usize {
            self.swaps.load(Ordering::SeqCst)
        }

        fn draws(&self) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| matches!(c, Call::DrawArrays { .. }))
                .count()
        }
    }

    fn gopher_assets() -> MemoryAssets {
        let mut assets = MemoryAssets::default();
        assets
            .0
            .insert(GOPHER_PNG.to_string(), encode_png(1, 1, &[0, 0, 255, 255]));
        assets
    }

    fn wait_for(condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        condition()
    }

    #[test]
    fn test_state_transitions() {
        let (ack, _acked) = mpsc::sync_channel(1);
        let pause = Command::Pause(ack.clone());
        let terminate = Command::Terminate(ack);

        assert_eq!(LoopState::Running.on(&pause), LoopState::Paused);
        assert_eq!(LoopState::Paused.on(&pause), LoopState::Paused);
        assert_eq!(LoopState::Paused.on(&Command::Resume), LoopState::Running);
        assert_eq!(LoopState::Running.on(&Command::Resume), LoopState::Running);
        for state in [LoopState::Running, LoopState::Paused, LoopState::Terminated] {
            assert_eq!(state.on(&terminate), LoopState::Terminated);
        }
        assert_eq!(LoopState::Terminated.on(&Command::Resume), LoopState::Terminated);
        assert_eq!(LoopState::Terminated.on(&pause), LoopState::Terminated);
    }

    #[test]
    fn test_draws_and_presents_every_tick() {
        let harness = Harness::spawn(MockSurface::default());
        assert!(wait_for(|| harness.swaps() >= 3));

        harness.control.terminate().unwrap();
        let Harness {
            calls,
            swaps,
            thread,
            ..
        } = harness;
        thread.join().unwrap().unwrap();

        let draws = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::DrawArrays { .. }))
            .count();
        assert_eq!(draws, swaps.load(Ordering::SeqCst));
        assert!(calls.lock().unwrap().contains(&Call::Viewport(0, 0, 64, 32)));
    }

    #[test]
    fn test_terminate_from_running() {
        let harness = Harness::spawn(MockSurface::default());
        assert!(wait_for(|| harness.swaps() >= 1));

        harness.control.terminate().unwrap();
        let frames = harness.swaps();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(harness.swaps(), frames);
        assert_eq!(harness.draws(), frames);

        let Harness {
            control, thread, ..
        } = harness;
        thread.join().unwrap().unwrap();
        assert_eq!(control.pause(), Err(ControlError::Closed("render")));
    }

    #[test]
    fn test_terminate_from_paused() {
        let harness = Harness::spawn(MockSurface::default());
        harness.control.pause().unwrap();
        let frames = harness.swaps();

        harness.control.terminate().unwrap();
        let Harness {
            control,
            swaps,
            thread,
            ..
        } = harness;
        thread.join().unwrap().unwrap();
        assert_eq!(swaps.load(Ordering::SeqCst), frames);
        assert_eq!(control.resume(), Err(ControlError::Closed("render")));
    }

    #[test]
    fn test_pause_stops_ticks_until_resume() {
        let harness = Harness::spawn(MockSurface::default());
        assert!(wait_for(|| harness.swaps() >= 1));

        harness.control.pause().unwrap();
        let frames = harness.swaps();
        thread::sleep(Duration::from_millis(60));
        assert_eq!(harness.swaps(), frames);

        // A second pause is acknowledged the same way.
        harness.control.pause().unwrap();
        assert_eq!(harness.swaps(), frames);

        harness.control.resume().unwrap();
        assert!(wait_for(|| harness.swaps() > frames));

        harness.control.terminate().unwrap();
        harness.thread.join().unwrap().unwrap();
    }

    #[test]
    fn test_resume_while_running_keeps_ticking() {
        let harness = Harness::spawn(MockSurface::default());
        harness.control.resume().unwrap();
        assert!(wait_for(|| harness.swaps() >= 2));

        harness.control.terminate().unwrap();
        harness.thread.join().unwrap().unwrap();
    }

    #[test]
    fn test_dropping_every_control_stops_the_loop() {
        let Harness { control, thread, .. } = Harness::spawn(MockSurface::default());
        drop(control);
        thread.join().unwrap().unwrap();
    }

    #[test]
    fn test_shader_error_is_fatal_before_first_frame() {
        let harness = Harness::spawn(MockSurface {
            compile_failure: Some((
                glow::FRAGMENT_SHADER,
                "0:6(2): error: syntax error, unexpected '}'".to_string(),
            )),
            ..MockSurface::default()
        });
        let Harness {
            control,
            calls,
            swaps,
            thread,
        } = harness;

        let err = thread.join().unwrap().unwrap_err();
        assert!(err.to_string().contains("syntax error, unexpected '}'"));
        assert!(matches!(err, SetupError::ShaderCompile { stage: "fragment", .. }));

        assert_eq!(swaps.load(Ordering::SeqCst), 0);
        assert!(
            !calls
                .lock()
                .unwrap()
                .iter()
                .any(|c| matches!(c, Call::DrawArrays { .. }))
        );
        assert_eq!(control.pause(), Err(ControlError::Closed("render")));
    }

    #[test]
    fn test_context_error_is_fatal() {
        let Harness { calls, thread, .. } = Harness::spawn(MockSurface {
            context_error: Some("EGL_BAD_SURFACE".to_string()),
            ..MockSurface::default()
        });
        let err = thread.join().unwrap().unwrap_err();
        assert!(matches!(&err, SetupError::Context(msg) if msg == "EGL_BAD_SURFACE"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_asset_is_fatal() {
        let Harness { swaps, thread, .. } =
            Harness::spawn_with(MockSurface::default(), MemoryAssets::default());
        let err = thread.join().unwrap().unwrap_err();
        assert!(matches!(&err, SetupError::Asset { path, .. } if path == GOPHER_PNG));
        assert_eq!(swaps.load(Ordering::SeqCst), 0);
    }
}
