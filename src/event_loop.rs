//! Host event handling.
//!
//! The [`EventLoop`] drains one queue carrying both what the host reports (touches, lifecycle
//! changes) and its own lifecycle requests. Touches are only logged. Lifecycle changes are
//! forwarded to the render loop.

use std::{
    fmt,
    sync::mpsc::{self, Receiver, Sender, SyncSender},
};

use crate::error::ControlError;
use crate::render_loop::RenderControl;

/// What the host reports. Coordinates are in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// A finger touched or left the screen.
    Touch { down: bool, x: i32, y: i32 },
    /// A finger moved while touching the screen.
    Move { x: i32, y: i32 },
    /// The application went to the background.
    Paused,
    /// The application came back to the foreground.
    Resumed,
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostEvent::Touch { down: true, x, y } => write!(f, "Finger is DOWN at coord {x} {y}"),
            HostEvent::Touch { down: false, x, y } => {
                write!(f, "Finger is now UP at coord {x} {y}")
            }
            HostEvent::Move { x, y } => write!(f, "Finger is moving at coord {x} {y}"),
            HostEvent::Paused => write!(f, "Application was paused. Stopping rendering ticker."),
            HostEvent::Resumed => {
                write!(f, "Application was resumed. Reactivating rendering ticker.")
            }
        }
    }
}

enum Inbound {
    Host(HostEvent),
    Pause(SyncSender<()>),
    Terminate(SyncSender<()>),
}

/// Sending half of an event loop's queue. Host events are queued, lifecycle requests wait for
/// the loop to acknowledge them.
#[derive(Clone)]
pub struct EventSender {
    inbound: Sender<Inbound>,
}

impl EventSender {
    /// Queues a host event without waiting for it to be handled.
    pub fn send(&self, event: HostEvent) -> Result<(), ControlError> {
        self.inbound
            .send(Inbound::Host(event))
            .map_err(|_| ControlError::Closed("event"))
    }

    pub fn pause(&self) -> Result<(), ControlError> {
        self.request(Inbound::Pause)
    }

    pub fn terminate(&self) -> Result<(), ControlError> {
        self.request(Inbound::Terminate)
    }

    fn request(&self, message: fn(SyncSender<()>) -> Inbound) -> Result<(), ControlError> {
        let (ack, acked) = mpsc::sync_channel(0);
        self.inbound
            .send(message(ack))
            .map_err(|_| ControlError::Closed("event"))?;
        acked.recv().map_err(|_| ControlError::Closed("event"))
    }
}

pub struct EventLoop {
    inbound: Receiver<Inbound>,
    render: RenderControl,
}

impl EventLoop {
    /// Creates an event loop that forwards lifecycle changes to `render`.
    pub fn new(render: RenderControl) -> (Self, EventSender) {
        let (inbound, receiver) = mpsc::channel();
        (
            Self {
                inbound: receiver,
                render,
            },
            EventSender { inbound },
        )
    }

    /// Handles events until terminated or until every sender is gone.
    pub fn run(self) {
        while let Ok(message) = self.inbound.recv() {
            match message {
                Inbound::Host(event) => self.handle(event),
                Inbound::Pause(ack) => {
                    log::debug!("Event loop paused");
                    let _ = ack.send(());
                }
                Inbound::Terminate(ack) => {
                    let _ = ack.send(());
                    break;
                }
            }
        }
        log::info!("Event loop terminated");
    }

    /// Logs the event and forwards lifecycle changes to the render loop, blocking until it has
    /// taken them.
    pub fn handle(&self, event: HostEvent) {
        log::info!("{event}");
        let forwarded = match event {
            HostEvent::Paused => self.render.pause(),
            HostEvent::Resumed => self.render.resume(),
            HostEvent::Touch { .. } | HostEvent::Move { .. } => Ok(()),
        };
        if let Err(err) = forwarded {
            log::warn!("Dropped {event:?}: {err}");
        }
    }
}
