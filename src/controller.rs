//! The presentation controller.
//!
//! The controller is the only owner of the slides and of the current index.
//! It runs on its own thread, receiving [`Command`]s from a FIFO channel,
//! and redraws after each of them. Once `Quit` is processed the thread
//! drops the render target and fires a one-shot completion signal, which the
//! platform waits on before tearing the window down.

use std::sync::mpsc::{channel, sync_channel, Receiver, Sender};
use std::thread;

use tracing::{debug, debug_span, error, info, warn};

use crate::command::Command;
use crate::error::{Error, RenderError, Result};
use crate::render::{RenderTarget, Renderer};
use crate::slideshow::{Color, SlideSet, SlideStore};

/// The background every slide is drawn on.
pub const BACKGROUND: Color = Color::WHITE;

/// The sending half of the command channel.
///
/// Unbounded: submitting never blocks and never drops a command.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    tx: Sender<Command>,
}

impl CommandQueue {
    /// Enqueue a command. Fails only once the controller has stopped.
    pub fn submit(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| Error::ControllerStopped)
    }
}

/// Create a command channel.
#[must_use]
pub fn command_queue() -> (CommandQueue, Receiver<Command>) {
    let (tx, rx) = channel();
    (CommandQueue { tx }, rx)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    Running,
    /// `Quit` was processed, the loop is about to return.
    ShuttingDown,
    Stopped,
}

pub struct PresentationController<T, R> {
    store: SlideStore,
    target: T,
    renderer: R,
    fullscreen: bool,
    state: State,
}

impl<T, R> PresentationController<T, R>
where
    T: RenderTarget,
    R: Renderer<T>,
{
    #[must_use]
    pub fn new(slides: SlideSet, target: T, renderer: R) -> Self {
        PresentationController {
            store: SlideStore::new(slides),
            target,
            renderer,
            fullscreen: false,
            state: State::Running,
        }
    }

    /// Tell the controller whether the target starts in fullscreen, so the
    /// first toggle goes the right way.
    #[must_use]
    pub fn fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.store.index()
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Show the first slide.
    pub fn start(&mut self) {
        info!("Presenting {} slides", self.store.slides().len());
        self.redraw();
    }

    /// Apply a single command, and redraw unless it is `Quit`.
    pub fn handle(&mut self, command: Command) {
        if self.state != State::Running {
            warn!("Ignoring {:?}, the presentation is over", command);
            return;
        }
        debug!("Handling {:?} at slide {}", command, self.store.index());
        match command {
            Command::FirstSlide => self.store.first(),
            Command::LastSlide => self.store.last(),
            Command::NextSlide => self.store.next(),
            Command::PrevSlide => self.store.prev(),
            Command::ToggleFullscreen => {
                let wanted = !self.fullscreen;
                match self.target.set_fullscreen(wanted) {
                    Ok(()) => self.fullscreen = wanted,
                    Err(e) => error!("Unable to toggle fullscreen: {}", e),
                }
            }
            Command::Quit => {
                self.state = State::ShuttingDown;
                return;
            }
        }
        self.redraw();
    }

    /// Process commands in order until `Quit`.
    ///
    /// A closed channel (every sender gone) is handled like `Quit`.
    pub fn run(&mut self, commands: &Receiver<Command>) {
        while self.state == State::Running {
            match commands.recv() {
                Ok(command) => self.handle(command),
                Err(_) => {
                    warn!("Every command sender is gone, quitting");
                    self.state = State::ShuttingDown;
                }
            }
        }
        info!("Presentation stopped at slide {}", self.store.index() + 1);
        self.state = State::Stopped;
    }

    /// Draw the current slide. Failures are logged, never propagated: one bad
    /// slide must not end the presentation.
    fn redraw(&mut self) {
        let idx = self.store.index();
        let _span = debug_span!("redraw", index = idx).entered();
        if let Err(e) = self.draw_current() {
            error!("Unable to render slide {}: {}", idx + 1, e);
        }
    }

    fn draw_current(&mut self) -> std::result::Result<(), RenderError> {
        self.target.clear(BACKGROUND)?;
        self.renderer.render(self.store.current(), &mut self.target)?;
        self.target.present()
    }
}

/// Fired once by the controller thread when it is done.
pub struct Completion {
    signal: Receiver<usize>,
    worker: thread::JoinHandle<()>,
}

impl Completion {
    /// Block until the controller has processed `Quit` and released its
    /// render target. Returns the index of the last slide shown.
    pub fn wait(self) -> Result<usize> {
        let last = self.signal.recv();
        if self.worker.join().is_err() {
            error!("The presentation thread panicked");
        }
        last.map_err(|_| Error::ControllerStopped)
    }
}

/// Start a controller on a dedicated thread.
///
/// The first slide is rendered from that thread right away. Commands go in
/// through the returned [`CommandQueue`]; the [`Completion`] fires after
/// `Quit` has been processed.
pub fn spawn<T, R>(
    slides: SlideSet,
    target: T,
    renderer: R,
    fullscreen: bool,
) -> Result<(CommandQueue, Completion)>
where
    T: RenderTarget + Send + 'static,
    R: Renderer<T> + Send + 'static,
{
    let (queue, commands) = command_queue();
    let (done_tx, done_rx) = sync_channel(1);
    let worker = thread::Builder::new()
        .name("presentation".to_owned())
        .spawn(move || {
            let last = {
                let mut controller =
                    PresentationController::new(slides, target, renderer)
                        .fullscreen(fullscreen);
                controller.start();
                controller.run(&commands);
                controller.index()
                // The target is dropped here, before anyone is told we're done.
            };
            if done_tx.send(last).is_err() {
                debug!("Nobody is waiting for the presentation to end");
            }
        })
        .map_err(Error::Spawn)?;

    Ok((
        queue,
        Completion {
            signal: done_rx,
            worker,
        },
    ))
}
