use std::sync::mpsc::{self, TryRecvError};
use std::thread;

use crate::app_types::{EngineCommand, EngineUpdate};
use crate::engine::{ApproxParams, Approximation, Approximator, BatchReport};
use crate::error::{Img2LogicError, Result};
use crate::grid::PixelGrid;

/// caller side of a background approximation run
pub struct EngineHandle {
    command_tx: mpsc::Sender<EngineCommand>,
    update_rx: mpsc::Receiver<EngineUpdate>,
    thread: thread::JoinHandle<()>,
}

/// spawn the engine on its own thread. it starts paused; send `Start`.
pub fn spawn_engine(ground_truth: PixelGrid, params: ApproxParams) -> Result<EngineHandle> {
    profiling::scope!("spawn_engine");

    // create communication channels
    let (command_tx, command_rx) = mpsc::channel();
    let (update_tx, update_rx) = mpsc::channel();

    let thread = thread::Builder::new().name("engine".to_owned()).spawn(move || {
        let result = engine_loop(&ground_truth, params, &command_rx, &update_tx);
        match &result {
            Ok(done) => log::info!("engine finished: {} rects in {} batches", done.rects.len(), done.batches),
            Err(e) => log::info!("engine stopped: {e}"),
        }
        let _ = update_tx.send(EngineUpdate::Finished(result));
    })?;

    Ok(EngineHandle {
        command_tx,
        update_rx,
        thread,
    })
}

fn engine_loop(
    ground_truth: &PixelGrid,
    params: ApproxParams,
    command_rx: &mpsc::Receiver<EngineCommand>,
    update_tx: &mpsc::Sender<EngineUpdate>,
) -> Result<Approximation> {
    let mut approx = Approximator::new(ground_truth, params)?;
    let mut running = false;

    loop {
        profiling::scope!("engine_thread_loop");

        // paused: block for the next command; running: poll between batches.
        // a dropped sender counts as Stop
        let cmd = if running {
            match command_rx.try_recv() {
                Ok(cmd) => Some(cmd),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(EngineCommand::Stop),
            }
        } else {
            Some(command_rx.recv().unwrap_or(EngineCommand::Stop))
        };

        match cmd {
            Some(EngineCommand::Start) => running = true,
            Some(EngineCommand::Pause) => running = false,
            Some(EngineCommand::Stop) => {
                return Err(Img2LogicError::Cancelled {
                    accepted: approx.accepted.len(),
                })
            }
            None => {}
        }
        if !running {
            continue;
        }

        match approx.step()? {
            Some(report) => {
                let _ = update_tx.send(EngineUpdate::Progress(report));
            }
            None => break,
        }
    }

    Ok(approx.finish())
}

impl EngineHandle {
    // sends fail only once the thread has finished, which wait() reports
    pub fn start(&self) {
        let _ = self.command_tx.send(EngineCommand::Start);
    }

    pub fn pause(&self) {
        let _ = self.command_tx.send(EngineCommand::Pause);
    }

    pub fn stop(&self) {
        let _ = self.command_tx.send(EngineCommand::Stop);
    }

    /// drain progress updates into `on_progress` until the run ends, then join
    pub fn wait<F>(self, mut on_progress: F) -> Result<Approximation>
    where
        F: FnMut(&BatchReport),
    {
        let outcome = loop {
            match self.update_rx.recv() {
                Ok(EngineUpdate::Progress(report)) => on_progress(&report),
                Ok(EngineUpdate::Finished(result)) => break result,
                Err(_) => {
                    break Err(Img2LogicError::Io(std::io::Error::other(
                        "engine thread exited without a result",
                    )))
                }
            }
        };
        if self.thread.join().is_err() {
            log::warn!("engine thread panicked");
        }
        outcome
    }
}
