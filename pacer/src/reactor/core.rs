use super::command::Command;
use super::poller::{Poller, PollerWaker};
use super::timer::TimerEntry;

use std::collections::BinaryHeap;
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, SendError, Sender, TryRecvError};
use std::thread;
use std::time::Instant;

/// Cloneable handle used to send commands to the reactor thread.
///
/// Every send also pokes the poller so that a reactor blocked on a long
/// timeout notices the new command immediately.
#[derive(Clone)]
pub(crate) struct ReactorHandle {
    sender: Sender<Command>,
    waker: Arc<PollerWaker>,
}

impl ReactorHandle {
    pub(crate) fn send(&self, command: Command) -> Result<(), SendError<Command>> {
        self.sender.send(command)?;
        self.waker.wake();
        Ok(())
    }
}

/// State owned by the reactor thread.
pub(crate) struct Reactor {
    commands: Receiver<Command>,
    timers: BinaryHeap<TimerEntry>,
    poller: Poller,
}

impl Reactor {
    /// Creates the poller and starts the reactor thread.
    pub(crate) fn start() -> io::Result<ReactorHandle> {
        let poller = Poller::new()?;
        let waker = poller.waker();
        let (sender, commands) = mpsc::channel();

        let reactor = Reactor {
            commands,
            timers: BinaryHeap::new(),
            poller,
        };

        thread::Builder::new()
            .name("pacer-reactor".into())
            .spawn(move || reactor.run())?;

        Ok(ReactorHandle { sender, waker })
    }

    fn run(mut self) {
        loop {
            if !self.drain_commands() {
                break;
            }

            self.fire_expired();

            let now = Instant::now();
            let timeout = self
                .timers
                .peek()
                .map(|entry| entry.deadline.saturating_duration_since(now));

            if let Err(err) = self.poller.wait(timeout) {
                tracing::error!(error = %err, "reactor wait failed; stopping timer thread");
                break;
            }
        }

        tracing::trace!(pending = self.timers.len(), "reactor stopped");
    }

    /// Applies every queued command. Returns `false` once the reactor must stop.
    fn drain_commands(&mut self) -> bool {
        loop {
            match self.commands.try_recv() {
                Ok(Command::SetTimer {
                    deadline,
                    waker,
                    cancelled,
                }) => {
                    self.timers.push(TimerEntry {
                        deadline,
                        waker,
                        cancelled,
                    });
                }
                Ok(Command::Shutdown) | Err(TryRecvError::Disconnected) => return false,
                Err(TryRecvError::Empty) => return true,
            }
        }
    }

    /// Wakes every timer whose deadline has passed and discards cancelled ones.
    fn fire_expired(&mut self) {
        let now = Instant::now();
        let mut fired = 0usize;

        while let Some(entry) = self.timers.peek() {
            if entry.deadline > now && !entry.is_cancelled() {
                break;
            }

            if let Some(entry) = self.timers.pop() {
                if !entry.is_cancelled() {
                    entry.waker.wake();
                    fired += 1;
                }
            }
        }

        if fired > 0 {
            tracing::trace!(fired, pending = self.timers.len(), "timers fired");
        }
    }
}
