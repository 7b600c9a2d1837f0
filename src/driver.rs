//! Single-consumer command front-end for an engine.
//!
//! The engine itself is synchronous and must not be driven from two places
//! at once. A [`Driver`] owns it and applies commands from a bounded tokio
//! channel one at a time, so any number of [`DriverHandle`] clones can feed
//! it from different tasks. Every command is answered on a oneshot channel.
//!
//! ```rust
//! use statechart::builder::{linear, EngineBuilder};
//! use statechart::driver::Driver;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let catalog = linear("Steps", ["ONE", "TWO"]).build().unwrap();
//! let engine = EngineBuilder::new(catalog).build().unwrap();
//! let (driver, handle) = Driver::new(engine, 16);
//! let task = tokio::spawn(driver.run());
//!
//! handle.next().await.unwrap();
//! assert_eq!(handle.state_tree().await.unwrap(), ["TWO"]);
//! handle.shutdown().await.unwrap();
//! task.await.unwrap();
//! # }
//! ```

use crate::checkpoint::Checkpoint;
use crate::core::{StateRef, Trigger};
use crate::engine::{Dispatch, Engine, EngineError};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Errors seen by a [`DriverHandle`].
#[derive(Debug, Error, PartialEq)]
pub enum DriverError {
    /// The driver stopped before answering.
    #[error("State machine driver is closed")]
    Closed,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

type Responder<T> = oneshot::Sender<T>;

/// Commands accepted by a [`Driver`].
#[derive(Debug)]
pub enum Command {
    Trigger {
        trigger: Trigger,
        resp: Responder<Dispatch>,
    },
    Relocate {
        target: StateRef,
        resp: Responder<Result<(), EngineError>>,
    },
    StateTree {
        resp: Responder<Vec<String>>,
    },
    Checkpoint {
        resp: Responder<Checkpoint>,
    },
    Shutdown {
        resp: Responder<()>,
    },
}

/// Owns an engine and applies commands in arrival order.
pub struct Driver {
    engine: Engine,
    commands: mpsc::Receiver<Command>,
}

impl Driver {
    /// Wrap `engine` behind a channel holding up to `capacity` commands.
    pub fn new(engine: Engine, capacity: usize) -> (Self, DriverHandle) {
        let (sender, commands) = mpsc::channel(capacity.max(1));
        (Self { engine, commands }, DriverHandle { sender })
    }

    /// Process commands until shutdown or until every handle is dropped,
    /// then hand the engine back.
    pub async fn run(mut self) -> Engine {
        info!(state = %self.engine.current_state_ref(), "driver started");
        while let Some(command) = self.commands.recv().await {
            if !self.apply(command) {
                break;
            }
        }
        info!(state = %self.engine.current_state_ref(), "driver stopped");
        self.engine
    }

    /// Returns false once shutdown was requested.
    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Trigger { trigger, resp } => {
                debug!(%trigger, "driver dispatch");
                let _ = resp.send(self.engine.trigger(trigger));
            }
            Command::Relocate { target, resp } => {
                let _ = resp.send(self.engine.relocate(&target));
            }
            Command::StateTree { resp } => {
                let _ = resp.send(self.engine.current_path_names());
            }
            Command::Checkpoint { resp } => {
                let _ = resp.send(self.engine.checkpoint());
            }
            Command::Shutdown { resp } => {
                let _ = resp.send(());
                return false;
            }
        }
        true
    }
}

/// Cloneable sender side of a [`Driver`].
#[derive(Clone, Debug)]
pub struct DriverHandle {
    sender: mpsc::Sender<Command>,
}

impl DriverHandle {
    async fn request<T>(&self, build: impl FnOnce(Responder<T>) -> Command) -> Result<T, DriverError> {
        let (resp, answer) = oneshot::channel();
        self.sender
            .send(build(resp))
            .await
            .map_err(|_| DriverError::Closed)?;
        answer.await.map_err(|_| DriverError::Closed)
    }

    pub async fn trigger(&self, trigger: Trigger) -> Result<Dispatch, DriverError> {
        self.request(|resp| Command::Trigger { trigger, resp }).await
    }

    pub async fn next(&self) -> Result<Dispatch, DriverError> {
        self.trigger(Trigger::Next).await
    }

    pub async fn previous(&self) -> Result<Dispatch, DriverError> {
        self.trigger(Trigger::Previous).await
    }

    pub async fn relocate(&self, target: StateRef) -> Result<(), DriverError> {
        self.request(|resp| Command::Relocate { target, resp })
            .await?
            .map_err(DriverError::from)
    }

    /// Names from the root down to the active leaf.
    pub async fn state_tree(&self) -> Result<Vec<String>, DriverError> {
        self.request(|resp| Command::StateTree { resp }).await
    }

    pub async fn checkpoint(&self) -> Result<Checkpoint, DriverError> {
        self.request(|resp| Command::Checkpoint { resp }).await
    }

    /// Ask the driver to stop after the commands queued before this one.
    pub async fn shutdown(&self) -> Result<(), DriverError> {
        self.request(|resp| Command::Shutdown { resp }).await
    }
}
