//! Background update worker.
//!
//! Containers are single-threaded by contract: one logical caller drives
//! `start`, `update`, and `stop` for a container's whole lifetime. The
//! [`UpdateWorker`] makes the background flavour of that contract explicit: it
//! takes ownership of one container and its store, moves them onto a dedicated
//! thread, and that thread becomes the sole caller. The owner communicates
//! through a command channel — one [`UpdateWorker::tick`] per desired update
//! iteration.

use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

use anyhow::anyhow;
use tracing::{debug, error, info};
use uuid::Uuid;

use simview_store::EntityStore;
use simview_view::{ViewContainer, ViewError, ViewHandler};

/// Commands accepted by the worker thread.
enum WorkerCommand {
    /// Run one `update` iteration.
    Tick,
    /// Stop the container and return it to the owner.
    Shutdown,
}

/// Handle to a worker thread that exclusively owns one container and store.
///
/// Dropping the handle without calling [`UpdateWorker::shutdown`] also shuts
/// the worker down (the command channel disconnects), but discards the
/// container and store.
pub struct UpdateWorker<H: ViewHandler, S> {
    sender: Sender<WorkerCommand>,
    handle: JoinHandle<Result<(ViewContainer<H>, S), ViewError>>,
    instance_id: String,
}

impl<H, S> UpdateWorker<H, S>
where
    H: ViewHandler + Send + 'static,
    H::View: Send,
    S: EntityStore + Send + 'static,
{
    /// Start the worker. The thread calls `start` on the container first, then
    /// waits for commands.
    ///
    /// A failed `start` is reported when [`UpdateWorker::shutdown`] joins the
    /// thread. A failed `update` is logged and the loop continues — whether a
    /// bad iteration is fatal is the owner's decision to take at shutdown.
    #[must_use]
    pub fn spawn(mut container: ViewContainer<H>, mut store: S) -> Self {
        let instance_id = Uuid::new_v4().to_string();
        let (sender, receiver) = mpsc::channel();

        let id = instance_id.clone();
        let handle = std::thread::spawn(move || {
            info!(instance_id = %id, "update worker starting");
            container.start(&mut store)?;

            let mut iterations: u64 = 0;
            while let Ok(command) = receiver.recv() {
                match command {
                    WorkerCommand::Tick => {
                        iterations += 1;
                        match container.update(&mut store) {
                            Ok(changed) => {
                                debug!(instance_id = %id, iterations, changed, "worker iteration");
                            }
                            Err(err) => {
                                error!(instance_id = %id, iterations, %err, "worker iteration failed");
                            }
                        }
                    }
                    WorkerCommand::Shutdown => break,
                }
            }

            container.stop(&mut store)?;
            info!(instance_id = %id, iterations, "update worker stopped");
            Ok((container, store))
        });

        Self {
            sender,
            handle,
            instance_id,
        }
    }

    /// The unique instance ID of this worker.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Request one update iteration. Returns `false` if the worker has already
    /// exited.
    pub fn tick(&self) -> bool {
        self.sender.send(WorkerCommand::Tick).is_ok()
    }

    /// Stop the container, join the thread, and hand the container and store
    /// back for inspection.
    pub fn shutdown(self) -> anyhow::Result<(ViewContainer<H>, S)> {
        let _ = self.sender.send(WorkerCommand::Shutdown);
        match self.handle.join() {
            Ok(result) => Ok(result?),
            Err(_) => Err(anyhow!("update worker thread panicked")),
        }
    }
}

#[cfg(test)]
mod tests {
    use simview_entity::{Component, Entity, EntityRecord, SubscriptionDescriptor};
    use simview_store::MemoryStore;

    use super::*;

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    struct Marker {
        level: i64,
    }

    impl Component for Marker {
        fn type_name() -> &'static str {
            "Marker"
        }
    }

    #[derive(Default)]
    struct CountingHandler {
        created: u64,
        destroyed: u64,
    }

    impl ViewHandler for CountingHandler {
        type View = Entity;

        fn create_view(&mut self, record: &EntityRecord) -> anyhow::Result<Entity> {
            self.created += 1;
            Ok(record.entity())
        }

        fn destroy_view(&mut self, _view: Entity, _entity: Entity) -> anyhow::Result<()> {
            self.destroyed += 1;
            Ok(())
        }
    }

    #[test]
    fn test_worker_lifecycle() {
        let mut store = MemoryStore::new();
        for level in 0..3 {
            let e = store.spawn();
            store.set_component(e, &Marker { level }).unwrap();
        }

        let container = ViewContainer::new(
            SubscriptionDescriptor::new().require(Marker::type_id()),
            CountingHandler::default(),
        );

        let worker = UpdateWorker::spawn(container, store);
        assert!(!worker.instance_id().is_empty());
        assert!(worker.tick());
        assert!(worker.tick());

        let (container, store) = worker.shutdown().unwrap();
        assert_eq!(container.handler().created, 3);
        assert_eq!(container.handler().destroyed, 3);
        assert_eq!(container.managed_count(), 0);
        assert_eq!(store.entity_count(), 3);
    }

    #[test]
    fn test_tick_after_shutdown_is_reported() {
        let store = MemoryStore::new();
        let container = ViewContainer::new(
            SubscriptionDescriptor::new().require(Marker::type_id()),
            CountingHandler::default(),
        );

        let worker = UpdateWorker::spawn(container, store);
        let sender = worker.sender.clone();
        worker.shutdown().unwrap();
        assert!(sender.send(WorkerCommand::Tick).is_err());
    }
}
