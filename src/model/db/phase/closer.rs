use std::collections::HashMap;
use std::sync::Arc;

use mongodb::{bson::doc, error::Error as DbError, Database};
use rocket::{
    fairing::{Fairing, Info, Kind},
    futures::future::{BoxFuture, FutureExt},
    futures::TryStreamExt,
    tokio::sync::Mutex,
    Build, Rocket,
};

use crate::{
    error::Error,
    model::{
        common::{PhaseKind, PhaseStatus, Scope},
        mongodb::Coll,
    },
    scheduled_task::ScheduledTask,
};

use super::record::PhaseRecord;

/// Seconds before a failed closer is retried.
const RETRY_INTERVAL_SECONDS: i64 = 300;

/// Map from (scope, kind) to the pending closer task.
type TaskMap = HashMap<(Scope, PhaseKind), ScheduledTask<Result<(), Error>>>;

/// Phase closers: scheduled tasks that flip an open phase to closed when its
/// deadline arrives, so the stored status catches up with the wall clock.
/// `is_open_at` does not trust the status alone, so a late closer never
/// extends a window; this is hygiene, not the gate.
pub struct PhaseClosers {
    tasks: Arc<Mutex<TaskMap>>,
}

impl PhaseClosers {
    /// Create an empty set of phase closers.
    pub fn new() -> Self {
        Self {
            tasks: Default::default(),
        }
    }

    /// Schedule a closer for every phase currently marked open.
    pub async fn schedule_open_phases(&self, db: &Database) -> Result<(), DbError> {
        let filter = doc! { "status": PhaseStatus::Open };
        let open_phases: Vec<PhaseRecord> = Coll::<PhaseRecord>::from_db(db)
            .find(filter, None)
            .await?
            .try_collect()
            .await?;
        for record in open_phases {
            self.schedule(Coll::from_db(db), &record).await;
        }
        Ok(())
    }

    /// Schedule a closer for the given record, replacing any existing one
    /// (re-opening a phase moves its deadline).
    pub async fn schedule(&self, phases: Coll<PhaseRecord>, record: &PhaseRecord) {
        let key = (record.scope, record.kind);
        let closer = Self::closer(record.scope, record.kind, phases, self.tasks.clone());
        let mut tasks = self.tasks.lock().await;
        if let Some(previous) = tasks.remove(&key) {
            previous.cancel().await;
        }
        tasks.insert(key, ScheduledTask::new(closer, record.close_at));
    }

    /// Drop the closer for a phase that was closed manually.
    pub async fn cancel(&self, scope: Scope, kind: PhaseKind) {
        let task = self.tasks.lock().await.remove(&(scope, kind));
        if let Some(task) = task {
            task.cancel().await;
        }
    }

    /// The closer itself. On database failure it reschedules a retry of
    /// itself, hence the `BoxFuture` to break the recursive state machine.
    fn closer(
        scope: Scope,
        kind: PhaseKind,
        phases: Coll<PhaseRecord>,
        tasks: Arc<Mutex<TaskMap>>,
    ) -> BoxFuture<'static, Result<(), Error>> {
        async fn close(
            scope: Scope,
            kind: PhaseKind,
            phases: &Coll<PhaseRecord>,
        ) -> Result<(), Error> {
            let filter = doc! {
                "scope": scope,
                "kind": kind,
                "status": PhaseStatus::Open,
            };
            let update = doc! {
                "$set": { "status": PhaseStatus::Closed }
            };
            let result = phases.update_one(filter, update, None).await?;
            if result.modified_count == 1 {
                info!("{kind} window for {scope} reached its close time");
            } else {
                debug!("closer for {scope} {kind} had nothing to do");
            }
            Ok(())
        }

        async move {
            let result = close(scope, kind, &phases).await;
            match result {
                Ok(()) => {
                    tasks.lock().await.remove(&(scope, kind));
                }
                Err(ref e) => {
                    error!("closer for {scope} {kind} failed: {e}");
                    let retry = Self::closer(scope, kind, phases, tasks.clone());
                    let retry_at = chrono::Utc::now() + chrono::Duration::seconds(RETRY_INTERVAL_SECONDS);
                    tasks
                        .lock()
                        .await
                        .insert((scope, kind), ScheduledTask::new(retry, retry_at));
                    warn!("failed closer will be retried in {RETRY_INTERVAL_SECONDS} seconds");
                }
            }
            result
        }
        .boxed()
    }
}

impl Default for PhaseClosers {
    fn default() -> Self {
        Self::new()
    }
}

/// A fairing that arms closers for all open phases during ignition and puts
/// a `PhaseClosers` into managed state. Must be attached after the database
/// fairing.
pub struct PhaseCloserFairing;

#[rocket::async_trait]
impl Fairing for PhaseCloserFairing {
    fn info(&self) -> Info {
        Info {
            name: "Phase Closers",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        info!("Arming phase closers...");
        let closers = PhaseClosers::new();
        let db = match rocket.state::<Database>() {
            Some(db) => db,
            None => {
                error!("Database was not available when arming phase closers");
                return Err(rocket);
            }
        };
        if let Err(e) = closers.schedule_open_phases(db).await {
            error!("Failed to arm phase closers: {e}");
            return Err(rocket);
        }
        info!("...phase closers armed!");

        rocket = rocket.manage(closers);
        Ok(rocket)
    }
}
