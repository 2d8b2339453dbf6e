//! Periodic refresh driver.
//!
//! Runs a recommendation cycle at a fixed interval against the most recent
//! environment. On-demand cycles (chat-triggered or explicit API calls) go
//! through the same path, and a cycle lock keeps at most one in flight.
//! Each cycle runs on its own task, so a caller that stops waiting does not
//! leave the store in `generating`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ic_protocol::{ApplianceSet, EnvironmentSnapshot, RecommendationResult};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::time::{self, MissedTickBehavior};

use crate::client::RecommendationClient;
use crate::error::{AdvisorError, AdvisorResult};
use crate::store::RecommendationStore;

/// Environment plus the appliances present in the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomContext {
    pub environment: EnvironmentSnapshot,
    pub capabilities: ApplianceSet,
}

/// Most recently submitted room context, shared with the refresh loop.
#[derive(Debug, Clone, Default)]
pub struct SharedEnvironment {
    inner: Arc<RwLock<Option<RoomContext>>>,
}

impl SharedEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(context: RoomContext) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(context))),
        }
    }

    pub async fn set(&self, context: RoomContext) {
        *self.inner.write().await = Some(context);
    }

    pub async fn get(&self) -> Option<RoomContext> {
        self.inner.read().await.clone()
    }
}

/// What a cycle did.
#[derive(Debug)]
pub enum CycleOutcome {
    /// No environment has been submitted yet.
    Skipped,
    Updated(RecommendationResult),
    Failed(AdvisorError),
}

/// Ties the client, store and environment together.
#[derive(Clone)]
pub struct Advisor {
    client: RecommendationClient,
    store: RecommendationStore,
    environment: SharedEnvironment,
    cycle_lock: Arc<Mutex<()>>,
}

impl Advisor {
    pub fn new(
        client: RecommendationClient,
        store: RecommendationStore,
        environment: SharedEnvironment,
    ) -> Self {
        Self {
            client,
            store,
            environment,
            cycle_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &RecommendationStore {
        &self.store
    }

    pub fn environment(&self) -> &SharedEnvironment {
        &self.environment
    }

    /// Run one cycle against the current shared environment.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Some(context) = self.environment.get().await else {
            tracing::debug!("no environment submitted yet, skipping cycle");
            return CycleOutcome::Skipped;
        };
        match self.cycle(context).await {
            Ok(result) => CycleOutcome::Updated(result),
            Err(e) => CycleOutcome::Failed(e),
        }
    }

    /// Alias used by the chat path.
    pub async fn trigger(&self) -> CycleOutcome {
        self.run_cycle().await
    }

    /// Make `context` the shared environment and run a cycle for it now.
    pub async fn recommend_now(&self, context: RoomContext) -> AdvisorResult<RecommendationResult> {
        self.environment.set(context.clone()).await;
        self.cycle(context).await
    }

    async fn cycle(&self, context: RoomContext) -> AdvisorResult<RecommendationResult> {
        let advisor = self.clone();
        tokio::spawn(async move { advisor.locked_cycle(&context).await })
            .await
            .map_err(|e| AdvisorError::Transport(format!("cycle task failed: {e}")))?
    }

    async fn locked_cycle(&self, context: &RoomContext) -> AdvisorResult<RecommendationResult> {
        let _guard = self.cycle_lock.lock().await;
        self.store.begin_cycle().await;

        let result = self
            .client
            .recommend(&context.environment, &context.capabilities)
            .await;

        match &result {
            Ok(rec) => self.store.complete(rec.clone()).await,
            Err(e) => self.store.fail(e, Utc::now()).await,
        }
        result
    }
}

/// Run the refresh loop, cycling every `interval`.
///
/// The first cycle starts immediately. A cycle that overruns the interval
/// delays the next tick instead of bursting to catch up. Runs until the
/// task is cancelled.
pub async fn run(advisor: Advisor, interval: Duration) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycle: u64 = 0;

    loop {
        ticker.tick().await;
        cycle += 1;

        match advisor.run_cycle().await {
            CycleOutcome::Skipped => {}
            CycleOutcome::Updated(rec) => {
                tracing::info!(cycle, id = %rec.id, "recommendation refreshed");
            }
            CycleOutcome::Failed(e) => {
                tracing::warn!(cycle, kind = %e.kind(), error = %e.detail(), "refresh cycle failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ic_protocol::{ApplianceKind, CycleStatus, Freshness};
    use tokio::sync::Semaphore;

    use crate::mock::ScriptedModel;

    const REPLY: &str = r#"{"reason":"hot","AC_MODE":"COOL","AC_TEMPERATURE":23,"RECHECK_AT":15}"#;

    fn context() -> RoomContext {
        RoomContext {
            environment: EnvironmentSnapshot::default(),
            capabilities: ApplianceSet::new().with(ApplianceKind::Ac),
        }
    }

    /// Helper: advisor over a scripted model, optionally pre-seeded.
    fn scripted_advisor(model: ScriptedModel, seeded: bool) -> (Advisor, Arc<ScriptedModel>) {
        let model = Arc::new(model);
        let environment = if seeded {
            SharedEnvironment::with(context())
        } else {
            SharedEnvironment::new()
        };
        let advisor = Advisor::new(
            RecommendationClient::new(model.clone()),
            RecommendationStore::new(),
            environment,
        );
        (advisor, model)
    }

    // ── single cycles ───────────────────────────────────────────

    #[tokio::test]
    async fn cycle_without_environment_is_skipped() {
        let (advisor, model) = scripted_advisor(ScriptedModel::new().reply(REPLY), false);
        assert!(matches!(advisor.run_cycle().await, CycleOutcome::Skipped));
        assert_eq!(model.call_count(), 0);
        assert_eq!(advisor.store().snapshot().await.freshness(), Freshness::Empty);
    }

    #[tokio::test]
    async fn successful_cycle_updates_store() {
        let (advisor, _) = scripted_advisor(ScriptedModel::new().reply(REPLY), true);
        let CycleOutcome::Updated(rec) = advisor.run_cycle().await else {
            panic!("expected update");
        };
        let state = advisor.store().snapshot().await;
        assert_eq!(state.latest_recommendation, Some(rec));
        assert_eq!(state.status, CycleStatus::Idle);
    }

    #[tokio::test]
    async fn failed_cycle_keeps_previous_result() {
        let model = ScriptedModel::new()
            .reply(REPLY)
            .fail(AdvisorError::Transport("timeout".into()));
        let (advisor, _) = scripted_advisor(model, true);

        advisor.run_cycle().await;
        let before = advisor.store().snapshot().await;

        assert!(matches!(advisor.run_cycle().await, CycleOutcome::Failed(_)));
        let after = advisor.store().snapshot().await;
        assert_eq!(after.latest_recommendation, before.latest_recommendation);
        assert_eq!(after.last_updated, before.last_updated);
        assert!(after.error.unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn recommend_now_replaces_environment() {
        let (advisor, model) = scripted_advisor(ScriptedModel::new().reply(REPLY), false);
        let mut ctx = context();
        ctx.environment.room.room_name = Some("Study".into());

        advisor.recommend_now(ctx.clone()).await.unwrap();
        assert_eq!(advisor.environment().get().await, Some(ctx));
        assert!(model.calls()[0].prompt.contains("Study"));
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_request_still_finishes_cycle() {
        let gate = Arc::new(Semaphore::new(0));
        let (advisor, model) =
            scripted_advisor(ScriptedModel::new().reply(REPLY).gated(gate.clone()), false);

        let waited = time::timeout(Duration::from_millis(50), advisor.recommend_now(context())).await;
        assert!(waited.is_err());
        assert_eq!(model.call_count(), 1);

        gate.add_permits(1);
        time::sleep(Duration::from_millis(100)).await;

        let state = advisor.store().snapshot().await;
        assert_eq!(state.status, CycleStatus::Idle);
        assert!(state.latest_recommendation.is_some());
        assert!(state.error.is_none());
    }

    // ── concurrency ─────────────────────────────────────────────

    #[tokio::test]
    async fn readers_proceed_while_cycle_in_flight() {
        let gate = Arc::new(Semaphore::new(0));
        let (advisor, model) = scripted_advisor(
            ScriptedModel::new().reply(REPLY).reply(REPLY).gated(gate.clone()),
            true,
        );

        let first = tokio::spawn({
            let advisor = advisor.clone();
            async move { advisor.trigger().await }
        });
        let second = tokio::spawn({
            let advisor = advisor.clone();
            async move { advisor.trigger().await }
        });
        time::sleep(Duration::from_millis(50)).await;

        // One model call in flight, the other cycle waits on the lock.
        assert_eq!(model.call_count(), 1);
        let state = advisor.store().snapshot().await;
        assert_eq!(state.status, CycleStatus::Generating);
        assert!(state.latest_recommendation.is_none());

        gate.add_permits(2);
        assert!(matches!(first.await.unwrap(), CycleOutcome::Updated(_)));
        assert!(matches!(second.await.unwrap(), CycleOutcome::Updated(_)));
        assert_eq!(model.call_count(), 2);
        assert_eq!(advisor.store().snapshot().await.status, CycleStatus::Idle);
    }

    // ── driver loop ─────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn loop_cycles_on_interval() {
        let (advisor, model) = scripted_advisor(
            ScriptedModel::new().reply(REPLY).reply(REPLY).reply(REPLY),
            true,
        );
        let handle = tokio::spawn(run(advisor.clone(), Duration::from_secs(120)));

        // Ticks at 0s, 120s and 240s.
        time::sleep(Duration::from_secs(300)).await;
        handle.abort();

        assert_eq!(model.call_count(), 3);
        assert_eq!(advisor.store().snapshot().await.freshness(), Freshness::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn overrunning_cycle_delays_next_tick() {
        let gate = Arc::new(Semaphore::new(0));
        let (advisor, model) = scripted_advisor(
            ScriptedModel::new()
                .reply(REPLY)
                .reply(REPLY)
                .reply(REPLY)
                .gated(gate.clone()),
            true,
        );
        let handle = tokio::spawn(run(advisor.clone(), Duration::from_secs(60)));

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(model.call_count(), 1);
        assert_eq!(advisor.store().snapshot().await.status, CycleStatus::Generating);

        // Several intervals pass while the first cycle is stuck: no overlap.
        time::sleep(Duration::from_secs(200)).await;
        assert_eq!(model.call_count(), 1);

        // The missed tick fires as soon as the slow cycle completes.
        gate.add_permits(1);
        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(model.call_count(), 2);
        assert!(advisor.store().snapshot().await.latest_recommendation.is_some());

        // After that the schedule restarts from the delayed tick.
        gate.add_permits(1);
        time::sleep(Duration::from_secs(58)).await;
        assert_eq!(model.call_count(), 2);
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(model.call_count(), 3);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn loop_survives_failures() {
        let model = ScriptedModel::new()
            .fail(AdvisorError::Parse("no JSON".into()))
            .reply(REPLY);
        let (advisor, model) = scripted_advisor(model, true);
        let handle = tokio::spawn(run(advisor.clone(), Duration::from_secs(60)));

        time::sleep(Duration::from_secs(90)).await;
        handle.abort();

        assert_eq!(model.call_count(), 2);
        let state = advisor.store().snapshot().await;
        assert!(state.latest_recommendation.is_some());
        assert!(state.error.is_none());
    }
}
