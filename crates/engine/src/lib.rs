//! The simulation engine: a single-writer tick loop that owns the clock,
//! body states, and the mission roster.
//!
//! Observers never share locks with the engine. Each tick builds one
//! snapshot behind an `Arc` and publishes it over a bounded broadcast ring;
//! slow consumers lose old snapshots, the tick never waits. Commands arrive
//! on a bounded queue and take effect at the start of the next tick, in
//! arrival order.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use orbit_config::SimulationSettings;
use orbit_core::{time, units, vector::Vector3};
use orbit_ephemeris::{catalog, kepler, BodyId, StateVector};
use orbit_planner::Transfer;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;

pub mod clock;
pub mod journal;
pub mod mission;
pub mod snapshot;

pub use clock::{SimulationClock, MAX_TIME_SCALE};
pub use journal::{JournalBodyState, JournalFile, JournalHandle, JournalMetadata, JournalRecord};
pub use mission::{Mission, MissionStatus};
pub use snapshot::{BodySnapshot, MissionSnapshot, StateSnapshot, TrajectoryPoint};

/// Depth of the inbound command queue shared by all sessions.
const COMMAND_QUEUE_DEPTH: usize = 64;

/// Failures surfaced to command issuers.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("speed must be positive (got {speed})")]
    InvalidSpeed { speed: f64 },
    #[error("simulation engine is not running")]
    EngineStopped,
}

impl EngineError {
    /// Stable machine-readable kind tag, used in wire error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidSpeed { .. } => "InvalidSpeed",
            EngineError::EngineStopped => "EngineStopped",
        }
    }
}

/// Commands drained by the engine at tick boundaries.
#[derive(Debug)]
pub enum EngineCommand {
    Play,
    Pause,
    SetSpeed {
        speed: f64,
    },
    Launch {
        transfer: Box<Transfer>,
        reply: oneshot::Sender<MissionSnapshot>,
    },
}

/// Cheap cloneable front to a running engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
    snapshots: broadcast::Sender<Arc<StateSnapshot>>,
    latest: watch::Receiver<Option<Arc<StateSnapshot>>>,
}

impl EngineHandle {
    /// Subscribe to the per-tick snapshot stream. The ring is bounded; a
    /// receiver that lags sees `Lagged(n)` with its personal drop count.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<StateSnapshot>> {
        self.snapshots.subscribe()
    }

    /// The most recently published snapshot, if any tick has run yet.
    pub fn latest(&self) -> Option<Arc<StateSnapshot>> {
        self.latest.borrow().clone()
    }

    pub async fn play(&self) -> Result<(), EngineError> {
        self.send(EngineCommand::Play).await
    }

    pub async fn pause(&self) -> Result<(), EngineError> {
        self.send(EngineCommand::Pause).await
    }

    /// Queue a speed change; `speed` must be strictly positive.
    pub async fn set_speed(&self, speed: f64) -> Result<(), EngineError> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(EngineError::InvalidSpeed { speed });
        }
        self.send(EngineCommand::SetSpeed { speed }).await
    }

    /// Hand a resolved transfer to the engine; resolves to the created
    /// mission record once the next tick has admitted it.
    pub async fn launch(&self, transfer: Transfer) -> Result<MissionSnapshot, EngineError> {
        let (reply, response) = oneshot::channel();
        self.send(EngineCommand::Launch {
            transfer: Box::new(transfer),
            reply,
        })
        .await?;
        response.await.map_err(|_| EngineError::EngineStopped)
    }

    async fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| EngineError::EngineStopped)
    }
}

/// The tick task state. Exclusively owns the clock and mission roster;
/// all mutation happens inside [`Engine::step`].
pub struct Engine {
    clock: SimulationClock,
    tick: u64,
    body_states: BTreeMap<BodyId, StateVector>,
    missions: Vec<Mission>,
    next_mission_seq: u64,
    tick_period: Duration,
    commands: mpsc::Receiver<EngineCommand>,
    snapshot_tx: broadcast::Sender<Arc<StateSnapshot>>,
    latest_tx: watch::Sender<Option<Arc<StateSnapshot>>>,
    journal: Option<JournalHandle>,
    shutdown: watch::Receiver<bool>,
}

impl Engine {
    /// Build an engine and its handle. The engine starts paused with
    /// sim time 0 (epoch J).
    pub fn new(
        settings: &SimulationSettings,
        journal: Option<JournalHandle>,
        shutdown: watch::Receiver<bool>,
    ) -> (Engine, EngineHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (snapshot_tx, _) = broadcast::channel(settings.snapshot_queue.max(1));
        let (latest_tx, latest_rx) = watch::channel(None);

        let engine = Engine {
            clock: SimulationClock::new(),
            tick: 0,
            body_states: BTreeMap::new(),
            missions: Vec::new(),
            next_mission_seq: 1,
            tick_period: Duration::from_secs_f64(1.0 / settings.tick_hz),
            commands: command_rx,
            snapshot_tx: snapshot_tx.clone(),
            latest_tx,
            journal,
            shutdown,
        };
        let handle = EngineHandle {
            commands: command_tx,
            snapshots: snapshot_tx,
            latest: latest_rx,
        };
        (engine, handle)
    }

    /// Run the tick loop until shutdown, then flush by dropping the
    /// journal handle.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.tick_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = tokio::time::Instant::now();

        tracing::info!(
            tick_hz = 1.0 / self.tick_period.as_secs_f64(),
            "simulation engine started (paused)"
        );
        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                now = interval.tick() => {
                    let wall_dt = now.saturating_duration_since(last_tick).as_secs_f64();
                    last_tick = now;
                    self.step(wall_dt, Utc::now());
                }
            }
        }
        tracing::info!(ticks = self.tick, missions = self.missions.len(), "simulation engine stopped");
    }

    /// One tick: drain commands, advance the clock, recompute body states,
    /// update missions, publish the snapshot, and journal the tick.
    pub fn step(&mut self, wall_dt_s: f64, wall_now: DateTime<Utc>) -> Arc<StateSnapshot> {
        self.apply_commands();
        self.clock.advance(wall_dt_s);
        self.tick += 1;

        let sim_time = self.clock.sim_time_s();
        self.refresh_body_states(sim_time);
        for mission in &mut self.missions {
            mission.advance(sim_time);
        }

        let snapshot = Arc::new(self.build_snapshot(wall_now));
        if let Some(journal) = &self.journal {
            journal.record(self.build_journal_record(&snapshot));
        }
        // Publishing never blocks; a send error only means no subscribers.
        let _ = self.snapshot_tx.send(snapshot.clone());
        self.latest_tx.send_replace(Some(snapshot.clone()));
        snapshot
    }

    fn apply_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                EngineCommand::Play => self.clock.play(),
                EngineCommand::Pause => self.clock.pause(),
                EngineCommand::SetSpeed { speed } => self.clock.set_time_scale(speed),
                EngineCommand::Launch { transfer, reply } => {
                    let mission = Mission::new(
                        self.next_mission_seq,
                        *transfer,
                        self.clock.sim_time_s(),
                    );
                    self.next_mission_seq += 1;
                    tracing::info!(
                        mission = %mission.id,
                        departure = %mission.transfer.departure,
                        arrival = %mission.transfer.arrival,
                        status = ?mission.status,
                        "mission launched"
                    );
                    let record = MissionSnapshot::from_mission(&mission);
                    self.missions.push(mission);
                    let _ = reply.send(record);
                }
            }
        }
    }

    fn refresh_body_states(&mut self, sim_time: f64) {
        for body in catalog().iter() {
            match kepler::propagate(body.id, sim_time) {
                Ok(state) => {
                    self.body_states.insert(body.id, state);
                }
                Err(err) => {
                    // Keep the previous state; the tick must not fail.
                    tracing::warn!(body = %body.id, error = %err, "body propagation failed");
                    self.body_states.entry(body.id).or_insert(StateVector::ZERO);
                }
            }
        }
    }

    fn build_snapshot(&self, wall_now: DateTime<Utc>) -> StateSnapshot {
        let bodies = catalog()
            .iter()
            .map(|body| {
                let state = self
                    .body_states
                    .get(&body.id)
                    .copied()
                    .unwrap_or(StateVector::ZERO);
                (body.id, BodySnapshot::from_state(body, &state))
            })
            .collect();

        StateSnapshot {
            tick: self.tick,
            sim_time: self.clock.sim_time_s(),
            real_time: time::format_wall(wall_now),
            time_scale: self.clock.time_scale(),
            is_playing: self.clock.is_playing(),
            bodies,
            missions: self
                .missions
                .iter()
                .map(MissionSnapshot::from_mission)
                .collect(),
        }
    }

    fn build_journal_record(&self, snapshot: &StateSnapshot) -> JournalRecord {
        JournalRecord {
            tick: snapshot.tick,
            sim_time: snapshot.sim_time,
            wall_time: snapshot.real_time.clone(),
            time_scale: snapshot.time_scale,
            bodies: self
                .body_states
                .iter()
                .map(|(id, state)| {
                    (
                        *id,
                        JournalBodyState {
                            r_m: state.position_m,
                            r_au: to_au(&state.position_m),
                            v_ms: state.velocity_m_s,
                        },
                    )
                })
                .collect(),
        }
    }
}

fn to_au(v: &Vector3) -> Vector3 {
    [
        units::m_to_au(v[0]),
        units::m_to_au(v[1]),
        units::m_to_au(v[2]),
    ]
}

#[cfg(test)]
mod tests {
    use orbit_planner::compute_transfer;

    use super::*;

    fn test_engine() -> (Engine, EngineHandle, watch::Sender<bool>) {
        let settings = SimulationSettings {
            tick_hz: 20.0,
            snapshot_queue: 4,
        };
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (engine, handle) = Engine::new(&settings, None, shutdown_rx);
        (engine, handle, shutdown_tx)
    }

    #[tokio::test]
    async fn paused_engine_publishes_heartbeats_without_advancing() {
        let (mut engine, _handle, _shutdown) = test_engine();
        let first = engine.step(0.05, Utc::now());
        let second = engine.step(0.05, Utc::now());
        assert_eq!(first.sim_time, 0.0);
        assert_eq!(second.sim_time, 0.0);
        assert_eq!(second.tick, first.tick + 1);
        assert!(!second.is_playing);
    }

    #[tokio::test]
    async fn play_and_speed_commands_apply_at_the_next_tick() {
        let (mut engine, handle, _shutdown) = test_engine();
        handle.play().await.unwrap();
        handle.set_speed(1_000.0).await.unwrap();

        let snapshot = engine.step(1.0, Utc::now());
        assert!(snapshot.is_playing);
        assert!(
            (snapshot.sim_time - 1_000.0).abs() < 1e-9,
            "1 s wall at 1000x should advance 1000 s (got {})",
            snapshot.sim_time
        );
    }

    #[tokio::test]
    async fn invalid_speed_is_rejected_before_reaching_the_queue() {
        let (mut engine, handle, _shutdown) = test_engine();
        let err = handle.set_speed(-1.0).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidSpeed { .. }));

        // Simulation state is untouched by the rejected command.
        let snapshot = engine.step(0.05, Utc::now());
        assert_eq!(snapshot.time_scale, 1.0);
        assert!(!snapshot.is_playing);
    }

    #[tokio::test]
    async fn launch_reports_the_created_mission() {
        let (mut engine, handle, _shutdown) = test_engine();
        let t_dep = orbit_core::time::parse_instant("2026-11-15T00:00:00Z").unwrap();
        let t_arr = orbit_core::time::parse_instant("2027-09-01T00:00:00Z").unwrap();
        let transfer =
            compute_transfer(BodyId::Earth, BodyId::Mars, t_dep, t_arr).unwrap();

        let launcher = handle.clone();
        let join = tokio::spawn(async move { launcher.launch(transfer).await });
        tokio::task::yield_now().await;
        engine.step(0.0, Utc::now());

        let mission = join.await.unwrap().unwrap();
        assert_eq!(mission.id, "mission-1");
        assert_eq!(mission.status, MissionStatus::Pending);
        assert!(!mission.trajectory.is_empty());

        let snapshot = engine.step(0.0, Utc::now());
        assert_eq!(snapshot.missions.len(), 1);
    }

    #[tokio::test]
    async fn slow_subscribers_lose_snapshots_but_fast_ones_do_not() {
        let (mut engine, handle, _shutdown) = test_engine();
        let mut fast = handle.subscribe();
        let mut slow = handle.subscribe();

        let mut fast_seen = 0;
        for _ in 0..10 {
            engine.step(0.05, Utc::now());
            assert!(fast.try_recv().is_ok());
            fast_seen += 1;
        }
        assert_eq!(fast_seen, 10);

        match slow.try_recv() {
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                assert_eq!(skipped, 6, "ring depth 4 keeps the newest four");
            }
            other => panic!("expected lag, got {other:?}"),
        }
        // After reporting the lag the slow reader resumes with live data.
        let resumed = slow.try_recv().expect("snapshot after lag");
        assert_eq!(resumed.tick, 7);
    }
}
