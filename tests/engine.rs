use orbit_core::time;
use orbit_engine::config::SimulationSettings;
use orbit_engine::ephemeris::BodyId;
use orbit_engine::planner::compute_transfer;
use orbit_engine::sim::{Engine, EngineHandle, MissionStatus, StateSnapshot};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

fn start_engine() -> (EngineHandle, watch::Sender<bool>, JoinHandle<()>) {
    let settings = SimulationSettings {
        tick_hz: 20.0,
        snapshot_queue: 4,
    };
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (engine, handle) = Engine::new(&settings, None, shutdown_rx);
    let task = tokio::spawn(engine.run());
    (handle, shutdown_tx, task)
}

async fn next_matching(
    rx: &mut broadcast::Receiver<Arc<StateSnapshot>>,
    predicate: impl Fn(&StateSnapshot) -> bool,
) -> Arc<StateSnapshot> {
    loop {
        let snapshot = rx.recv().await.expect("snapshot stream open");
        if predicate(&snapshot) {
            return snapshot;
        }
    }
}

/// Scenario: play at 1x, expect ~0.05 s steps at 20 Hz; pause freezes
/// sim time while heartbeats keep flowing.
#[tokio::test(start_paused = true)]
async fn snapshots_advance_in_fixed_steps_and_freeze_on_pause() {
    let (handle, shutdown, task) = start_engine();
    let mut rx = handle.subscribe();

    handle.play().await.unwrap();
    let playing = next_matching(&mut rx, |snap| snap.is_playing).await;

    let mut last = playing.sim_time;
    for _ in 0..5 {
        let snapshot = rx.recv().await.unwrap();
        let step = snapshot.sim_time - last;
        assert!((step - 0.05).abs() < 1e-6, "tick step {step} s");
        last = snapshot.sim_time;
    }

    handle.pause().await.unwrap();
    let paused = next_matching(&mut rx, |snap| !snap.is_playing).await;
    let frozen = paused.sim_time;
    for _ in 0..3 {
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.sim_time, frozen, "paused sim time must not move");
        assert!(!snapshot.is_playing);
    }

    shutdown.send(true).ok();
    task.await.unwrap();
}

/// Scenario: 1 s of wall time at 1000x advances sim time by 1000 +- 50 s.
#[tokio::test(start_paused = true)]
async fn accelerated_clock_advances_sim_time_by_the_scale_factor() {
    let (handle, shutdown, task) = start_engine();
    let mut rx = handle.subscribe();

    handle.play().await.unwrap();
    handle.set_speed(1_000.0).await.unwrap();
    let base = next_matching(&mut rx, |snap| snap.is_playing && snap.time_scale == 1_000.0).await;

    // 20 ticks at 20 Hz = one wall second.
    let mut sim_times = Vec::with_capacity(20);
    for _ in 0..20 {
        sim_times.push(rx.recv().await.unwrap().sim_time);
    }
    let advanced = sim_times.last().copied().unwrap_or(base.sim_time) - base.sim_time;
    assert!(
        (950.0..=1_050.0).contains(&advanced),
        "sim advanced {advanced} s over one wall second at 1000x"
    );

    shutdown.send(true).ok();
    task.await.unwrap();
}

/// Scenario: a mission launched with a future departure goes pending ->
/// active -> completed with strictly non-decreasing progress.
#[tokio::test(start_paused = true)]
async fn launched_missions_progress_through_their_lifecycle() {
    let (handle, shutdown, task) = start_engine();
    let mut rx = handle.subscribe();

    handle.play().await.unwrap();
    handle.set_speed(1.0e6).await.unwrap();
    let base = next_matching(&mut rx, |snap| snap.is_playing && snap.time_scale == 1.0e6).await;

    // Depart a few wall seconds out at the current acceleration.
    let t_dep = base.sim_time + 5.0e6;
    let t_arr = t_dep + time::days_to_seconds(200.0);
    let transfer = compute_transfer(BodyId::Earth, BodyId::Mars, t_dep, t_arr).unwrap();
    let mission = handle.launch(transfer).await.unwrap();
    assert_eq!(mission.status, MissionStatus::Pending);
    assert_eq!(mission.id, "mission-1");

    let mut saw_active = false;
    let mut last_progress = 0.0;
    loop {
        let snapshot = rx.recv().await.unwrap();
        let mission = match snapshot.missions.first() {
            Some(mission) => mission,
            None => continue,
        };
        assert!(
            mission.progress >= last_progress,
            "progress regressed from {last_progress} to {}",
            mission.progress
        );
        last_progress = mission.progress;
        match mission.status {
            MissionStatus::Active => saw_active = true,
            MissionStatus::Completed => break,
            MissionStatus::Pending => {}
            MissionStatus::Failed => panic!("mission failed unexpectedly"),
        }
    }
    assert!(saw_active, "mission never reported active");
    assert_eq!(last_progress, 1.0);

    shutdown.send(true).ok();
    task.await.unwrap();
}

/// Scenario: a consumer that never reads loses snapshots only; the tick
/// counter advances and other sessions receive every snapshot.
#[tokio::test(start_paused = true)]
async fn lagging_observers_lose_only_snapshots() {
    let (handle, shutdown, task) = start_engine();
    let mut eager = handle.subscribe();
    let mut lazy = handle.subscribe();

    let mut last_tick = 0;
    for _ in 0..10 {
        let snapshot = eager.recv().await.unwrap();
        assert_eq!(snapshot.tick, last_tick + 1, "eager reader missed a tick");
        last_tick = snapshot.tick;
    }

    match lazy.try_recv() {
        Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
            assert_eq!(skipped, 6, "ring depth 4 keeps the newest four of ten");
        }
        other => panic!("expected lag, got {other:?}"),
    }
    let resumed = lazy.try_recv().expect("snapshot after lag report");
    assert_eq!(resumed.tick, 7);

    shutdown.send(true).ok();
    task.await.unwrap();
}

/// Scenario: an invalid speed is rejected and the simulation state is
/// unchanged.
#[tokio::test(start_paused = true)]
async fn rejected_speed_changes_leave_the_simulation_untouched() {
    let (handle, shutdown, task) = start_engine();
    let mut rx = handle.subscribe();

    let err = handle.set_speed(-1.0).await.unwrap_err();
    assert_eq!(err.kind(), "InvalidSpeed");

    let snapshot = rx.recv().await.unwrap();
    assert_eq!(snapshot.time_scale, 1.0);
    assert!(!snapshot.is_playing);

    shutdown.send(true).ok();
    task.await.unwrap();
}

/// Shutdown stops the loop and closes the snapshot stream.
#[tokio::test(start_paused = true)]
async fn shutdown_terminates_the_stream() {
    let (handle, shutdown, task) = start_engine();
    let mut rx = handle.subscribe();
    rx.recv().await.unwrap();

    shutdown.send(true).ok();
    task.await.unwrap();
    drop(handle);

    loop {
        match rx.recv().await {
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
