//! Concurrency properties of `SharedState`.
//!
//! Writers stand in for the console and HTTP surfaces; a reader thread plays
//! the control loop and checks every snapshot it takes for internal
//! consistency.

use chrono::Utc;
use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use thermo_core::{
    ActuatorState, FanMode, HvacMode, SensorSample, SharedState, StateSnapshot,
    ThermostatSettings,
};

/// Settings whose every field is derived from `k`, so a mix of two writes is
/// detectable.
fn settings_for(k: u32) -> ThermostatSettings {
    let value = f64::from(k);
    ThermostatSettings {
        hvac_mode: match k % 3 {
            0 => HvacMode::Ac,
            1 => HvacMode::Heat,
            _ => HvacMode::Off,
        },
        fan_mode: if k % 2 == 0 { FanMode::On } else { FanMode::Auto },
        heat_setpoint: value,
        cool_setpoint: value,
        calibration_offset: value,
    }
}

fn assert_consistent(snapshot: &StateSnapshot) {
    let s = snapshot.settings;
    assert_eq!(s.heat_setpoint, s.cool_setpoint, "torn settings: {s:?}");
    assert_eq!(s.heat_setpoint, s.calibration_offset, "torn settings: {s:?}");
    assert_eq!(s, settings_for(s.heat_setpoint as u32), "torn settings");

    let sample = snapshot.sample;
    if sample.valid {
        assert_eq!(sample.raw_temperature, sample.raw_humidity, "torn sample");
    }

    let a = snapshot.actuators;
    assert!(!(a.heater_on && a.compressor_on), "torn actuator state: {a}");
    assert_eq!(a.blower_on, a.is_conditioning(), "torn actuator state: {a}");
}

fn run_interleaved(writers: u32, writes_per_writer: u32) {
    let state = SharedState::new(settings_for(0));
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let state = state.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                assert_consistent(&state.snapshot());
            }
            assert_consistent(&state.snapshot());
        })
    };

    let recorder = {
        let state = state.clone();
        thread::spawn(move || {
            for i in 0..writes_per_writer {
                let value = f64::from(i);
                state.record_sample(SensorSample::captured(value, value, Utc::now()));
                let actuators = match i % 3 {
                    0 => ActuatorState::ALL_OFF,
                    1 => ActuatorState {
                        heater_on: true,
                        compressor_on: false,
                        blower_on: true,
                    },
                    _ => ActuatorState {
                        heater_on: false,
                        compressor_on: true,
                        blower_on: true,
                    },
                };
                state.record_actuator_state(actuators);
            }
        })
    };

    let handles: Vec<_> = (0..writers)
        .map(|w| {
            let state = state.clone();
            thread::spawn(move || {
                for i in 0..writes_per_writer {
                    let k = w * writes_per_writer + i + 1;
                    state.modify_settings(|s| *s = settings_for(k));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    recorder.join().unwrap();
    done.store(true, Ordering::Release);
    reader.join().unwrap();

    assert_eq!(
        state.snapshot().settings_revision,
        u64::from(writers * writes_per_writer)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Property: interleaved writers never expose a torn snapshot.
    #[test]
    fn prop_no_torn_reads(writers in 2u32..6, writes in 50u32..400) {
        run_interleaved(writers, writes);
    }
}

#[test]
fn test_concurrent_modifications_are_not_lost() {
    const WRITERS: u32 = 8;
    const INCREMENTS: u32 = 1_000;

    let state = SharedState::new(ThermostatSettings {
        heat_setpoint: 0.0,
        ..ThermostatSettings::default()
    });

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let state = state.clone();
            thread::spawn(move || {
                for _ in 0..INCREMENTS {
                    state.modify_settings(|s| s.heat_setpoint += 1.0);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = state.snapshot();
    assert_eq!(snapshot.settings.heat_setpoint, f64::from(WRITERS * INCREMENTS));
    assert_eq!(snapshot.settings_revision, u64::from(WRITERS * INCREMENTS));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tasks_and_reader() {
    let state = SharedState::new(settings_for(0));

    let mut tasks = tokio::task::JoinSet::new();
    for w in 0..4u32 {
        let state = state.clone();
        tasks.spawn(async move {
            for i in 0..200u32 {
                state.modify_settings(|s| *s = settings_for(w * 200 + i + 1));
                tokio::task::yield_now().await;
            }
        });
    }

    let reader = {
        let state = state.clone();
        tokio::spawn(async move {
            for _ in 0..2_000 {
                assert_consistent(&state.snapshot());
                tokio::task::yield_now().await;
            }
        })
    };

    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }
    reader.await.unwrap();
    assert_eq!(state.snapshot().settings_revision, 800);
}
