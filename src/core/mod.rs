//! Core scheduling engine.
//!
//! This module owns one full evaluation cycle and the state it needs across
//! cycles: the settings record, the location resolver, the sun times cache,
//! and the idempotent brightness applier. A cycle is triggered either by the
//! periodic timer or by a user-initiated apply-now request; both funnel
//! through the same reentrancy-guarded entry point, and a trigger arriving
//! while a cycle is in flight is dropped outright, never queued.
//!
//! Cycles run on a worker thread so a slow or hung network call bounds the
//! cycle's duration without ever blocking the trigger loop. Every decision in
//! a cycle, including the published status, derives from a single wall clock
//! sample taken at the start of the cycle.

pub mod brightness;
pub mod period;

use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::backend::BrightnessBackend;
use crate::config::{Settings, SettingsStore};
use crate::core::brightness::{Applied, BrightnessApplier};
use crate::core::period::{
    Period, ScheduleDecision, ScheduleSource, period_from_manual_times, period_from_sun_times,
};
use crate::geo::{GeoLookup, LocationResolver, LocationSource};
use crate::io::notify::NotificationSink;
use crate::sun::{SunTimesProvider, SunTimesSource};

/// What caused a cycle to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Periodic timer tick; soft failures stay quiet apart from the log.
    Periodic,
    /// User-initiated apply-now; soft failures are surfaced via the
    /// notification sink.
    ApplyNow,
}

impl Trigger {
    fn is_user_initiated(&self) -> bool {
        matches!(self, Self::ApplyNow)
    }
}

/// Published outcome of the most recent cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleStatus {
    /// The feature is disabled in settings; nothing was applied.
    Disabled,
    Evaluated {
        decision: ScheduleDecision,
        /// The single wall clock sample the whole cycle was decided against.
        evaluated_at: NaiveDateTime,
    },
}

impl CycleStatus {
    /// Whether two statuses describe the same outcome, ignoring when they
    /// were evaluated. Used to keep the periodic log quiet between changes.
    fn same_outcome(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Disabled, Self::Disabled) => true,
            (Self::Evaluated { decision: a, .. }, Self::Evaluated { decision: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "Status: Disabled"),
            Self::Evaluated { decision, .. } => write!(
                f,
                "Status: {} | {} | Next change: {}",
                decision.period.display_name(),
                decision.source.label(),
                decision.next_change.format("%H:%M")
            ),
        }
    }
}

/// Dependencies needed to create an [`Engine`].
pub struct EngineParams {
    pub settings: Settings,
    pub store: Box<dyn SettingsStore>,
    pub geo: Box<dyn GeoLookup>,
    pub sun: Box<dyn SunTimesSource>,
    pub backend: Box<dyn BrightnessBackend>,
    pub notifier: Box<dyn NotificationSink>,
    pub debug_enabled: bool,
}

/// Mutable state owned by the engine, accessed by at most one cycle at a
/// time thanks to the in-flight guard.
struct EngineState {
    settings: Settings,
    store: Box<dyn SettingsStore>,
    resolver: LocationResolver,
    sun: SunTimesProvider,
    applier: BrightnessApplier,
    notifier: Box<dyn NotificationSink>,
    debug_enabled: bool,
}

struct EngineShared {
    state: Mutex<EngineState>,
    in_flight: AtomicBool,
    last_status: Mutex<Option<CycleStatus>>,
    debug_enabled: bool,
}

/// The scheduling engine. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<EngineShared>,
}

impl Engine {
    pub fn new(params: EngineParams) -> Self {
        let state = EngineState {
            settings: params.settings,
            store: params.store,
            resolver: LocationResolver::new(params.geo),
            sun: SunTimesProvider::new(params.sun),
            applier: BrightnessApplier::new(params.backend),
            notifier: params.notifier,
            debug_enabled: params.debug_enabled,
        };
        Self {
            shared: Arc::new(EngineShared {
                state: Mutex::new(state),
                in_flight: AtomicBool::new(false),
                last_status: Mutex::new(None),
                debug_enabled: params.debug_enabled,
            }),
        }
    }

    /// Dispatch a cycle to a worker thread.
    ///
    /// Returns false when the trigger was dropped because a cycle is already
    /// in flight. The check here is a fast path; the compare-exchange inside
    /// the worker is what actually guarantees at most one cycle runs.
    pub fn trigger(&self, trigger: Trigger) -> bool {
        if self.shared.in_flight.load(Ordering::SeqCst) {
            if self.shared.debug_enabled {
                log_decorated!("Evaluation already in flight, dropping {trigger:?} trigger");
            }
            return false;
        }

        let engine = self.clone();
        thread::spawn(move || {
            let now = Local::now().naive_local();
            engine.run_cycle_at(now, trigger.is_user_initiated());
        });
        true
    }

    /// Run one cycle on the calling thread. Used by `--once` mode.
    ///
    /// Returns `None` when the trigger was dropped by the reentrancy guard.
    pub fn run_cycle_blocking(&self, trigger: Trigger) -> Option<CycleStatus> {
        let now = Local::now().naive_local();
        self.run_cycle_at(now, trigger.is_user_initiated())
    }

    /// Re-read settings from the store, keeping the applier's last-applied
    /// value so an unchanged target stays a no-op.
    pub fn reload_settings(&self) {
        let mut state = self.shared.state.lock().unwrap();
        state.settings = state.store.load();
        state.settings.log_settings();
    }

    /// The most recently published cycle status.
    pub fn status(&self) -> Option<CycleStatus> {
        self.shared.last_status.lock().unwrap().clone()
    }

    /// Current periodic re-evaluation interval in seconds.
    pub fn update_interval(&self) -> u64 {
        self.shared.state.lock().unwrap().settings.update_interval
    }

    fn run_cycle_at(&self, now: NaiveDateTime, user_initiated: bool) -> Option<CycleStatus> {
        if self
            .shared
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            if self.shared.debug_enabled {
                log_decorated!("Evaluation already in flight, dropping trigger");
            }
            return None;
        }

        let status = {
            let mut state = self.shared.state.lock().unwrap();
            evaluate_cycle(&mut state, now, user_initiated)
        };
        self.publish(&status, user_initiated);

        self.shared.in_flight.store(false, Ordering::SeqCst);
        Some(status)
    }

    fn publish(&self, status: &CycleStatus, user_initiated: bool) {
        let mut last = self.shared.last_status.lock().unwrap();
        let changed = !last
            .as_ref()
            .is_some_and(|previous| previous.same_outcome(status));
        if changed || user_initiated {
            log_block_start!("{status}");
        }
        *last = Some(status.clone());
    }
}

/// One full evaluation cycle against a single captured `now`.
fn evaluate_cycle(state: &mut EngineState, now: NaiveDateTime, user_initiated: bool) -> CycleStatus {
    if !state.settings.enabled {
        return CycleStatus::Disabled;
    }

    let mut sun_times = None;
    let mut source = ScheduleSource::Manual;

    if state.settings.use_sun_schedule {
        match state.resolver.resolve(&mut state.settings) {
            Some(location) => {
                // Live resolutions update the settings cache fields; persist
                // them so the next offline cycle can still resolve
                if location.source != LocationSource::LastKnown {
                    if state.debug_enabled {
                        log_decorated!(
                            "Resolved location via {}: {}",
                            location.source.label(),
                            location.display()
                        );
                    }
                    if let Err(e) = state.store.save(&state.settings) {
                        log_pipe!();
                        log_warning!("Failed to persist resolved location: {e}");
                    }
                }

                match state
                    .sun
                    .get_sun_times(location.latitude, location.longitude, now.date())
                {
                    Some(times) => {
                        sun_times = Some(times);
                        source = ScheduleSource::SunTimes;
                    }
                    None => {
                        source = ScheduleSource::ManualSunUnavailable;
                        if user_initiated {
                            state.notifier.warn(
                                "Unable to get sunrise/sunset from the server. \
                                 Manual schedule will be used.",
                            );
                        }
                    }
                }
            }
            None => {
                source = ScheduleSource::ManualLocationRequired;
                if user_initiated {
                    state.notifier.warn(
                        "Location is required to calculate sunrise and sunset. \
                         Please enter a city.",
                    );
                }
            }
        }
    }

    let (period, next_change) = match sun_times {
        Some(times) => period_from_sun_times(now, times.sunrise, times.sunset),
        None => period_from_manual_times(
            now,
            state.settings.day_start_time(),
            state.settings.night_start_time(),
        ),
    };

    let target = if period.is_day() {
        state.settings.day_brightness
    } else {
        state.settings.night_brightness
    };

    match state.applier.apply(target) {
        Ok(Applied::Changed) => {
            log_decorated!("Applied {target}% brightness for {}", period.display_name());
        }
        Ok(Applied::Unchanged) => {}
        Err(e) => {
            // Soft failure: warn and retry against the same target next cycle
            log_pipe!();
            log_warning!("Failed to set brightness: {e}");
            if user_initiated {
                state
                    .notifier
                    .warn(&format!("Failed to set brightness. {e}"));
            }
        }
    }

    CycleStatus::Evaluated {
        decision: ScheduleDecision {
            period,
            next_change,
            source,
        },
        evaluated_at: now,
    }
}
