//! Demo components wired into the hosted device.
//!
//! | Component | Loops | Entity |
//! |---|---|---|
//! | [`UptimeSensor`] | yes | `sensor` "Uptime" (seconds since boot) |
//! | [`VersionTextSensor`] | no | `text_sensor` "Version" |
//! | [`StatusReporter`] | yes | none; logs app-state transitions |

use std::cell::Cell;
use std::rc::Rc;

use cadence_kernel::domains::{Sensor, SensorDomain, TextSensor, TextSensorDomain};
use cadence_kernel::{Component, Context, Entity, EntityId, EntityInfo};
use cadence_types::{AppState, CadenceError};
use tracing::{debug, info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Uptime
// ─────────────────────────────────────────────────────────────────────────────

struct UptimeReading {
    info: EntityInfo,
    seconds: f32,
}

impl Entity for UptimeReading {
    fn info(&self) -> &EntityInfo {
        &self.info
    }
}

impl Sensor for UptimeReading {
    fn state(&self) -> f32 {
        self.seconds
    }

    fn publish_state(&mut self, state: f32) {
        self.seconds = state;
    }

    fn unit_of_measurement(&self) -> &str {
        "s"
    }
}

/// Publishes seconds since boot every `update_interval_ms`.
pub struct UptimeSensor {
    update_interval_ms: u32,
    entity: Option<EntityId<SensorDomain>>,
    last_publish_ms: Option<u32>,
}

impl UptimeSensor {
    pub fn new(update_interval_ms: u32) -> Self {
        Self {
            update_interval_ms,
            entity: None,
            last_publish_ms: None,
        }
    }
}

impl Component for UptimeSensor {
    fn name(&self) -> &str {
        "uptime"
    }

    fn setup(&mut self, ctx: &mut Context<'_>) -> Result<(), CadenceError> {
        let reading = Box::new(UptimeReading {
            info: EntityInfo::new("Uptime"),
            seconds: f32::NAN,
        });
        self.entity = Some(ctx.entities().register::<SensorDomain>(reading)?);
        Ok(())
    }

    fn on_loop(&mut self, ctx: &mut Context<'_>) -> Result<(), CadenceError> {
        let now = ctx.millis();
        if let Some(last) = self.last_publish_ms
            && now.wrapping_sub(last) < self.update_interval_ms
        {
            return Ok(());
        }
        let Some(id) = self.entity else {
            return Err(CadenceError::fault("uptime", "sensor entity missing"));
        };
        let seconds = now as f32 / 1000.0;
        if let Some(sensor) = ctx.entities().get_mut(id) {
            sensor.publish_state(seconds);
        }
        self.last_publish_ms = Some(now);
        debug!(seconds, "uptime published");
        Ok(())
    }

    fn dump_config(&self) {
        info!(update_interval_ms = self.update_interval_ms, "  uptime sensor");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Version
// ─────────────────────────────────────────────────────────────────────────────

struct VersionText {
    info: EntityInfo,
    value: String,
}

impl Entity for VersionText {
    fn info(&self) -> &EntityInfo {
        &self.info
    }
}

impl TextSensor for VersionText {
    fn state(&self) -> &str {
        &self.value
    }

    fn publish_state(&mut self, state: String) {
        self.value = state;
    }
}

/// Publishes the firmware version once during setup.  Never loops.
pub struct VersionTextSensor {
    version: String,
}

impl VersionTextSensor {
    /// `version` is published as-is, e.g. `"0.1.0 Jan 01 2026, 12:00:00"`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl Component for VersionTextSensor {
    fn name(&self) -> &str {
        "version"
    }

    fn setup(&mut self, ctx: &mut Context<'_>) -> Result<(), CadenceError> {
        let text = Box::new(VersionText {
            info: EntityInfo::new("Version"),
            value: String::new(),
        });
        let id = ctx.entities().register::<TextSensorDomain>(text)?;
        if let Some(sensor) = ctx.entities().get_mut(id) {
            sensor.publish_state(self.version.clone());
        }
        Ok(())
    }

    fn needs_loop(&self) -> bool {
        false
    }

    fn dump_config(&self) {
        info!(version = %self.version, "  version text sensor");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Status
// ─────────────────────────────────────────────────────────────────────────────

/// Logs whenever the device-wide app state changes.
#[derive(Default)]
pub struct StatusReporter {
    last: Rc<Cell<AppState>>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the last state this reporter observed.
    pub fn last_seen(&self) -> Rc<Cell<AppState>> {
        self.last.clone()
    }
}

impl Component for StatusReporter {
    fn name(&self) -> &str {
        "status"
    }

    fn on_loop(&mut self, ctx: &mut Context<'_>) -> Result<(), CadenceError> {
        let current = ctx.app_state();
        if current == self.last.get() {
            return Ok(());
        }
        if current.is_clear() {
            info!("device status back to ok");
        } else {
            warn!(
                app_state = current.bits(),
                warning = current.contains(AppState::WARNING),
                error = current.contains(AppState::ERROR),
                "device status changed"
            );
        }
        self.last.set(current);
        Ok(())
    }

    fn priority_hint(&self) -> f32 {
        -100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_hal::sim::SimBoard;
    use cadence_runtime::{Application, NullScheduler};

    fn app() -> (Application, cadence_hal::sim::SimHandle) {
        let (board, sim) = SimBoard::builder().build();
        (Application::new(board, Box::new(NullScheduler)), sim)
    }

    #[test]
    fn uptime_publishes_on_its_interval() {
        let (mut app, sim) = app();
        app.register_component(UptimeSensor::new(1000)).unwrap();
        app.setup();
        let key = EntityInfo::new("Uptime").key();

        sim.advance(2500);
        app.tick();
        let uptime = app.get_sensor_by_key(key, false).unwrap();
        assert!((uptime.state() - 2.5).abs() < f32::EPSILON);
        assert_eq!(uptime.unit_of_measurement(), "s");

        // 16 ms idle later: too early for another publish.
        app.tick();
        let uptime = app.get_sensor_by_key(key, false).unwrap();
        assert!((uptime.state() - 2.5).abs() < f32::EPSILON);
    }

    #[test]
    fn version_is_published_and_dormant() {
        let (mut app, _sim) = app();
        let id = app
            .register_component(VersionTextSensor::new("0.1.0"))
            .unwrap();
        app.setup();

        assert!(app.components().looping().is_empty());
        assert!(app.components().get(id).is_some());
        let key = EntityInfo::new("Version").key();
        let version = app.get_text_sensor_by_key(key, false).unwrap();
        assert_eq!(version.state(), "0.1.0");
    }

    struct Faulty;

    impl Component for Faulty {
        fn name(&self) -> &str {
            "faulty"
        }

        fn setup(&mut self, _ctx: &mut Context<'_>) -> Result<(), CadenceError> {
            Err(CadenceError::fault("faulty", "sensor not found"))
        }
    }

    #[test]
    fn status_reporter_follows_app_state_transitions() {
        let (mut app, _sim) = app();
        app.register_component(Faulty).unwrap();
        let reporter = StatusReporter::new();
        let seen = reporter.last_seen();
        app.register_component(reporter).unwrap();
        app.setup();
        assert!(seen.get().is_clear());

        app.tick();
        assert!(seen.get().contains(AppState::ERROR));
        assert!(!seen.get().contains(AppState::WARNING));

        app.reset_app_state();
        app.tick();
        assert!(seen.get().is_clear());
    }
}
