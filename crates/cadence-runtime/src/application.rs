//! [`Application`] – the device's single runtime context.
//!
//! The composition root constructs exactly one `Application`, registers
//! components and entities on it, then drives it:
//!
//! ```text
//! pre_setup(name, compilation_time, mac_suffix)   identity + preferences
//! register_component(..) / register_sensor(..)    build-time wiring
//! setup()                                         once
//! loop { tick() }                                 forever
//! ```
//!
//! Each [`tick`][Application::tick]:
//!
//! 1. feeds the watchdog,
//! 2. dispatches due scheduler callbacks,
//! 3. runs the looping subset in cached order,
//! 4. runs a pending config dump (edge-triggered),
//! 5. idles for the rest of the loop interval via the [`LoopThrottle`].
//!
//! Component failures never abort a call; they show up in
//! [`get_app_state`][Application::get_app_state].  Only a reboot (requested
//! by a component or called directly) halts the application.
//!
//! # Example
//!
//! ```rust
//! use cadence_hal::sim::SimBoard;
//! use cadence_kernel::Component;
//! use cadence_runtime::{Application, NullScheduler};
//!
//! struct Blink;
//!
//! impl Component for Blink {
//!     fn name(&self) -> &str {
//!         "blink"
//!     }
//! }
//!
//! let (board, _sim) = SimBoard::builder().build();
//! let mut app = Application::new(board, Box::new(NullScheduler));
//! app.pre_setup("device", "Jan 01 2026, 00:00:00", false);
//! app.register_component(Blink).unwrap();
//! app.setup();
//! app.tick();
//! assert_eq!(app.get_name(), "device");
//! assert_eq!(app.get_app_state(), 0);
//! ```

use std::cell::OnceCell;

use cadence_hal::Board;
use cadence_kernel::{
    Component, ComponentId, ComponentRegistry, EntityId, EntityRegistries, RebootKind, Services,
};
use cadence_types::{AppState, CadenceError};
use tracing::{debug, error, info, warn};

use crate::identity::Identity;
use crate::scheduler::Scheduler;
use crate::throttle::{HighFrequencyLoop, HighFrequencyLoopRequester, LoopThrottle};

/// The runtime context: identity, registries, timing and safety state.
pub struct Application {
    identity: OnceCell<Identity>,
    board: Board,
    scheduler: Box<dyn Scheduler>,
    components: ComponentRegistry,
    entities: EntityRegistries,
    app_state: AppState,
    throttle: LoopThrottle,
    high_frequency: HighFrequencyLoop,
    preferences_begun: bool,
    dump_config_pending: bool,
    reboot: Option<RebootKind>,
    halted: bool,
    ticks: u64,
}

impl Application {
    pub fn new(board: Board, scheduler: Box<dyn Scheduler>) -> Self {
        Self {
            identity: OnceCell::new(),
            board,
            scheduler,
            components: ComponentRegistry::new(),
            entities: EntityRegistries::new(),
            app_state: AppState::new(),
            throttle: LoopThrottle::default(),
            high_frequency: HighFrequencyLoop::new(),
            preferences_begun: false,
            dump_config_pending: false,
            reboot: None,
            halted: false,
            ticks: 0,
        }
    }

    // ── Identity ─────────────────────────────────────────────────────────────

    /// Form the device identity and begin the preferences store.
    ///
    /// The identity is fixed by the first call; later calls, and any call
    /// once setup has started, are logged and ignored.  A preferences
    /// failure is logged and raises the `WARNING` bit.
    pub fn pre_setup(&mut self, name: &str, compilation_time: &str, name_add_mac_suffix: bool) {
        if let Some(identity) = self.identity.get() {
            warn!(name = identity.name(), "identity already formed; ignoring pre_setup");
            return;
        }
        if self.components.is_sealed() {
            warn!(name, "pre_setup after setup; ignoring");
            return;
        }
        let board = &self.board;
        let identity = self.identity.get_or_init(|| {
            Identity::form(name, compilation_time, name_add_mac_suffix, || {
                board.mac_address()
            })
        });
        info!(name = identity.name(), compilation_time, "identity formed");

        self.begin_preferences();
    }

    /// Open the preferences store.  Only the first call reaches the board.
    fn begin_preferences(&mut self) {
        if std::mem::replace(&mut self.preferences_begun, true) {
            return;
        }
        if let Err(e) = self.board.begin_preferences() {
            error!(error = %e, "preferences store failed to begin");
            self.app_state.insert(AppState::WARNING);
        }
    }

    /// Device name, empty before `pre_setup`.
    pub fn get_name(&self) -> &str {
        self.identity.get().map_or("", Identity::name)
    }

    pub fn is_name_add_mac_suffix_enabled(&self) -> bool {
        self.identity
            .get()
            .is_some_and(Identity::name_add_mac_suffix)
    }

    pub fn get_compilation_time(&self) -> &str {
        self.identity.get().map_or("", Identity::compilation_time)
    }

    // ── Registration ─────────────────────────────────────────────────────────

    /// Register a component.  The application owns it from now on; the
    /// returned handle stays valid for the process lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`CadenceError::RegistrationClosed`] once setup has started.
    pub fn register_component<C: Component + 'static>(
        &mut self,
        component: C,
    ) -> Result<ComponentId, CadenceError> {
        self.components.register(Box::new(component))
    }

    /// Read-only view of the component registry.
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Read-only view of every entity registry.
    pub fn entities(&self) -> &EntityRegistries {
        &self.entities
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Set up every registered component, classify the looping subset and
    /// close entity registration.  The preferences store is open before the
    /// first setup hook runs, even without a prior `pre_setup`.
    pub fn setup(&mut self) {
        if self.identity.get().is_none() && !self.components.is_sealed() {
            warn!("setup called before pre_setup; device has no name");
            self.begin_preferences();
        }
        let mut services = Services {
            board: &mut self.board,
            entities: &mut self.entities,
            app_state: &mut self.app_state,
            reboot: &mut self.reboot,
        };
        self.components.setup(&mut services);
        self.entities.seal();
        info!(
            components = self.components.len(),
            looping = self.components.looping().len(),
            entities = self.entities.len(),
            app_state = self.app_state.bits(),
            "setup complete"
        );
        self.handle_reboot_request();
    }

    /// One iteration of the periodic execution cycle.
    pub fn tick(&mut self) {
        if self.halted {
            return;
        }
        if !self.components.is_sealed() {
            warn!("tick before setup; no component will run");
        }
        let start = self.board.millis();

        self.feed_wdt();
        self.scheduler.call(start);

        let mut services = Services {
            board: &mut self.board,
            entities: &mut self.entities,
            app_state: &mut self.app_state,
            reboot: &mut self.reboot,
        };
        self.components.run_loop(&mut services);
        if self.handle_reboot_request() {
            return;
        }

        if std::mem::take(&mut self.dump_config_pending) {
            self.dump_config();
        }

        let elapsed = self.board.millis().wrapping_sub(start);
        let idle = self
            .throttle
            .idle_for(elapsed, self.high_frequency.is_high_frequency());
        if idle > 0 {
            self.board.delay(idle);
        }
        self.ticks += 1;
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// `true` once a reboot was carried out; `tick` does nothing afterwards.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    // ── Timing ───────────────────────────────────────────────────────────────

    /// Target tick interval in milliseconds (default 16).
    pub fn set_loop_interval(&mut self, loop_interval_ms: u32) {
        self.throttle.set_interval_ms(loop_interval_ms);
    }

    pub fn get_loop_interval(&self) -> u32 {
        self.throttle.interval_ms()
    }

    /// The shared high-frequency counter.
    pub fn high_frequency(&self) -> &HighFrequencyLoop {
        &self.high_frequency
    }

    /// A requester to hand to a component that sometimes needs fast ticks.
    pub fn high_frequency_requester(&self) -> HighFrequencyLoopRequester {
        self.high_frequency.requester()
    }

    /// Milliseconds since boot.
    pub fn millis(&self) -> u32 {
        self.board.millis()
    }

    pub fn scheduler_mut(&mut self) -> &mut dyn Scheduler {
        self.scheduler.as_mut()
    }

    // ── Diagnostics ──────────────────────────────────────────────────────────

    /// Dump the configuration at the end of the next tick.
    pub fn schedule_dump_config(&mut self) {
        self.dump_config_pending = true;
    }

    fn dump_config(&self) {
        info!(
            name = self.get_name(),
            compilation_time = self.get_compilation_time(),
            loop_interval_ms = self.throttle.interval_ms(),
            app_state = self.app_state.bits(),
            components = self.components.len(),
            looping = self.components.looping().len(),
            entities = self.entities.len(),
            "device configuration"
        );
        self.components.dump_config();
    }

    /// Aggregate failure bitmask.
    pub fn get_app_state(&self) -> u32 {
        self.app_state.bits()
    }

    pub fn app_state(&self) -> AppState {
        self.app_state
    }

    /// The only way to clear the app-state bitmask.
    pub fn reset_app_state(&mut self) {
        info!(previous = self.app_state.bits(), "app state reset");
        self.app_state.clear();
    }

    // ── Safety ───────────────────────────────────────────────────────────────

    /// Acknowledge the hardware watchdog (rate limited).
    pub fn feed_wdt(&mut self) {
        self.board.feed_wdt();
    }

    /// Restart now, without notifying components.
    pub fn reboot(&mut self) {
        info!("forcing a reboot");
        self.halted = true;
        self.board.restart();
    }

    /// Run both shutdown passes, then restart.
    pub fn safe_reboot(&mut self) {
        info!("rebooting safely");
        self.run_safe_shutdown_hooks();
        self.halted = true;
        self.board.restart();
    }

    /// Every component's `on_safe_shutdown`, then every `on_shutdown`.
    pub fn run_safe_shutdown_hooks(&mut self) {
        self.components.run_safe_shutdown_hooks();
    }

    /// Carry out a reboot a component requested.  Returns `true` if one ran.
    fn handle_reboot_request(&mut self) -> bool {
        match self.reboot.take() {
            Some(RebootKind::Immediate) => {
                debug!("component requested immediate reboot");
                self.reboot();
                true
            }
            Some(RebootKind::Safe) => {
                debug!("component requested safe reboot");
                self.safe_reboot();
                true
            }
            None => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-domain registration and lookup
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! domain_accessors {
    ($( $feature:literal => $tag:ident : $object:ident { $register:ident, $all:ident, $by_key:ident } ),* $(,)?) => {
        impl Application {
            $(
                #[cfg(feature = $feature)]
                #[doc = concat!("Register a ", $feature, " entity.")]
                ///
                /// # Errors
                ///
                /// Returns [`CadenceError::RegistrationClosed`] after setup.
                pub fn $register(
                    &mut self,
                    entity: Box<dyn cadence_kernel::domains::$object>,
                ) -> Result<EntityId<cadence_kernel::domains::$tag>, CadenceError> {
                    self.entities.register::<cadence_kernel::domains::$tag>(entity)
                }

                #[cfg(feature = $feature)]
                #[doc = concat!("Every ", $feature, " entity, in registration order.")]
                pub fn $all(&self) -> &[Box<dyn cadence_kernel::domains::$object>] {
                    self.entities.all::<cadence_kernel::domains::$tag>()
                }

                #[cfg(feature = $feature)]
                #[doc = concat!("First ", $feature, " entity with `key`; internal ones only if `include_internal`.")]
                pub fn $by_key(
                    &self,
                    key: u32,
                    include_internal: bool,
                ) -> Option<&dyn cadence_kernel::domains::$object> {
                    self.entities
                        .get_by_key::<cadence_kernel::domains::$tag>(key, include_internal)
                }
            )*
        }
    };
}

domain_accessors! {
    "binary_sensor" => BinarySensorDomain: BinarySensor {
        register_binary_sensor, get_binary_sensors, get_binary_sensor_by_key
    },
    "sensor" => SensorDomain: Sensor { register_sensor, get_sensors, get_sensor_by_key },
    "switch" => SwitchDomain: Switch { register_switch, get_switches, get_switch_by_key },
    "text_sensor" => TextSensorDomain: TextSensor {
        register_text_sensor, get_text_sensors, get_text_sensor_by_key
    },
    "fan" => FanDomain: Fan { register_fan, get_fans, get_fan_by_key },
    "cover" => CoverDomain: Cover { register_cover, get_covers, get_cover_by_key },
    "climate" => ClimateDomain: Climate { register_climate, get_climates, get_climate_by_key },
    "light" => LightDomain: Light { register_light, get_lights, get_light_by_key },
    "number" => NumberDomain: Number { register_number, get_numbers, get_number_by_key },
    "select" => SelectDomain: Select { register_select, get_selects, get_select_by_key },
}
