//! [`ComponentRegistry`] – ordered component arena and lifecycle driver.
//!
//! The registry owns every component for the lifetime of the process and
//! hands out [`ComponentId`] handles in registration order.  It never drops
//! or reorders a component.
//!
//! # Phases
//!
//! 1. **Registration** – [`register`][ComponentRegistry::register] appends.
//!    Closed as soon as setup starts.
//! 2. **Setup** – [`setup`][ComponentRegistry::setup] calls every setup hook
//!    in registration order, feeding the watchdog before each one.  A failing
//!    hook marks that component failed and the traversal continues.  Then
//!    the looping subset is classified, once.
//! 3. **Ticks** – [`run_loop`][ComponentRegistry::run_loop] calls the
//!    periodic hook of every active, non-failed component in cached order.
//!    Hooks are cooperative: nothing interrupts a slow one.
//! 4. **Shutdown** – [`run_safe_shutdown_hooks`][ComponentRegistry::run_safe_shutdown_hooks]
//!    runs `on_safe_shutdown` on every component, and only then
//!    `on_shutdown` on every component.

use cadence_hal::Board;
use cadence_types::{AppState, CadenceError};
use tracing::{debug, error, info, warn};

use crate::component::{Component, ComponentId, ComponentStatus, Context, LifecycleState, RebootKind};
use crate::domains::EntityRegistries;

/// The pieces of the application a traversal needs, borrowed for its
/// duration.
pub struct Services<'a> {
    pub board: &'a mut Board,
    pub entities: &'a mut EntityRegistries,
    pub app_state: &'a mut AppState,
    pub reboot: &'a mut Option<RebootKind>,
}

struct Slot {
    component: Box<dyn Component>,
    state: LifecycleState,
    status: ComponentStatus,
}

impl Slot {
    /// Run one hook with a fresh context, then fold the outcome into the
    /// component's status and the app-state bitmask.
    fn run_hook<F>(&mut self, services: &mut Services<'_>, phase: &'static str, hook: F)
    where
        F: FnOnce(&mut dyn Component, &mut Context<'_>) -> Result<(), CadenceError>,
    {
        let Slot {
            component, status, ..
        } = self;
        let result = {
            let mut ctx = Context::new(
                &mut *services.board,
                &mut *services.entities,
                status,
                &mut *services.reboot,
            )
            .with_app_state(*services.app_state);
            hook(component.as_mut(), &mut ctx)
        };
        if let Err(e) = result {
            error!(component = component.name(), phase, error = %e, "component failed");
            self.status.failed = true;
        } else if self.status.failed {
            error!(component = self.component.name(), phase, "component marked itself failed");
        }
        services.app_state.insert(self.status.app_state_bits());
    }
}

/// Registration-ordered component arena.
#[derive(Default)]
pub struct ComponentRegistry {
    slots: Vec<Slot>,
    looping: Option<Vec<ComponentId>>,
    sealed: bool,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `component`.
    ///
    /// # Errors
    ///
    /// Returns [`CadenceError::RegistrationClosed`] once setup has started.
    pub fn register(&mut self, component: Box<dyn Component>) -> Result<ComponentId, CadenceError> {
        if self.sealed {
            warn!(component = component.name(), "component registered after setup; rejected");
            return Err(CadenceError::RegistrationClosed {
                what: format!("component '{}'", component.name()),
            });
        }
        let id = ComponentId(self.slots.len());
        debug!(component = component.name(), index = id.0, "component registered");
        self.slots.push(Slot {
            component,
            state: LifecycleState::Registered,
            status: ComponentStatus::default(),
        });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Every handle, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + use<> {
        (0..self.slots.len()).map(ComponentId)
    }

    pub fn get(&self, id: ComponentId) -> Option<&dyn Component> {
        self.slots.get(id.0).map(|slot| slot.component.as_ref())
    }

    pub fn state(&self, id: ComponentId) -> Option<LifecycleState> {
        self.slots.get(id.0).map(|slot| slot.state)
    }

    pub fn status(&self, id: ComponentId) -> Option<ComponentStatus> {
        self.slots.get(id.0).map(|slot| slot.status)
    }

    /// `true` once setup has started; registration is closed from then on.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// The cached looping subset.  Empty until setup has completed.
    pub fn looping(&self) -> &[ComponentId] {
        self.looping.as_deref().unwrap_or(&[])
    }

    /// Run every setup hook in registration order, then classify the
    /// looping subset.  Only the first call has any effect.
    ///
    /// An immediate reboot requested from a setup hook stops the traversal;
    /// the caller acts on it.
    pub fn setup(&mut self, services: &mut Services<'_>) {
        if self.sealed {
            warn!("setup already ran; ignoring repeated call");
            return;
        }
        self.sealed = true;
        info!(components = self.slots.len(), "running component setup");

        for slot in &mut self.slots {
            services.board.feed_wdt();
            debug!(component = slot.component.name(), "setup");
            slot.run_hook(services, "setup", |component, ctx| component.setup(ctx));
            slot.state = LifecycleState::Initialized;
            if *services.reboot == Some(RebootKind::Immediate) {
                warn!(component = slot.component.name(), "reboot requested during setup");
                break;
            }
        }

        self.calculate_looping_components();
    }

    /// Classify every initialized component into the looping subset or
    /// dormant.  Runs exactly once.  Components whose setup never ran stay
    /// `Registered`.
    fn calculate_looping_components(&mut self) {
        if self.looping.is_some() {
            return;
        }
        let mut looping = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.state != LifecycleState::Initialized {
                continue;
            }
            if slot.component.needs_loop() {
                slot.state = LifecycleState::Active;
                looping.push(ComponentId(index));
            } else {
                slot.state = LifecycleState::Dormant;
            }
        }
        info!(
            components = self.slots.len(),
            looping = looping.len(),
            "looping subset classified"
        );
        self.looping = Some(looping);
    }

    /// Call the periodic hook of every active, non-failed component in cached
    /// order.  A reboot request ends the pass after the requesting hook.
    pub fn run_loop(&mut self, services: &mut Services<'_>) {
        let Self { slots, looping, .. } = self;
        let Some(looping) = looping.as_ref() else {
            return;
        };
        for id in looping {
            let slot = &mut slots[id.0];
            if slot.state != LifecycleState::Active || slot.status.failed {
                continue;
            }
            slot.run_hook(services, "loop", |component, ctx| component.on_loop(ctx));
            if services.reboot.is_some() {
                break;
            }
        }
    }

    /// Two strictly separated passes: every `on_safe_shutdown`, then every
    /// `on_shutdown`.
    pub fn run_safe_shutdown_hooks(&mut self) {
        info!(components = self.slots.len(), "running safe shutdown hooks");
        for slot in &mut self.slots {
            slot.state = LifecycleState::Preparing;
            slot.component.on_safe_shutdown();
        }
        for slot in &mut self.slots {
            slot.state = LifecycleState::Finalized;
            slot.component.on_shutdown();
        }
    }

    /// Log every component's configuration in registration order.
    pub fn dump_config(&self) {
        for slot in &self.slots {
            info!(
                component = slot.component.name(),
                state = ?slot.state,
                failed = slot.status.failed,
                warning = slot.status.warning,
                priority = slot.component.priority_hint(),
                "component"
            );
            slot.component.dump_config();
        }
    }
}
