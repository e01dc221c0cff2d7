//! Built-in entity domains.
//!
//! Each domain has an object trait (what a registry stores, e.g.
//! `dyn Sensor`) and a zero-sized tag implementing
//! [`Domain`][crate::entity::Domain].  Tags, and the registries behind them,
//! exist only when the matching Cargo feature is enabled; all ten are on by
//! default.
//!
//! | Feature | Tag | Object |
//! |---|---|---|
//! | `binary_sensor` | [`BinarySensorDomain`] | [`BinarySensor`] |
//! | `sensor` | [`SensorDomain`] | [`Sensor`] |
//! | `switch` | [`SwitchDomain`] | [`Switch`] |
//! | `text_sensor` | [`TextSensorDomain`] | [`TextSensor`] |
//! | `fan` | [`FanDomain`] | [`Fan`] |
//! | `cover` | [`CoverDomain`] | [`Cover`] |
//! | `climate` | [`ClimateDomain`] | [`Climate`] |
//! | `light` | [`LightDomain`] | [`Light`] |
//! | `number` | [`NumberDomain`] | [`Number`] |
//! | `select` | [`SelectDomain`] | [`Select`] |

use cadence_types::CadenceError;
use tracing::warn;

use crate::entity::{Domain, Entity, EntityId, EntityRegistry};

// ─────────────────────────────────────────────────────────────────────────────
// Object traits
// ─────────────────────────────────────────────────────────────────────────────

/// Two-state reading (motion, door contact, …).  `None` until first publish.
pub trait BinarySensor: Entity {
    fn state(&self) -> Option<bool>;
    fn publish_state(&mut self, state: bool);
}

/// Numeric reading.  `NaN` until first publish.
pub trait Sensor: Entity {
    fn state(&self) -> f32;
    fn publish_state(&mut self, state: f32);

    fn unit_of_measurement(&self) -> &str {
        ""
    }
}

/// Controllable on/off output.
pub trait Switch: Entity {
    fn state(&self) -> bool;
    fn write_state(&mut self, state: bool);
}

/// Free-form text reading.
pub trait TextSensor: Entity {
    fn state(&self) -> &str;
    fn publish_state(&mut self, state: String);
}

pub trait Fan: Entity {
    fn is_on(&self) -> bool;

    /// Speed level, if the fan supports speeds.
    fn speed(&self) -> Option<u8> {
        None
    }
}

pub trait Cover: Entity {
    /// Position in `0.0` (closed) ..= `1.0` (open).
    fn position(&self) -> f32;
}

pub trait Climate: Entity {
    fn current_temperature(&self) -> f32;
    fn target_temperature(&self) -> f32;
}

pub trait Light: Entity {
    fn is_on(&self) -> bool;

    /// Brightness in `0.0 ..= 1.0`.
    fn brightness(&self) -> f32;
}

pub trait Number: Entity {
    fn state(&self) -> f32;
}

pub trait Select: Entity {
    fn state(&self) -> &str;
    fn options(&self) -> &[String];
}

// ─────────────────────────────────────────────────────────────────────────────
// Tags and the registry bundle
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! entity_domains {
    ($( $feature:literal => $field:ident : $tag:ident => $object:ident ),* $(,)?) => {
        $(
            #[cfg(feature = $feature)]
            #[doc = concat!("Domain tag for [`", stringify!($object), "`] entities.")]
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $tag;

            #[cfg(feature = $feature)]
            impl Domain for $tag {
                const NAME: &'static str = $feature;
                type Object = dyn $object;

                fn registry(registries: &EntityRegistries) -> &EntityRegistry<Self> {
                    &registries.$field
                }

                fn registry_mut(registries: &mut EntityRegistries) -> &mut EntityRegistry<Self> {
                    &mut registries.$field
                }
            }
        )*

        /// One [`EntityRegistry`] per enabled domain.
        ///
        /// Accepts registrations until [`seal`][EntityRegistries::seal] is
        /// called at the end of setup.
        #[derive(Default)]
        pub struct EntityRegistries {
            sealed: bool,
            $(
                #[cfg(feature = $feature)]
                $field: EntityRegistry<$tag>,
            )*
        }

        impl EntityRegistries {
            /// Total entities across every domain.
            pub fn len(&self) -> usize {
                0 $( + {
                    #[cfg(feature = $feature)]
                    let n = self.$field.len();
                    #[cfg(not(feature = $feature))]
                    let n = 0;
                    n
                } )*
            }
        }
    };
}

entity_domains! {
    "binary_sensor" => binary_sensors: BinarySensorDomain => BinarySensor,
    "sensor" => sensors: SensorDomain => Sensor,
    "switch" => switches: SwitchDomain => Switch,
    "text_sensor" => text_sensors: TextSensorDomain => TextSensor,
    "fan" => fans: FanDomain => Fan,
    "cover" => covers: CoverDomain => Cover,
    "climate" => climates: ClimateDomain => Climate,
    "light" => lights: LightDomain => Light,
    "number" => numbers: NumberDomain => Number,
    "select" => selects: SelectDomain => Select,
}

impl EntityRegistries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entity` to domain `D`.
    ///
    /// # Errors
    ///
    /// Returns [`CadenceError::RegistrationClosed`] once the registries are
    /// sealed.
    pub fn register<D: Domain>(
        &mut self,
        entity: Box<D::Object>,
    ) -> Result<EntityId<D>, CadenceError> {
        if self.sealed {
            warn!(domain = D::NAME, entity = entity.name(), "entity registered after setup; rejected");
            return Err(CadenceError::RegistrationClosed {
                what: format!("{} entity '{}'", D::NAME, entity.name()),
            });
        }
        Ok(D::registry_mut(self).push(entity))
    }

    /// Domain `D`'s registry, read-only.
    pub fn registry<D: Domain>(&self) -> &EntityRegistry<D> {
        D::registry(self)
    }

    pub fn all<D: Domain>(&self) -> &[Box<D::Object>] {
        D::registry(self).all()
    }

    pub fn get<D: Domain>(&self, id: EntityId<D>) -> Option<&D::Object> {
        D::registry(self).get(id)
    }

    pub fn get_mut<D: Domain>(&mut self, id: EntityId<D>) -> Option<&mut D::Object> {
        D::registry_mut(self).get_mut(id)
    }

    pub fn get_by_key<D: Domain>(&self, key: u32, include_internal: bool) -> Option<&D::Object> {
        D::registry(self).get_by_key(key, include_internal)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close registration.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

#[cfg(all(test, feature = "sensor", feature = "switch"))]
mod tests {
    use super::*;
    use crate::entity::EntityInfo;

    struct Relay {
        info: EntityInfo,
        on: bool,
    }

    impl Entity for Relay {
        fn info(&self) -> &EntityInfo {
            &self.info
        }
    }

    impl Switch for Relay {
        fn state(&self) -> bool {
            self.on
        }

        fn write_state(&mut self, state: bool) {
            self.on = state;
        }
    }

    struct Thermometer {
        info: EntityInfo,
    }

    impl Entity for Thermometer {
        fn info(&self) -> &EntityInfo {
            &self.info
        }
    }

    impl Sensor for Thermometer {
        fn state(&self) -> f32 {
            f32::NAN
        }

        fn publish_state(&mut self, _state: f32) {}

        fn unit_of_measurement(&self) -> &str {
            "°C"
        }
    }

    fn relay(name: &str) -> Box<dyn Switch> {
        Box::new(Relay {
            info: EntityInfo::new(name),
            on: false,
        })
    }

    #[test]
    fn domains_are_independent() {
        let mut regs = EntityRegistries::new();
        regs.register::<SwitchDomain>(relay("pump")).unwrap();
        regs.register::<SensorDomain>(Box::new(Thermometer {
            info: EntityInfo::new("pump"),
        }))
        .unwrap();
        assert_eq!(regs.all::<SwitchDomain>().len(), 1);
        assert_eq!(regs.all::<SensorDomain>().len(), 1);
        assert_eq!(regs.len(), 2);

        let key = EntityInfo::new("pump").key();
        let sensor = regs.get_by_key::<SensorDomain>(key, false).unwrap();
        assert_eq!(sensor.unit_of_measurement(), "°C");
        assert!(regs.get_by_key::<SwitchDomain>(key, false).is_some());
    }

    #[test]
    fn typed_handles_write_through() {
        let mut regs = EntityRegistries::new();
        let id = regs.register::<SwitchDomain>(relay("fan")).unwrap();
        regs.get_mut(id).unwrap().write_state(true);
        assert!(regs.get(id).unwrap().state());
    }

    #[test]
    fn sealed_registries_reject_registration() {
        let mut regs = EntityRegistries::new();
        regs.register::<SwitchDomain>(relay("a")).unwrap();
        regs.seal();
        let err = regs.register::<SwitchDomain>(relay("b")).unwrap_err();
        assert!(matches!(err, CadenceError::RegistrationClosed { .. }));
        assert_eq!(regs.all::<SwitchDomain>().len(), 1);
    }

    #[test]
    fn empty_registries() {
        let regs = EntityRegistries::new();
        assert!(regs.is_empty());
        assert!(!regs.is_sealed());
        assert!(regs.registry::<SensorDomain>().is_empty());
    }
}
