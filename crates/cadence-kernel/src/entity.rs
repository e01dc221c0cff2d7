//! Entities and the generic, append-only [`EntityRegistry<D>`].
//!
//! An entity is one observable or controllable point a component exposes to
//! the outside world (a temperature reading, a relay, a light).  Each entity
//! carries an [`EntityInfo`]: its display name, the sanitised object id and
//! the 32-bit key derived from it.
//!
//! Registries are per domain.  The domain is a zero-sized tag type
//! implementing [`Domain`]; see [`domains`][crate::domains] for the ten
//! built-in ones.
//!
//! # Keyed lookup
//!
//! [`EntityRegistry::get_by_key`] scans in registration order and returns
//! the first entity whose key matches, skipping internal entities unless
//! asked not to.  Keys may collide across domains, and within a domain the
//! earlier registration always wins.

use std::fmt;
use std::marker::PhantomData;

use cadence_types::{fnv1_hash, sanitize_object_id};

use crate::domains::EntityRegistries;

/// Identity shared by every entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInfo {
    name: String,
    object_id: String,
    key: u32,
    internal: bool,
}

impl EntityInfo {
    /// Derive object id and key from a display name.
    ///
    /// ```
    /// use cadence_kernel::EntityInfo;
    /// use cadence_types::fnv1_hash;
    ///
    /// let info = EntityInfo::new("Outside Temperature");
    /// assert_eq!(info.object_id(), "outside_temperature");
    /// assert_eq!(info.key(), fnv1_hash("outside_temperature"));
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let object_id = sanitize_object_id(&name);
        let key = fnv1_hash(&object_id);
        Self {
            name,
            object_id,
            key,
            internal: false,
        }
    }

    /// Override the derived object id (the key follows it).
    pub fn with_object_id(mut self, object_id: impl Into<String>) -> Self {
        self.object_id = object_id.into();
        self.key = fnv1_hash(&self.object_id);
        self
    }

    /// Hide the entity from external lookups.
    pub fn internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    pub fn key(&self) -> u32 {
        self.key
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }
}

/// An externally visible point exposed by a component.
pub trait Entity {
    fn info(&self) -> &EntityInfo;

    fn name(&self) -> &str {
        self.info().name()
    }

    fn key(&self) -> u32 {
        self.info().key()
    }

    fn is_internal(&self) -> bool {
        self.info().is_internal()
    }
}

/// A domain tag: names the domain and the trait object its registry holds.
pub trait Domain: Sized + 'static {
    /// Human-readable domain name (`"sensor"`, `"light"`, …).
    const NAME: &'static str;

    /// The stored object type, e.g. `dyn Sensor`.
    type Object: ?Sized + Entity + 'static;

    fn registry(registries: &EntityRegistries) -> &EntityRegistry<Self>;

    fn registry_mut(registries: &mut EntityRegistries) -> &mut EntityRegistry<Self>;
}

/// Stable handle to an entity within its domain registry.
pub struct EntityId<D> {
    index: usize,
    _domain: PhantomData<fn() -> D>,
}

impl<D> EntityId<D> {
    pub fn index(self) -> usize {
        self.index
    }
}

impl<D> Clone for EntityId<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for EntityId<D> {}

impl<D> PartialEq for EntityId<D> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<D> Eq for EntityId<D> {}

impl<D: Domain> fmt::Debug for EntityId<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId<{}>({})", D::NAME, self.index)
    }
}

/// Append-only, registration-ordered list of one domain's entities.
pub struct EntityRegistry<D: Domain> {
    entries: Vec<Box<D::Object>>,
}

impl<D: Domain> Default for EntityRegistry<D> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<D: Domain> EntityRegistry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entity`, returning its handle.
    pub fn push(&mut self, entity: Box<D::Object>) -> EntityId<D> {
        let index = self.entries.len();
        self.entries.push(entity);
        EntityId {
            index,
            _domain: PhantomData,
        }
    }

    /// Read-only view in registration order.
    pub fn all(&self) -> &[Box<D::Object>] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &D::Object> {
        self.entries.iter().map(|entry| &**entry)
    }

    pub fn get(&self, id: EntityId<D>) -> Option<&D::Object> {
        self.entries.get(id.index).map(|entry| &**entry)
    }

    pub fn get_mut(&mut self, id: EntityId<D>) -> Option<&mut D::Object> {
        self.entries.get_mut(id.index).map(|entry| &mut **entry)
    }

    /// First entity with `key`, skipping internal ones unless
    /// `include_internal` is set.
    pub fn get_by_key(&self, key: u32, include_internal: bool) -> Option<&D::Object> {
        self.iter()
            .find(|entity| entity.key() == key && (include_internal || !entity.is_internal()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(all(test, feature = "sensor"))]
mod tests {
    use super::*;
    use crate::domains::{Sensor, SensorDomain};

    struct TestSensor {
        info: EntityInfo,
        state: f32,
    }

    impl TestSensor {
        fn boxed(info: EntityInfo, state: f32) -> Box<dyn Sensor> {
            Box::new(Self { info, state })
        }
    }

    impl Entity for TestSensor {
        fn info(&self) -> &EntityInfo {
            &self.info
        }
    }

    impl Sensor for TestSensor {
        fn state(&self) -> f32 {
            self.state
        }

        fn publish_state(&mut self, state: f32) {
            self.state = state;
        }
    }

    #[test]
    fn info_derives_object_id_and_key() {
        let info = EntityInfo::new("Living Room Temp");
        assert_eq!(info.name(), "Living Room Temp");
        assert_eq!(info.object_id(), "living_room_temp");
        assert_eq!(info.key(), fnv1_hash("living_room_temp"));
        assert!(!info.is_internal());
    }

    #[test]
    fn explicit_object_id_rekeys() {
        let info = EntityInfo::new("Temp").with_object_id("outdoor");
        assert_eq!(info.key(), fnv1_hash("outdoor"));
    }

    #[test]
    fn registry_preserves_registration_order() {
        let mut registry = EntityRegistry::<SensorDomain>::new();
        registry.push(TestSensor::boxed(EntityInfo::new("a"), 1.0));
        registry.push(TestSensor::boxed(EntityInfo::new("b"), 2.0));
        registry.push(TestSensor::boxed(EntityInfo::new("c"), 3.0));
        let names: Vec<&str> = registry.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(registry.all().len(), 3);
    }

    #[test]
    fn lookup_returns_first_registered_on_collision() {
        let mut registry = EntityRegistry::<SensorDomain>::new();
        registry.push(TestSensor::boxed(EntityInfo::new("first").with_object_id("dup"), 1.0));
        registry.push(TestSensor::boxed(EntityInfo::new("second").with_object_id("dup"), 2.0));
        let found = registry.get_by_key(fnv1_hash("dup"), false).unwrap();
        assert_eq!(found.name(), "first");
    }

    #[test]
    fn lookup_respects_internal_flag() {
        let mut registry = EntityRegistry::<SensorDomain>::new();
        registry.push(TestSensor::boxed(
            EntityInfo::new("hidden").with_object_id("dup").internal(true),
            1.0,
        ));
        registry.push(TestSensor::boxed(EntityInfo::new("visible").with_object_id("dup"), 2.0));
        let key = fnv1_hash("dup");
        assert_eq!(registry.get_by_key(key, false).unwrap().name(), "visible");
        assert_eq!(registry.get_by_key(key, true).unwrap().name(), "hidden");
    }

    #[test]
    fn lookup_of_only_internal_entity_needs_flag() {
        let mut registry = EntityRegistry::<SensorDomain>::new();
        let key = registry
            .push(TestSensor::boxed(EntityInfo::new("diag").internal(true), 0.0))
            .index();
        assert_eq!(key, 0);
        let diag_key = fnv1_hash("diag");
        assert!(registry.get_by_key(diag_key, false).is_none());
        assert!(registry.get_by_key(diag_key, true).is_some());
    }

    #[test]
    fn unknown_key_is_not_found() {
        let registry = EntityRegistry::<SensorDomain>::new();
        assert!(registry.get_by_key(42, true).is_none());
    }

    #[test]
    fn handles_give_mutable_access() {
        let mut registry = EntityRegistry::<SensorDomain>::new();
        let id = registry.push(TestSensor::boxed(EntityInfo::new("t"), 0.0));
        registry.get_mut(id).unwrap().publish_state(21.5);
        assert!((registry.get(id).unwrap().state() - 21.5).abs() < f32::EPSILON);
    }
}
