//! `cadence-kernel` – Component & Entity Orchestration
//!
//! The part of the runtime that owns every functional unit on the device and
//! decides when each one runs.
//!
//! # Modules
//!
//! - [`component`] – the [`Component`] trait, its per-hook [`Context`], the
//!   [`LifecycleState`] machine and per-component [`ComponentStatus`] flags.
//! - [`registry`] – [`ComponentRegistry`]: registration-ordered arena of
//!   components.  Drives one-time setup with fault isolation, classifies the
//!   looping subset exactly once, runs each tick's periodic hooks and the
//!   two-pass safe shutdown.
//! - [`entity`] – [`Entity`], [`EntityInfo`] and the generic, append-only
//!   [`EntityRegistry<D>`] with first-match keyed lookup.
//! - [`domains`] – the ten domain tags (one per Cargo feature), their typed
//!   object traits and the [`EntityRegistries`] bundle.

pub mod component;
pub mod domains;
pub mod entity;
pub mod registry;

pub use component::{Component, ComponentId, ComponentStatus, Context, LifecycleState, RebootKind};
pub use domains::EntityRegistries;
pub use entity::{Domain, Entity, EntityId, EntityInfo, EntityRegistry};
pub use registry::{ComponentRegistry, Services};
