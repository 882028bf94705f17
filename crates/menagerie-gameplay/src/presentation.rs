//! Interfaces to the collaborators the core drives but does not own.
//!
//! Animation playback, audio, and the attribute/leveling system live outside
//! this crate. The core only issues requests through these traits. Every
//! collaborator is optional: when one is missing the request is skipped and the
//! simulation carries on.

use std::sync::Arc;

use ahash::AHashMap;
use menagerie_common::{EntityId, Vec3};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::events::EventBus;

/// Receives animation state requests.
pub trait AnimationDriver {
    /// Walking flag changed.
    fn set_walking(&mut self, entity: EntityId, walking: bool);
    /// One attack swing should play.
    fn trigger_attack(&mut self, entity: EntityId);
    /// Death animation should play.
    fn set_dead(&mut self, entity: EntityId);
}

/// Receives positional sound requests.
pub trait AudioDriver {
    /// Plays a named sound at a world position.
    fn play(&mut self, sound: &str, position: Vec3);
}

/// Looks up attribute-based damage scaling from the leveling system.
pub trait AttributeSource {
    /// Multiplier applied to an entity's base damage.
    fn attribute_multiplier(&self, entity: EntityId) -> f32;
}

/// Shared services injected into a world at construction.
#[derive(Default)]
pub struct Services {
    /// Lifecycle and combat notifications
    pub events: EventBus,
    /// Animation playback, if attached
    pub animation: Option<Box<dyn AnimationDriver>>,
    /// Audio playback, if attached
    pub audio: Option<Box<dyn AudioDriver>>,
    /// Attribute lookup, if attached
    pub attributes: Option<Box<dyn AttributeSource>>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("events", &self.events)
            .field("animation", &self.animation.is_some())
            .field("audio", &self.audio.is_some())
            .field("attributes", &self.attributes.is_some())
            .finish()
    }
}

impl Services {
    /// Creates services with only an event bus attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an animation driver.
    #[must_use]
    pub fn with_animation(mut self, driver: impl AnimationDriver + 'static) -> Self {
        self.animation = Some(Box::new(driver));
        self
    }

    /// Attaches an audio driver.
    #[must_use]
    pub fn with_audio(mut self, driver: impl AudioDriver + 'static) -> Self {
        self.audio = Some(Box::new(driver));
        self
    }

    /// Attaches an attribute source.
    #[must_use]
    pub fn with_attributes(mut self, source: impl AttributeSource + 'static) -> Self {
        self.attributes = Some(Box::new(source));
        self
    }

    /// Attribute multiplier for an entity, 1.0 without a source.
    ///
    /// Negative or non-finite answers are treated as 0.
    #[must_use]
    pub fn attribute_multiplier(&self, entity: EntityId) -> f32 {
        let raw = self
            .attributes
            .as_ref()
            .map_or(1.0, |source| source.attribute_multiplier(entity));
        if raw.is_finite() {
            raw.max(0.0)
        } else {
            0.0
        }
    }

    pub(crate) fn set_walking(&mut self, entity: EntityId, walking: bool) {
        if let Some(animation) = self.animation.as_mut() {
            animation.set_walking(entity, walking);
        }
    }

    pub(crate) fn trigger_attack(&mut self, entity: EntityId) {
        if let Some(animation) = self.animation.as_mut() {
            animation.trigger_attack(entity);
        }
    }

    pub(crate) fn set_dead(&mut self, entity: EntityId) {
        if let Some(animation) = self.animation.as_mut() {
            animation.set_dead(entity);
        }
    }

    pub(crate) fn play_sound(&mut self, sound: &str, position: Vec3) {
        if let Some(audio) = self.audio.as_mut() {
            audio.play(sound, position);
        }
    }
}

/// An animation request as recorded by [`CueRecorder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationCue {
    /// Walking flag set
    Walking(EntityId, bool),
    /// Attack swing triggered
    Attack(EntityId),
    /// Death played
    Dead(EntityId),
}

/// Animation driver that records every request.
///
/// Clones share the same buffer, so one clone can be boxed into [`Services`]
/// while another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct CueRecorder {
    cues: Arc<Mutex<Vec<AnimationCue>>>,
}

impl CueRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded cues.
    #[must_use]
    pub fn cues(&self) -> Vec<AnimationCue> {
        self.cues.lock().clone()
    }

    /// Number of attack swings recorded for an entity.
    #[must_use]
    pub fn attack_count(&self, entity: EntityId) -> usize {
        self.cues
            .lock()
            .iter()
            .filter(|cue| **cue == AnimationCue::Attack(entity))
            .count()
    }
}

impl AnimationDriver for CueRecorder {
    fn set_walking(&mut self, entity: EntityId, walking: bool) {
        self.cues.lock().push(AnimationCue::Walking(entity, walking));
    }

    fn trigger_attack(&mut self, entity: EntityId) {
        self.cues.lock().push(AnimationCue::Attack(entity));
    }

    fn set_dead(&mut self, entity: EntityId) {
        self.cues.lock().push(AnimationCue::Dead(entity));
    }
}

/// Audio driver that records every request.
#[derive(Debug, Clone, Default)]
pub struct SoundRecorder {
    sounds: Arc<Mutex<Vec<(String, Vec3)>>>,
}

impl SoundRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded sounds.
    #[must_use]
    pub fn sounds(&self) -> Vec<(String, Vec3)> {
        self.sounds.lock().clone()
    }
}

impl AudioDriver for SoundRecorder {
    fn play(&mut self, sound: &str, position: Vec3) {
        self.sounds.lock().push((sound.to_owned(), position));
    }
}

/// Attribute source backed by a fixed table.
#[derive(Debug, Clone, Default)]
pub struct FixedAttributes {
    multipliers: AHashMap<EntityId, f32>,
    fallback: f32,
}

impl FixedAttributes {
    /// Creates a table where unknown entities scale by `fallback`.
    #[must_use]
    pub fn new(fallback: f32) -> Self {
        Self {
            multipliers: AHashMap::new(),
            fallback,
        }
    }

    /// Sets the multiplier for one entity.
    #[must_use]
    pub fn with(mut self, entity: EntityId, multiplier: f32) -> Self {
        self.multipliers.insert(entity, multiplier);
        self
    }
}

impl AttributeSource for FixedAttributes {
    fn attribute_multiplier(&self, entity: EntityId) -> f32 {
        self.multipliers
            .get(&entity)
            .copied()
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collaborators_are_skipped() {
        let mut services = Services::new();
        let id = EntityId::from_raw(1);

        services.set_walking(id, true);
        services.trigger_attack(id);
        services.set_dead(id);
        services.play_sound("roar", Vec3::ZERO);

        assert!((services.attribute_multiplier(id) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_recorder_clones_share_buffer() {
        let recorder = CueRecorder::new();
        let mut services = Services::new().with_animation(recorder.clone());
        let id = EntityId::from_raw(2);

        services.trigger_attack(id);
        services.set_dead(id);

        assert_eq!(recorder.attack_count(id), 1);
        assert_eq!(
            recorder.cues(),
            vec![AnimationCue::Attack(id), AnimationCue::Dead(id)]
        );
    }

    #[test]
    fn test_attribute_multiplier_sanitized() {
        let good = EntityId::from_raw(1);
        let negative = EntityId::from_raw(2);
        let nan = EntityId::from_raw(3);
        let services = Services::new().with_attributes(
            FixedAttributes::new(1.0)
                .with(good, 1.5)
                .with(negative, -2.0)
                .with(nan, f32::NAN),
        );

        assert!((services.attribute_multiplier(good) - 1.5).abs() < f32::EPSILON);
        assert_eq!(services.attribute_multiplier(negative), 0.0);
        assert_eq!(services.attribute_multiplier(nan), 0.0);
    }

    #[test]
    fn test_sound_recorder() {
        let recorder = SoundRecorder::new();
        let mut services = Services::new().with_audio(recorder.clone());
        services.play_sound("bite", Vec3::new(1.0, 0.0, 2.0));

        assert_eq!(
            recorder.sounds(),
            vec![("bite".to_owned(), Vec3::new(1.0, 0.0, 2.0))]
        );
    }
}
