//! Voice pool bookkeeping and per-speaker voice assignment.

use super::gender::{Gender, NameDictionary};
use crate::error::ConfigError;
use std::collections::{HashMap, VecDeque};

/// Ordered queues of unassigned voices plus the fallback voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePool {
    male: VecDeque<String>,
    female: VecDeque<String>,
    default: String,
}

impl VoicePool {
    /// Build a pool, choosing the default voice when none is given.
    ///
    /// The fallback order is the explicit default, then the first male voice,
    /// then the first female voice.
    pub fn new(
        male: Vec<String>,
        female: Vec<String>,
        default: Option<String>,
    ) -> Result<Self, ConfigError> {
        let default = default
            .filter(|v| !v.trim().is_empty())
            .or_else(|| male.first().cloned())
            .or_else(|| female.first().cloned())
            .ok_or(ConfigError::NoDefaultVoice)?;

        Ok(Self {
            male: male.into(),
            female: female.into(),
            default,
        })
    }

    pub fn default_voice(&self) -> &str {
        &self.default
    }

    /// Voices still available for the given gender.
    pub fn remaining(&self, gender: Gender) -> usize {
        match gender {
            Gender::Male => self.male.len(),
            Gender::Female => self.female.len(),
        }
    }

    /// Take the next voice for `gender`, or the default when none is left.
    pub fn take(&mut self, gender: Option<Gender>) -> String {
        let queue = match gender {
            Some(Gender::Male) => &mut self.male,
            Some(Gender::Female) => &mut self.female,
            None => return self.default.clone(),
        };

        match queue.pop_front() {
            Some(voice) => voice,
            None => {
                log::warn!(
                    "No {:?} voices left in pool, using default voice {}",
                    gender,
                    self.default
                );
                self.default.clone()
            }
        }
    }
}

/// A speaker label together with the voice it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceAssignment {
    pub speaker: Option<String>,
    pub gender: Option<Gender>,
    pub voice: String,
}

/// Maps speaker labels to voices, drawing from the pool once per label.
#[derive(Debug, Clone)]
pub struct VoiceResolver {
    pool: VoicePool,
    names: NameDictionary,
    assigned: HashMap<Option<String>, VoiceAssignment>,
    order: Vec<Option<String>>,
}

impl VoiceResolver {
    pub fn new(pool: VoicePool, names: NameDictionary) -> Self {
        Self {
            pool,
            names,
            assigned: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Voice for a speaker label. Unattributed text gets the default voice.
    pub fn resolve(&mut self, speaker: Option<&str>) -> &VoiceAssignment {
        let key = speaker.map(str::to_string);

        if !self.assigned.contains_key(&key) {
            let gender = speaker.and_then(|s| self.names.guess_gender(s));
            let voice = match speaker {
                Some(_) => self.pool.take(gender),
                None => self.pool.default_voice().to_string(),
            };
            log::debug!(
                "Assigned voice {} to {} ({:?})",
                voice,
                speaker.unwrap_or("Narrator"),
                gender
            );

            self.order.push(key.clone());
            self.assigned.insert(
                key.clone(),
                VoiceAssignment {
                    speaker: key.clone(),
                    gender,
                    voice,
                },
            );
        }

        &self.assigned[&key]
    }

    /// Assignments in the order speakers were first seen.
    pub fn assignments(&self) -> impl Iterator<Item = &VoiceAssignment> {
        self.order.iter().map(|key| &self.assigned[key])
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }
}
