//! Speaker to voice resolution.

mod gender;
mod pool;

pub use gender::{Gender, NameDictionary};
pub use pool::{VoiceAssignment, VoicePool, VoiceResolver};
