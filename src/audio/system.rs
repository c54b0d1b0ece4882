//! Audio engine interface

use thiserror::Error;

/// Handle to an event description (a playable sound definition)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventDescription(pub u32);

/// Handle to a live event instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventInstance(pub u32);

/// Non-OK result code returned by the audio engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCode {
    FileNotFound,
    EventNotFound,
    InvalidHandle,
    InvalidParam,
    NotLoaded,
    Internal,
}

impl std::fmt::Display for AudioCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            AudioCode::FileNotFound => "file not found",
            AudioCode::EventNotFound => "event not found",
            AudioCode::InvalidHandle => "invalid handle",
            AudioCode::InvalidParam => "invalid parameter",
            AudioCode::NotLoaded => "sample data not loaded",
            AudioCode::Internal => "internal error",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
#[error("audio call `{call}` failed: {code}")]
pub struct AudioError {
    pub call: &'static str,
    pub code: AudioCode,
}

/// Synchronous call/result API of the audio engine
///
/// Handles are plain ids owned by the engine; releasing an instance lets the
/// engine free it once it stops playing.
pub trait AudioSystem: Send + Sync {
    fn load_bank(&self, file: &str) -> Result<(), AudioCode>;
    fn get_event(&self, path: &str) -> Result<EventDescription, AudioCode>;
    fn load_sample_data(&self, event: EventDescription) -> Result<(), AudioCode>;
    fn create_instance(&self, event: EventDescription) -> Result<EventInstance, AudioCode>;
    /// Index of the parameter `name` on `event`, stable for the event's lifetime
    fn parameter_index(&self, event: EventDescription, name: &str) -> Result<u32, AudioCode>;
    fn set_parameter(&self, instance: EventInstance, name: &str, value: f32) -> Result<(), AudioCode>;
    fn set_parameter_by_index(&self, instance: EventInstance, index: u32, value: f32) -> Result<(), AudioCode>;
    fn set_pitch(&self, instance: EventInstance, pitch: f32) -> Result<(), AudioCode>;
    fn set_volume(&self, instance: EventInstance, volume: f32) -> Result<(), AudioCode>;
    fn start(&self, instance: EventInstance) -> Result<(), AudioCode>;
    fn stop(&self, instance: EventInstance) -> Result<(), AudioCode>;
    fn release(&self, instance: EventInstance) -> Result<(), AudioCode>;
}

/// Turn an engine result into a fail-fast error, logging the failure
pub fn check<T>(call: &'static str, result: Result<T, AudioCode>) -> Result<T, AudioError> {
    result.map_err(|code| {
        log::error!("Audio call {} failed: {}", call, code);
        AudioError { call, code }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudio;

    #[test]
    fn test_check_passes_ok_through() {
        assert_eq!(check("get_event", Ok(EventDescription(7))).unwrap(), EventDescription(7));
    }

    #[test]
    fn test_check_names_the_call() {
        let err = check::<()>("load_bank", Err(AudioCode::FileNotFound)).unwrap_err();
        assert_eq!(err.call, "load_bank");
        assert_eq!(err.code, AudioCode::FileNotFound);
        assert_eq!(err.to_string(), "audio call `load_bank` failed: file not found");
    }

    #[test]
    fn test_indexed_parameter() {
        let audio = NullAudio::new();
        let event = check("get_event", audio.get_event("event:/Music/Level 01")).unwrap();
        let instance = check("create_instance", audio.create_instance(event)).unwrap();

        let progression = check("parameter_index", audio.parameter_index(event, "Progression")).unwrap();
        assert_eq!(audio.parameter_index(event, "Progression"), Ok(progression));
        assert_ne!(audio.parameter_index(event, "Stinger"), Ok(progression));
        check("set_parameter_by_index", audio.set_parameter_by_index(instance, progression, 2.0)).unwrap();

        let err = check("set_parameter_by_index", audio.set_parameter_by_index(instance, 99, 1.0)).unwrap_err();
        assert_eq!(err.code, AudioCode::InvalidParam);
    }
}
