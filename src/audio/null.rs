//! Audio backend that plays nothing

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use super::system::{AudioCode, AudioSystem, EventDescription, EventInstance};

/// Accepts every call, hands out fresh handles and keeps a log of the calls
///
/// Used when no audio device is available and in tests.
#[derive(Debug, Default)]
pub struct NullAudio {
    next_handle: AtomicU32,
    /// `(event, name)` pairs; a parameter's index is its position here
    parameters: Mutex<Vec<(u32, String)>>,
    calls: Mutex<Vec<String>>,
}

impl NullAudio {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: String) {
        log::trace!("audio: {}", call);
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call);
    }

    fn handle(&self) -> u32 {
        self.next_handle.fetch_add(1, Ordering::Relaxed)
    }

    /// Every call made so far, formatted as `name(args)`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl AudioSystem for NullAudio {
    fn load_bank(&self, file: &str) -> Result<(), AudioCode> {
        self.record(format!("load_bank({})", file));
        Ok(())
    }

    fn get_event(&self, path: &str) -> Result<EventDescription, AudioCode> {
        self.record(format!("get_event({})", path));
        Ok(EventDescription(self.handle()))
    }

    fn load_sample_data(&self, event: EventDescription) -> Result<(), AudioCode> {
        self.record(format!("load_sample_data({})", event.0));
        Ok(())
    }

    fn create_instance(&self, event: EventDescription) -> Result<EventInstance, AudioCode> {
        self.record(format!("create_instance({})", event.0));
        Ok(EventInstance(self.handle()))
    }

    fn parameter_index(&self, event: EventDescription, name: &str) -> Result<u32, AudioCode> {
        self.record(format!("parameter_index({}, {})", event.0, name));
        let mut parameters = self.parameters.lock().unwrap_or_else(PoisonError::into_inner);
        let index = match parameters.iter().position(|(e, n)| *e == event.0 && n == name) {
            Some(index) => index,
            None => {
                parameters.push((event.0, name.to_string()));
                parameters.len() - 1
            }
        };
        u32::try_from(index).map_err(|_| AudioCode::Internal)
    }

    fn set_parameter(&self, instance: EventInstance, name: &str, value: f32) -> Result<(), AudioCode> {
        self.record(format!("set_parameter({}, {}, {})", instance.0, name, value));
        Ok(())
    }

    fn set_parameter_by_index(&self, instance: EventInstance, index: u32, value: f32) -> Result<(), AudioCode> {
        self.record(format!("set_parameter_by_index({}, {}, {})", instance.0, index, value));
        let known = self.parameters.lock().unwrap_or_else(PoisonError::into_inner).len();
        if index as usize >= known {
            return Err(AudioCode::InvalidParam);
        }
        Ok(())
    }

    fn set_pitch(&self, instance: EventInstance, pitch: f32) -> Result<(), AudioCode> {
        self.record(format!("set_pitch({}, {})", instance.0, pitch));
        Ok(())
    }

    fn set_volume(&self, instance: EventInstance, volume: f32) -> Result<(), AudioCode> {
        self.record(format!("set_volume({}, {})", instance.0, volume));
        Ok(())
    }

    fn start(&self, instance: EventInstance) -> Result<(), AudioCode> {
        self.record(format!("start({})", instance.0));
        Ok(())
    }

    fn stop(&self, instance: EventInstance) -> Result<(), AudioCode> {
        self.record(format!("stop({})", instance.0));
        Ok(())
    }

    fn release(&self, instance: EventInstance) -> Result<(), AudioCode> {
        self.record(format!("release({})", instance.0));
        Ok(())
    }
}
