//! Loaded banks plus the two events the game plays

use std::sync::Arc;

use super::system::{check, AudioError, AudioSystem, EventDescription, EventInstance};
use crate::config::AudioConfig;

/// Background music and the impact one-shot, resolved against a loaded audio system
pub struct SoundBank {
    audio: Arc<dyn AudioSystem>,
    music: EventInstance,
    /// Index of the music's `Progression` parameter
    progression: u32,
    impact: EventDescription,
}

impl SoundBank {
    /// Load every configured bank, create the music instance and preload the impact samples
    ///
    /// Any failing call aborts setup.
    pub fn load(audio: Arc<dyn AudioSystem>, config: &AudioConfig) -> Result<Self, AudioError> {
        for bank in &config.banks {
            check("load_bank", audio.load_bank(bank))?;
            log::debug!("Loaded audio bank {}", bank);
        }

        let music_event = check("get_event", audio.get_event(&config.music_event))?;
        let music = check("create_instance", audio.create_instance(music_event))?;
        let progression = check("parameter_index", audio.parameter_index(music_event, "Progression"))?;

        let impact = check("get_event", audio.get_event(&config.impact_event))?;
        check("load_sample_data", audio.load_sample_data(impact))?;

        log::info!("Audio ready: {} banks loaded", config.banks.len());
        Ok(Self {
            audio,
            music,
            progression,
            impact,
        })
    }

    /// Start the background music at the first progression stage
    pub fn start_music(&self) -> Result<(), AudioError> {
        check(
            "set_parameter_by_index",
            self.audio.set_parameter_by_index(self.music, self.progression, 1.0),
        )?;
        check("set_parameter", self.audio.set_parameter(self.music, "Stinger", 1.0))?;
        check("start", self.audio.start(self.music))
    }

    pub fn stop_music(&self) -> Result<(), AudioError> {
        check("stop", self.audio.stop(self.music))
    }

    /// Fire-and-forget instance of the impact event
    pub fn one_shot(&self, volume: f32, pitch: f32) -> Result<(), AudioError> {
        let instance = check("create_instance", self.audio.create_instance(self.impact))?;
        check("set_pitch", self.audio.set_pitch(instance, pitch))?;
        check("set_volume", self.audio.set_volume(instance, volume))?;
        check("start", self.audio.start(instance))?;
        check("release", self.audio.release(instance))
    }
}

impl std::fmt::Debug for SoundBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundBank")
            .field("music", &self.music)
            .field("impact", &self.impact)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::system::AudioCode;
    use crate::audio::NullAudio;

    /// Fails every bank load
    struct MissingBanks;

    impl AudioSystem for MissingBanks {
        fn load_bank(&self, _file: &str) -> Result<(), AudioCode> {
            Err(AudioCode::FileNotFound)
        }
        fn get_event(&self, _path: &str) -> Result<EventDescription, AudioCode> {
            Ok(EventDescription(0))
        }
        fn load_sample_data(&self, _event: EventDescription) -> Result<(), AudioCode> {
            Ok(())
        }
        fn create_instance(&self, _event: EventDescription) -> Result<EventInstance, AudioCode> {
            Ok(EventInstance(0))
        }
        fn parameter_index(&self, _event: EventDescription, _name: &str) -> Result<u32, AudioCode> {
            Ok(0)
        }
        fn set_parameter(&self, _i: EventInstance, _name: &str, _value: f32) -> Result<(), AudioCode> {
            Ok(())
        }
        fn set_parameter_by_index(&self, _i: EventInstance, _index: u32, _value: f32) -> Result<(), AudioCode> {
            Ok(())
        }
        fn set_pitch(&self, _i: EventInstance, _pitch: f32) -> Result<(), AudioCode> {
            Ok(())
        }
        fn set_volume(&self, _i: EventInstance, _volume: f32) -> Result<(), AudioCode> {
            Ok(())
        }
        fn start(&self, _i: EventInstance) -> Result<(), AudioCode> {
            Ok(())
        }
        fn stop(&self, _i: EventInstance) -> Result<(), AudioCode> {
            Ok(())
        }
        fn release(&self, _i: EventInstance) -> Result<(), AudioCode> {
            Ok(())
        }
    }

    #[test]
    fn test_load_calls_in_order() {
        let audio = Arc::new(NullAudio::new());
        SoundBank::load(audio.clone(), &AudioConfig::default()).unwrap();

        let calls = audio.calls();
        assert_eq!(calls[0], "load_bank(Master_Bank.bank)");
        assert_eq!(calls[3], "load_bank(SFX.bank)");
        assert_eq!(calls[4], "get_event(event:/Music/Level 01)");
        assert_eq!(calls[5], "create_instance(0)");
        assert_eq!(calls[6], "parameter_index(0, Progression)");
        assert_eq!(calls[7], "get_event(event:/Weapons/Explosion)");
        assert_eq!(calls[8], "load_sample_data(2)");
    }

    #[test]
    fn test_missing_bank_aborts() {
        let err = SoundBank::load(Arc::new(MissingBanks), &AudioConfig::default()).unwrap_err();
        assert_eq!(err.call, "load_bank");
        assert_eq!(err.code, AudioCode::FileNotFound);
    }

    #[test]
    fn test_start_music_sets_parameters_first() {
        let audio = Arc::new(NullAudio::new());
        let bank = SoundBank::load(audio.clone(), &AudioConfig::default()).unwrap();
        bank.start_music().unwrap();

        let calls = audio.calls();
        let tail = &calls[calls.len() - 3..];
        assert_eq!(tail[0], "set_parameter_by_index(1, 0, 1)");
        assert_eq!(tail[1], "set_parameter(1, Stinger, 1)");
        assert_eq!(tail[2], "start(1)");
    }

    #[test]
    fn test_one_shot_releases_instance() {
        let audio = Arc::new(NullAudio::new());
        let bank = SoundBank::load(audio.clone(), &AudioConfig::default()).unwrap();
        let before = audio.calls().len();
        bank.one_shot(0.5, 3.0).unwrap();

        let calls = audio.calls();
        let shot = &calls[before..];
        assert_eq!(shot.len(), 5);
        assert_eq!(shot[0], "create_instance(2)");
        assert_eq!(shot[1], "set_pitch(3, 3)");
        assert_eq!(shot[2], "set_volume(3, 0.5)");
        assert_eq!(shot[3], "start(3)");
        assert_eq!(shot[4], "release(3)");
    }
}
