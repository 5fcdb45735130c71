/*
 * Quesuene - Stream Control Module
 * Version: 1.0
 * Copyright (c) 2025 Peter Leukanič
 * Under MIT License
 * Feel free to share and modify
 *
 * Binding between one sink input and its slider
 */

use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;

use crate::audio::{AudioControl, AudioError, SinkInput};

/// Forwards slider changes for one sink input to the audio server and
/// reports each applied change as activity.
pub struct VolumeBinding {
    sink_input: SinkInput,
    control: Rc<dyn AudioControl>,
    on_activity: Rc<dyn Fn()>,
    current: Cell<u32>,
}

impl VolumeBinding {
    pub fn new(
        sink_input: SinkInput,
        control: Rc<dyn AudioControl>,
        on_activity: Rc<dyn Fn()>,
    ) -> Self {
        let current = Cell::new(sink_input.volume);
        Self {
            sink_input,
            control,
            on_activity,
            current,
        }
    }

    pub fn sink_input(&self) -> &SinkInput {
        &self.sink_input
    }

    pub fn initial_value(&self) -> f64 {
        f64::from(self.sink_input.volume)
    }

    /// Top of the slider range. Boosted streams (above `max_volume`) widen
    /// it so the slider starts at their real level.
    pub fn slider_upper_bound(&self, max_volume: u32) -> f64 {
        f64::from(max_volume.max(self.sink_input.volume))
    }

    /// Handle a slider value. Returns `Ok(true)` when a volume was applied.
    pub fn value_changed(&self, raw: f64) -> Result<bool, AudioError> {
        let volume = raw.round().max(0.0) as u32;
        if volume == self.current.get() {
            return Ok(false);
        }

        debug!(index = self.sink_input.index, volume, "Volume changed");
        self.control
            .set_sink_input_volume(self.sink_input.index, volume)?;
        self.current.set(volume);

        (self.on_activity)();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MockAudioControl;
    use mockall::predicate::eq;

    fn music() -> SinkInput {
        SinkInput {
            index: 5,
            app_name: "Music".to_string(),
            volume: 40,
        }
    }

    fn counter() -> (Rc<Cell<usize>>, Rc<dyn Fn()>) {
        let count = Rc::new(Cell::new(0));
        let count_clone = Rc::clone(&count);
        (count, Rc::new(move || count_clone.set(count_clone.get() + 1)))
    }

    #[test]
    fn test_initial_value_matches_record() {
        let (_, on_activity) = counter();
        let binding = VolumeBinding::new(music(), Rc::new(MockAudioControl::new()), on_activity);
        assert_eq!(binding.initial_value(), 40.0);
    }

    #[test]
    fn test_boosted_stream_widens_slider_range() {
        let (_, on_activity) = counter();
        let boosted = SinkInput {
            volume: 150,
            ..music()
        };
        let binding = VolumeBinding::new(boosted, Rc::new(MockAudioControl::new()), on_activity);

        assert_eq!(binding.slider_upper_bound(100), 150.0);
        assert!(binding.initial_value() <= binding.slider_upper_bound(100));
    }

    #[test]
    fn test_normal_stream_keeps_configured_range() {
        let (_, on_activity) = counter();
        let binding = VolumeBinding::new(music(), Rc::new(MockAudioControl::new()), on_activity);

        assert_eq!(binding.slider_upper_bound(100), 100.0);
    }

    #[test]
    fn test_each_change_sets_volume_once_and_signals_activity() {
        let mut mock = MockAudioControl::new();
        mock.expect_set_sink_input_volume()
            .with(eq(5), eq(55))
            .times(1)
            .returning(|_, _| Ok(()));
        mock.expect_set_sink_input_volume()
            .with(eq(5), eq(70))
            .times(1)
            .returning(|_, _| Ok(()));

        let (activity, on_activity) = counter();
        let binding = VolumeBinding::new(music(), Rc::new(mock), on_activity);

        assert!(binding.value_changed(55.0).unwrap());
        assert!(binding.value_changed(70.0).unwrap());
        assert_eq!(activity.get(), 2);
    }

    #[test]
    fn test_unchanged_value_is_ignored() {
        let mut mock = MockAudioControl::new();
        mock.expect_set_sink_input_volume().never();

        let (activity, on_activity) = counter();
        let binding = VolumeBinding::new(music(), Rc::new(mock), on_activity);

        assert!(!binding.value_changed(40.0).unwrap());
        assert!(!binding.value_changed(40.3).unwrap());
        assert_eq!(activity.get(), 0);
    }

    #[test]
    fn test_fractional_values_are_rounded() {
        let mut mock = MockAudioControl::new();
        mock.expect_set_sink_input_volume()
            .with(eq(5), eq(41))
            .times(1)
            .returning(|_, _| Ok(()));

        let (_, on_activity) = counter();
        let binding = VolumeBinding::new(music(), Rc::new(mock), on_activity);

        assert!(binding.value_changed(40.6).unwrap());
    }

    #[test]
    fn test_setter_failure_propagates_without_activity() {
        let mut mock = MockAudioControl::new();
        mock.expect_set_sink_input_volume()
            .times(1)
            .returning(|_, _| Err(AudioError::EmptyCommand));

        let (activity, on_activity) = counter();
        let binding = VolumeBinding::new(music(), Rc::new(mock), on_activity);

        assert!(binding.value_changed(10.0).is_err());
        assert_eq!(activity.get(), 0);
    }
}
