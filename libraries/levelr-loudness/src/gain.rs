//! Gain computation toward a loudness target

/// Gain in dB that moves `current_loudness` onto `target_loudness`
///
/// Positive values amplify, negative values attenuate. No clamping.
pub fn gain_to_target(current_loudness: f64, target_loudness: f64) -> f64 {
    target_loudness - current_loudness
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_input_is_amplified() {
        assert_eq!(gain_to_target(-23.0, -14.0), 9.0);
    }

    #[test]
    fn loud_input_is_attenuated() {
        assert_eq!(gain_to_target(-6.5, -14.0), -7.5);
    }

    #[test]
    fn on_target_needs_no_gain() {
        assert_eq!(gain_to_target(-16.0, -16.0), 0.0);
    }
}
