use std::num::IntErrorKind;

/// Experience shown before anything was entered, and the fallback for
/// unparseable text.
pub const DEFAULT_EXPERIENCE: u8 = 2;

pub const SLIDER_MIN: u8 = 0;
pub const SLIDER_MAX: u8 = 20;

/// Reconciles the free-text experience field with the bounded slider.
///
/// - `text` falls back to `previous` when absent and to
///   [`DEFAULT_EXPERIENCE`] when it is not an integer;
/// - the slider is initialised from the text value (clamped to
///   `SLIDER_MIN..=SLIDER_MAX`) unless the client moved it;
/// - the slider value overrides the text value whenever they differ.
///
/// The slider position is therefore always the final value, which keeps the
/// result inside the slider bounds.
pub fn reconcile(text: Option<&str>, slider: Option<i64>, previous: u8) -> u8 {
    let typed = match text {
        Some(text) => parse_experience(text),
        None => i64::from(previous),
    };
    // An untouched slider sits at the typed value.
    clamp_to_slider(slider.unwrap_or(typed))
}

/// Integers too large for `i64` saturate toward the matching slider bound,
/// like any other out-of-range number.
fn parse_experience(text: &str) -> i64 {
    let text = text.trim();
    match text.parse::<i64>() {
        Ok(value) => value,
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow) => i64::from(SLIDER_MAX),
        Err(e) if matches!(e.kind(), IntErrorKind::NegOverflow) => i64::from(SLIDER_MIN),
        Err(_) => i64::from(DEFAULT_EXPERIENCE),
    }
}

fn clamp_to_slider(value: i64) -> u8 {
    let clamped = value.clamp(i64::from(SLIDER_MIN), i64::from(SLIDER_MAX));
    u8::try_from(clamped).unwrap_or(DEFAULT_EXPERIENCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_text_falls_back_to_default() {
        assert_eq!(reconcile(Some("abc"), None, 5), 2);
        assert_eq!(reconcile(Some(""), None, 5), 2);
        assert_eq!(reconcile(Some("7.5"), None, 5), 2);
    }

    #[test]
    fn test_numeric_text() {
        assert_eq!(reconcile(Some("7"), None, 2), 7);
        assert_eq!(reconcile(Some(" 12 "), None, 2), 12);
    }

    #[test]
    fn test_slider_overrides_text() {
        assert_eq!(reconcile(Some("7"), Some(15), 2), 15);
        assert_eq!(reconcile(Some("abc"), Some(9), 2), 9);
    }

    #[test]
    fn test_agreeing_controls() {
        assert_eq!(reconcile(Some("7"), Some(7), 2), 7);
    }

    #[test]
    fn test_missing_text_uses_previous() {
        assert_eq!(reconcile(None, None, 11), 11);
        assert_eq!(reconcile(None, Some(4), 11), 4);
    }

    #[test]
    fn test_out_of_range_text_is_pulled_into_slider_bounds() {
        assert_eq!(reconcile(Some("35"), None, 2), 20);
        assert_eq!(reconcile(Some("-3"), None, 2), 0);
    }

    #[test]
    fn test_overflowing_text_saturates_to_slider_bounds() {
        assert_eq!(reconcile(Some("99999999999999999999"), None, 2), 20);
        assert_eq!(reconcile(Some("+99999999999999999999"), None, 2), 20);
        assert_eq!(reconcile(Some("-99999999999999999999"), None, 2), 0);
        assert_eq!(reconcile(Some("99999999999999999999x"), None, 5), 2);
    }

    #[test]
    fn test_out_of_range_slider_is_clamped() {
        assert_eq!(reconcile(Some("7"), Some(99), 2), 20);
        assert_eq!(reconcile(Some("7"), Some(-1), 2), 0);
    }
}
