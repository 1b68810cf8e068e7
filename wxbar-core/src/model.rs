/// Coordinates of the geocoded city. Only used to build the second request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions as reported upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditions {
    pub temperature_kelvin: f64,
    pub icon_code: String,
}

/// Which cached field gets printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Temperature,
    Icon,
}

impl OutputMode {
    /// `icon` selects the glyph; anything else, or nothing, the temperature.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("icon") => OutputMode::Icon,
            _ => OutputMode::Temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_icon_selects_icon_mode() {
        assert_eq!(OutputMode::from_arg(Some("icon")), OutputMode::Icon);
        assert_eq!(OutputMode::from_arg(Some("temp")), OutputMode::Temperature);
        assert_eq!(OutputMode::from_arg(Some("ICON")), OutputMode::Temperature);
        assert_eq!(OutputMode::from_arg(None), OutputMode::Temperature);
    }
}
