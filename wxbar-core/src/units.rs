use crate::error::WeatherError;

const ZERO_CELSIUS_IN_KELVIN: f64 = 273.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TempUnit {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TempUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TempUnit::Celsius => "celsius",
            TempUnit::Fahrenheit => "fahrenheit",
            TempUnit::Kelvin => "kelvin",
        }
    }

    pub const fn all() -> &'static [TempUnit] {
        &[TempUnit::Celsius, TempUnit::Fahrenheit, TempUnit::Kelvin]
    }

    /// Suffix appended to the printed temperature.
    pub fn suffix(&self) -> &'static str {
        match self {
            TempUnit::Celsius => "°",
            TempUnit::Fahrenheit => "°F",
            TempUnit::Kelvin => "K",
        }
    }

    /// Kelvin reading expressed in this unit.
    pub fn convert(&self, kelvin: f64) -> f64 {
        match self {
            TempUnit::Celsius => kelvin_to_celsius(kelvin),
            TempUnit::Fahrenheit => kelvin_to_fahrenheit(kelvin),
            TempUnit::Kelvin => kelvin,
        }
    }

    /// Converts and renders a temperature the way the bar shows it: the
    /// integer part (truncated toward zero) followed by the unit suffix.
    pub fn format(&self, kelvin: f64) -> String {
        let value = self.convert(kelvin).trunc() as i64;
        format!("{value}{}", self.suffix())
    }
}

impl std::fmt::Display for TempUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TempUnit {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        match lower.as_str() {
            "celsius" => Ok(TempUnit::Celsius),
            "fahrenheit" => Ok(TempUnit::Fahrenheit),
            "kelvin" => Ok(TempUnit::Kelvin),
            _ => Err(WeatherError::UnknownUnit(value.to_string())),
        }
    }
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - ZERO_CELSIUS_IN_KELVIN
}

pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    kelvin_to_celsius(kelvin) * 9.0 / 5.0 + 32.0
}
