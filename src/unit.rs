//! Base unit normalization driven by the `unit` tag.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Nanos,
    Micros,
    Millis,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
    Exa,
    Zetta,
    Yotta,
    Kibi,
    Mebi,
    Gibi,
    Tebi,
    Pebi,
    Exbi,
    Zebi,
    Yobi,
}
impl Unit {
    pub fn parse(code: &str) -> Option<Self> {
        Some(match code {
            "ns" => Self::Nanos,
            "us" => Self::Micros,
            "ms" => Self::Millis,
            "k" => Self::Kilo,
            "M" => Self::Mega,
            "G" => Self::Giga,
            "T" => Self::Tera,
            "P" => Self::Peta,
            "E" => Self::Exa,
            "Z" => Self::Zetta,
            "Y" => Self::Yotta,
            "Ki" => Self::Kibi,
            "Mi" => Self::Mebi,
            "Gi" => Self::Gibi,
            "Ti" => Self::Tebi,
            "Pi" => Self::Pebi,
            "Ei" => Self::Exbi,
            "Zi" => Self::Zebi,
            "Yi" => Self::Yobi,
            _ => return None,
        })
    }

    /// Multiplier for prefixes, divisor for time subdivisions.
    pub fn factor(self) -> f64 {
        match self {
            Self::Nanos => 1e9,
            Self::Micros => 1e6,
            Self::Millis => 1e3,
            Self::Kilo => 1e3,
            Self::Mega => 1e6,
            Self::Giga => 1e9,
            Self::Tera => 1e12,
            Self::Peta => 1e15,
            Self::Exa => 1e18,
            Self::Zetta => 1e21,
            Self::Yotta => 1e24,
            Self::Kibi => 1024f64.powi(1),
            Self::Mebi => 1024f64.powi(2),
            Self::Gibi => 1024f64.powi(3),
            Self::Tebi => 1024f64.powi(4),
            Self::Pebi => 1024f64.powi(5),
            Self::Exbi => 1024f64.powi(6),
            Self::Zebi => 1024f64.powi(7),
            Self::Yobi => 1024f64.powi(8),
        }
    }

    pub fn to_base(self, value: f64) -> f64 {
        match self {
            Self::Nanos | Self::Micros | Self::Millis => value / self.factor(),
            _ => value * self.factor(),
        }
    }
}

/// Unknown codes leave the value untouched.
pub fn convert(code: &str, value: f64) -> f64 {
    match Unit::parse(code) {
        Some(unit) => unit.to_base(value),
        None => value,
    }
}
