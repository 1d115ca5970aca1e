use std::fmt;

/// User-selected operating intent, in the host framework's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HvacMode {
    #[default]
    Off,
    Heat,
    Cool,
    HeatCool,
    FanOnly,
    Idle,
}

impl HvacMode {
    pub fn as_device_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
            HvacMode::HeatCool => "heat-cool",
            HvacMode::FanOnly => "fan-only",
            HvacMode::Idle => "idle",
        }
    }

    pub fn from_device_str(s: &str) -> Option<Self> {
        match s {
            "off" => Some(HvacMode::Off),
            "heat" => Some(HvacMode::Heat),
            "cool" => Some(HvacMode::Cool),
            "heat-cool" => Some(HvacMode::HeatCool),
            "fan-only" => Some(HvacMode::FanOnly),
            "idle" => Some(HvacMode::Idle),
            _ => None,
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_device_str())
    }
}

/// Device-reported current physical activity. Only `refresh` writes it;
/// no user-facing call sets an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HvacAction {
    #[default]
    Off,
    Fan,
    Idle,
    Heating,
    Cooling,
}

impl HvacAction {
    pub fn as_device_str(&self) -> &'static str {
        match self {
            HvacAction::Off => "off",
            HvacAction::Fan => "fan",
            HvacAction::Idle => "idle",
            HvacAction::Heating => "heating",
            HvacAction::Cooling => "cooling",
        }
    }

    pub fn from_device_str(s: &str) -> Option<Self> {
        match s {
            "off" => Some(HvacAction::Off),
            "fan" => Some(HvacAction::Fan),
            "idle" => Some(HvacAction::Idle),
            "heating" => Some(HvacAction::Heating),
            "cooling" => Some(HvacAction::Cooling),
            _ => None,
        }
    }
}

impl fmt::Display for HvacAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_device_str())
    }
}

/// Target setpoint, in Fahrenheit. Single-setpoint modes (heat, cool) use
/// `Single`; heat-cool uses `Range`. Nothing ties the representation to the
/// active mode; the host picks the matching write call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Single(f64),
    Range { low: f64, high: f64 },
}

impl Target {
    /// Scalar setpoint, or `None` when a range is active.
    pub fn general(&self) -> Option<f64> {
        match self {
            Target::Single(v) => Some(*v),
            Target::Range { .. } => None,
        }
    }

    pub fn low(&self) -> Option<f64> {
        match self {
            Target::Single(_) => None,
            Target::Range { low, .. } => Some(*low),
        }
    }

    pub fn high(&self) -> Option<f64> {
        match self {
            Target::Single(_) => None,
            Target::Range { high, .. } => Some(*high),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Single(v) => write!(f, "{v:.1}\u{00b0}F"),
            Target::Range { low, high } => {
                write!(f, "{low:.1}\u{00b0}F\u{2013}{high:.1}\u{00b0}F")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Fahrenheit,
}

/// Climate-entity capability flags, mirrored from the host framework's model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features(u32);

impl Features {
    pub const TARGET_TEMPERATURE: Features = Features(1);

    pub fn contains(&self, other: Features) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Events emitted when a refresh or write changes adapter state.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ModeChanged { mode: HvacMode },
    ActionChanged { action: HvacAction },
    TemperatureChanged { temperature: f64 },
    TargetChanged { target: Target },
}
