//! The interactive scene: three selectable targets over the yard
//! (house, car, charging station). Selecting a target opens its detail
//! panel; at most one is open at a time.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneTarget {
    House,
    Car,
    ChargingStation,
}

impl SceneTarget {
    pub const ALL: [SceneTarget; 3] = [Self::House, Self::Car, Self::ChargingStation];

    pub fn title(self) -> &'static str {
        match self {
            Self::House => "🏠 Smart House",
            Self::Car => "🚗 EV",
            Self::ChargingStation => "⚡ Charging Station",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::House => Self::Car,
            Self::Car => Self::ChargingStation,
            Self::ChargingStation => Self::House,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cycles_through_all_targets() {
        let mut target = SceneTarget::House;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(target);
            target = target.next();
        }
        assert_eq!(target, SceneTarget::House);
        assert_eq!(seen, SceneTarget::ALL);
    }
}
