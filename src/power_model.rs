// LINKPOWER: Energy Savings of Link Sleeping and Rate Adaptation in Backbone Networks
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Power model of the Wedge switch, linear in the load carried by each port.
//!
//! Each port rate has a static cost (paid as soon as the port is configured at that rate) and a
//! dynamic cost per Gbps of load. The chassis draws a constant idle power on top.

use strum::IntoEnumIterator;

/// Port rate settings supported by the switch.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum_macros::EnumString,
)]
pub enum RateTier {
    /// Port is asleep and carries nothing.
    #[strum(serialize = "0")]
    Off,
    #[strum(serialize = "10")]
    G10,
    #[strum(serialize = "25")]
    G25,
    #[strum(serialize = "100")]
    G100,
}

impl RateTier {
    /// Rate of the port in Gbps.
    pub fn gbps(self) -> u32 {
        match self {
            Self::Off => 0,
            Self::G10 => 10,
            Self::G25 => 25,
            Self::G100 => 100,
        }
    }

    pub fn from_gbps(gbps: u32) -> Option<Self> {
        Self::iter().find(|tier| tier.gbps() == gbps)
    }

    /// Rates a port may be configured at. `Off` is only an option if sleeping is allowed.
    pub fn options(allow_sleeping: bool) -> Vec<Self> {
        Self::iter()
            .filter(|tier| allow_sleeping || *tier != Self::Off)
            .collect()
    }
}

/// Power coefficients of one port rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortPower {
    /// Power drawn by the port regardless of its load, in W.
    pub static_power: f64,
    /// Power drawn per Gbps of load, in W/Gbps.
    pub dynamic_power: f64,
}

impl PortPower {
    pub const fn new(static_power: f64, dynamic_power: f64) -> Self {
        Self {
            static_power,
            dynamic_power,
        }
    }
}

/// Lookup table from port rate to its power coefficients, plus the idle power of the chassis.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerModel {
    /// Power of the switch with all ports asleep, in W.
    pub idle_power: f64,
    off: PortPower,
    g10: PortPower,
    g25: PortPower,
    g100: PortPower,
}

impl Default for PowerModel {
    fn default() -> Self {
        Self::wedge()
    }
}

impl PowerModel {
    /// Coefficients measured on the Wedge 100BF switch.
    pub fn wedge() -> Self {
        Self {
            idle_power: 108.0,
            off: PortPower::new(0.0, 0.0),
            g10: PortPower::new(0.31, 0.014),
            g25: PortPower::new(0.52, 0.013),
            g100: PortPower::new(1.57, 0.011),
        }
    }

    /// Build a model from explicit coefficients. Sleeping ports always draw nothing.
    pub fn new(idle_power: f64, g10: PortPower, g25: PortPower, g100: PortPower) -> Self {
        Self {
            idle_power,
            off: PortPower::new(0.0, 0.0),
            g10,
            g25,
            g100,
        }
    }

    pub fn port(&self, tier: RateTier) -> PortPower {
        match tier {
            RateTier::Off => self.off,
            RateTier::G10 => self.g10,
            RateTier::G25 => self.g25,
            RateTier::G100 => self.g100,
        }
    }

    pub fn static_power(&self, tier: RateTier) -> f64 {
        self.port(tier).static_power
    }

    pub fn dynamic_power(&self, tier: RateTier) -> f64 {
        self.port(tier).dynamic_power
    }

    /// Power of one port at rate `tier` carrying `load` Gbps (idle power excluded).
    pub fn port_power(&self, tier: RateTier, load: f64) -> f64 {
        let port = self.port(tier);
        port.static_power + load * port.dynamic_power
    }
}

/// Raw measurements the [`PowerModel::wedge`] coefficients were derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    /// Number of ports receiving traffic during the per-rate measurements.
    pub num_active_ports: f64,
    /// Total power with the ports at 10G and no traffic.
    pub idle_at_10g: f64,
    /// Total power with the ports at 10G, each receiving 10 Gbps.
    pub loaded_at_10g: f64,
    /// Total power with the ports at 25G and no traffic.
    pub idle_at_25g: f64,
    /// Total power with the ports at 25G, each receiving 25 Gbps.
    pub loaded_at_25g: f64,
    /// Power profile with 16 ports at 100G, 10 of them receiving traffic: `(Gbps, W)`.
    pub load_profile: Vec<(f64, f64)>,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::wedge()
    }
}

impl Calibration {
    pub fn wedge() -> Self {
        Self {
            num_active_ports: 10.0,
            idle_at_10g: 120.83,
            loaded_at_10g: 122.19,
            idle_at_25g: 122.86,
            loaded_at_25g: 126.14,
            load_profile: vec![
                (0.0, 133.11),
                (10.0, 134.12),
                (25.0, 135.61),
                (50.0, 138.07),
                (100.0, 144.53),
            ],
        }
    }

    /// Slope of the ordinary least-squares fit through the 100G load profile, in W/Gbps for all
    /// active ports together.
    pub fn profile_slope(&self) -> f64 {
        let n = self.load_profile.len() as f64;
        if n < 2.0 {
            return 0.0;
        }
        let mean_x = self.load_profile.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = self.load_profile.iter().map(|(_, y)| y).sum::<f64>() / n;
        let (sxy, sxx) = self
            .load_profile
            .iter()
            .fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
                (
                    sxy + (x - mean_x) * (y - mean_y),
                    sxx + (x - mean_x) * (x - mean_x),
                )
            });
        if sxx == 0.0 {
            0.0
        } else {
            sxy / sxx
        }
    }

    /// Dynamic power per port and Gbps at the given rate, as derived from the measurements.
    pub fn dynamic_power(&self, tier: RateTier) -> f64 {
        match tier {
            RateTier::Off => 0.0,
            RateTier::G10 => (self.loaded_at_10g - self.idle_at_10g) / 10.0 / self.num_active_ports,
            RateTier::G25 => (self.loaded_at_25g - self.idle_at_25g) / 25.0 / self.num_active_ports,
            RateTier::G100 => self.profile_slope() / self.num_active_ports,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tier_options() {
        assert_eq!(
            RateTier::options(false),
            vec![RateTier::G10, RateTier::G25, RateTier::G100]
        );
        assert_eq!(RateTier::options(true)[0], RateTier::Off);
        assert_eq!(RateTier::from_gbps(25), Some(RateTier::G25));
        assert_eq!(RateTier::from_gbps(50), None);
        assert_eq!(RateTier::G100.to_string(), "100");
    }

    #[test]
    fn wedge_coefficients() {
        let model = PowerModel::wedge();
        assert_eq!(model.static_power(RateTier::G100), 1.57);
        assert_eq!(model.dynamic_power(RateTier::G10), 0.014);
        assert_eq!(model.port_power(RateTier::Off, 42.0), 0.0);
        assert!((model.port_power(RateTier::G25, 10.0) - 0.65).abs() < 1e-12);
    }

    #[test]
    fn calibration_matches_model() {
        let calibration = Calibration::wedge();
        let model = PowerModel::wedge();

        assert!((calibration.profile_slope() - 0.1139).abs() < 1e-3);
        for tier in RateTier::iter() {
            let derived = calibration.dynamic_power(tier);
            // the model stores the derived values rounded to the third decimal
            assert!(
                (derived - model.dynamic_power(tier)).abs() < 6e-4,
                "{tier}: {derived}"
            );
        }
    }
}
