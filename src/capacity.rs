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
//! Bucketing of link loads into discrete capacity tiers.

use std::collections::BTreeMap;

/// Ordered set of capacity bounds a load can be bucketed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityTiers {
    bounds: Vec<u32>,
}

impl Default for CapacityTiers {
    fn default() -> Self {
        Self::standard()
    }
}

impl CapacityTiers {
    /// Tiers {10, 25, 100}.
    pub fn standard() -> Self {
        Self {
            bounds: vec![10, 25, 100],
        }
    }

    /// Tiers {0, 10, 25, 100}, where an idle link may sleep.
    pub fn with_sleeping() -> Self {
        Self {
            bounds: vec![0, 10, 25, 100],
        }
    }

    /// Tiers {10, 25, 50, 100}, filling the `below_50` column of the link histograms.
    pub fn fine() -> Self {
        Self {
            bounds: vec![10, 25, 50, 100],
        }
    }

    /// Build a custom tier set. Returns `None` if no bound is given.
    pub fn new(bounds: impl IntoIterator<Item = u32>) -> Option<Self> {
        let mut bounds: Vec<u32> = bounds.into_iter().collect();
        bounds.sort_unstable();
        bounds.dedup();
        (!bounds.is_empty()).then_some(Self { bounds })
    }

    pub fn bounds(&self) -> &[u32] {
        &self.bounds
    }

    pub fn max(&self) -> u32 {
        // never empty by construction
        self.bounds.last().copied().unwrap_or_default()
    }

    /// Smallest tier that is at least `load`, or the largest tier if `load` exceeds all of them.
    pub fn bound(&self, load: f64) -> u32 {
        self.bounds
            .iter()
            .copied()
            .find(|bound| load <= *bound as f64)
            .unwrap_or_else(|| self.max())
    }

    /// Histogram of `loads` over the tiers.
    pub fn count(&self, loads: impl IntoIterator<Item = f64>) -> TierCounts {
        let mut counts = TierCounts::new(self);
        for load in loads {
            counts.add(self.bound(load));
        }
        counts
    }
}

/// Number of observations per capacity tier. Tiers without observations count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierCounts {
    counts: BTreeMap<u32, usize>,
    total: usize,
}

impl TierCounts {
    pub fn new(tiers: &CapacityTiers) -> Self {
        Self {
            counts: tiers.bounds().iter().map(|bound| (*bound, 0)).collect(),
            total: 0,
        }
    }

    pub fn add(&mut self, bound: u32) {
        *self.counts.entry(bound).or_default() += 1;
        self.total += 1;
    }

    pub fn get(&self, bound: u32) -> usize {
        self.counts.get(&bound).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bounds() {
        let tiers = CapacityTiers::standard();
        assert_eq!(tiers.bound(0.0), 10);
        assert_eq!(tiers.bound(5.0), 10);
        assert_eq!(tiers.bound(10.0), 10);
        assert_eq!(tiers.bound(10.5), 25);
        assert_eq!(tiers.bound(24.0), 25);
        assert_eq!(tiers.bound(100.0), 100);
        assert_eq!(tiers.bound(150.0), 100);
    }

    #[test]
    fn bounds_with_sleeping() {
        let tiers = CapacityTiers::with_sleeping();
        assert_eq!(tiers.bound(0.0), 0);
        assert_eq!(tiers.bound(0.1), 10);
        assert_eq!(tiers.bound(30.0), 100);
    }

    #[test]
    fn custom_tiers_are_sorted() {
        let tiers = CapacityTiers::new([100, 25, 10, 25]).unwrap();
        assert_eq!(tiers, CapacityTiers::standard());
        assert!(CapacityTiers::new(Vec::new()).is_none());
    }

    #[test]
    fn missing_tiers_count_zero() {
        let tiers = CapacityTiers::standard();
        let counts = tiers.count([1.0, 2.0, 120.0]);
        assert_eq!(counts.get(10), 2);
        assert_eq!(counts.get(25), 0);
        assert_eq!(counts.get(100), 1);
        assert_eq!(counts.get(50), 0);
        assert_eq!(counts.total(), 3);
    }
}
