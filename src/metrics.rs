//! Metric tables for the three statistic groups.
//!
//! Each group is an explicit ordered list of `(name, accessor)` pairs, so
//! the set of metrics is closed at compile time and iteration order is
//! deterministic. The string names, concatenated with the group prefix, are
//! the interchange contract with report consumers and must not change.

use crate::observation::Observation;

/// Extracts one metric's numeric value from an observation. Boolean fields
/// map to 1.0/0.0.
pub type MetricFn = fn(&Observation) -> f64;

/// Sandstorm-period metrics, keyed under the `auto` prefix.
pub const AUTO_METRICS: &[(&str, MetricFn)] = &[
    ("cargoShipHatches", |o| f64::from(o.sandstorm.cargo_ship_hatches)),
    ("rocketHatches", |o| f64::from(o.sandstorm.rocket_hatches)),
    ("cargoShipCargo", |o| f64::from(o.sandstorm.cargo_ship_cargo)),
    ("rocketCargo", |o| f64::from(o.sandstorm.rocket_cargo)),
];

/// Tele-op metrics, keyed under the `tele` prefix.
pub const TELE_METRICS: &[(&str, MetricFn)] = &[
    ("cargoShipHatches", |o| f64::from(o.tele_op.cargo_ship_hatches)),
    ("rocketLevelOneHatches", |o| f64::from(o.tele_op.rocket_level_one_hatches)),
    ("rocketLevelTwoHatches", |o| f64::from(o.tele_op.rocket_level_two_hatches)),
    ("rocketLevelThreeHatches", |o| {
        f64::from(o.tele_op.rocket_level_three_hatches)
    }),
    ("cargoShipCargo", |o| f64::from(o.tele_op.cargo_ship_cargo)),
    ("rocketLevelOneCargo", |o| f64::from(o.tele_op.rocket_level_one_cargo)),
    ("rocketLevelTwoCargo", |o| f64::from(o.tele_op.rocket_level_two_cargo)),
    ("rocketLevelThreeCargo", |o| f64::from(o.tele_op.rocket_level_three_cargo)),
    ("numPartnerClimbAssists", |o| f64::from(o.tele_op.num_partner_climb_assists)),
];

/// Whole-match metrics, keyed without a prefix.
pub const OVERALL_METRICS: &[(&str, MetricFn)] = &[
    ("calculatedPointContribution", |o| o.calculated_point_contribution()),
    ("calculatedSandstormPoints", |o| o.calculated_sandstorm_points()),
    ("calculatedTeleOpPoints", |o| o.calculated_tele_op_points()),
    ("totalHatches", |o| f64::from(o.total_hatches())),
    ("totalCargo", |o| f64::from(o.total_cargo())),
];

/// All metric groups with their key prefixes, in aggregation order.
pub const METRIC_GROUPS: &[(&str, &[(&str, MetricFn)])] =
    &[("auto", AUTO_METRICS), ("tele", TELE_METRICS), ("", OVERALL_METRICS)];

/// Iterate every `(prefixed key, accessor)` pair across all groups.
pub fn prefixed_metrics() -> impl Iterator<Item = (String, MetricFn)> {
    METRIC_GROUPS.iter().flat_map(|(prefix, metrics)| {
        metrics
            .iter()
            .map(move |(name, f)| (format!("{prefix}{name}"), *f))
    })
}
