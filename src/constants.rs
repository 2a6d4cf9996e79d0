/// Points for crossing the HAB line, indexed by starting level (1-based).
pub const CROSS_POINT_VALUES: [f64; 2] = [3.0, 6.0];

/// Points for a successful HAB climb, indexed by climb level (1-based).
pub const CLIMB_POINT_VALUES: [f64; 3] = [3.0, 6.0, 12.0];

/// Points per hatch panel placed.
pub const HATCH_POINT_VALUE: f64 = 2.0;

/// Points per cargo scored.
pub const CARGO_POINT_VALUE: f64 = 3.0;

/// Points for a hatch panel placed on the cargo ship during the sandstorm.
/// Includes the cargo pre-populating the bay behind it.
pub const SANDSTORM_CARGO_SHIP_HATCH_VALUE: f64 = 5.0;

/// Points for a hatch panel placed on the rocket during the sandstorm.
pub const SANDSTORM_ROCKET_HATCH_VALUE: f64 = 2.0;

/// Number of bays on the cargo ship available to one alliance.
pub const CARGO_SHIP_CAPACITY: f64 = 8.0;

/// Game pieces of one kind that fit on one rocket level.
pub const ROCKET_LEVEL_CAPACITY: f64 = 4.0;

/// Per-level target when chasing the rocket ranking point
/// (one full rocket, i.e. two of each piece per level).
pub const ROCKET_RP_LEVEL_CAPACITY: f64 = 2.0;

/// Alliance climb points needed for the HAB docking ranking point.
pub const CLIMB_RP_THRESHOLD: f64 = 15.0;

/// Ranking points awarded for a qualification match win.
pub const WIN_RP_VALUE: f64 = 2.0;

/// Upper bound on intentionally omitted (null) hatch panels.
pub const MAX_NULL_HATCHES: f64 = 6.0;

/// Confidence level for the upper bound on cargo ship hatch output when
/// computing null hatch panels. A value of 0.8 means the null panel count
/// would cap the alliance's scoring in roughly 20% of its matches.
pub const NULL_HATCH_CONFIDENCE: f64 = 0.8;

/// Number of Monte Carlo draws used to estimate standard deviations of the
/// tele-op projection. More draws give better accuracy at linear cost.
pub const MONTE_CARLO_ITERATIONS: usize = 1000;

/// Share of observations a quick comment must appear in before it is
/// treated as a trait of the team rather than a one-off.
pub const FREQUENT_COMMENT_RATIO: f64 = 0.25;

/// Map-key fragments for the HAB levels, plus the cross-level total.
pub const LEVEL_PREFIXES: [&str; 4] = ["levelOne", "levelTwo", "levelThree", "total"];

/// Capitalized level names used inside composite metric keys
/// (e.g. `teleRocketLevelOneHatches`).
pub const LEVEL_NAMES: [&str; 3] = ["One", "Two", "Three"];
