//! Alliance-level predictions built from three team reports.

use std::collections::HashMap;

use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::constants::{
    CARGO_POINT_VALUE, CARGO_SHIP_CAPACITY, CLIMB_POINT_VALUES, CLIMB_RP_THRESHOLD,
    CROSS_POINT_VALUES, HATCH_POINT_VALUE, LEVEL_NAMES, LEVEL_PREFIXES, MAX_NULL_HATCHES,
    MONTE_CARLO_ITERATIONS, NULL_HATCH_CONFIDENCE, ROCKET_LEVEL_CAPACITY,
    ROCKET_RP_LEVEL_CAPACITY, SANDSTORM_CARGO_SHIP_HATCH_VALUE, SANDSTORM_ROCKET_HATCH_VALUE,
    WIN_RP_VALUE,
};
use crate::metrics::prefixed_metrics;
use crate::observation::GamePiece;
use crate::stats;
use crate::team::TeamReport;

use GamePiece::{Cargo, Hatch};

/// Feasible HAB starting-level assignments: no more than two robots may
/// start on level 2. Order matters; exact ties go to the later candidate.
const STARTING_LEVEL_COMBOS: [[u8; 3]; 6] =
    [[2, 2, 1], [2, 1, 2], [1, 2, 2], [1, 1, 2], [1, 2, 1], [1, 1, 1]];

/// All sandstorm starting game piece assignments across the three positions.
const GAME_PIECE_COMBOS: [[GamePiece; 3]; 8] = [
    [Hatch, Hatch, Hatch],
    [Hatch, Hatch, Cargo],
    [Hatch, Cargo, Hatch],
    [Hatch, Cargo, Cargo],
    [Cargo, Hatch, Hatch],
    [Cargo, Hatch, Cargo],
    [Cargo, Cargo, Hatch],
    [Cargo, Cargo, Cargo],
];

/// Feasible endgame climb assignments: at most one robot on HAB level 3
/// and at most two on level 2.
const CLIMB_LEVEL_COMBOS: [[u8; 3]; 19] = [
    [1, 1, 1],
    [1, 1, 2],
    [1, 1, 3],
    [1, 2, 1],
    [1, 2, 2],
    [1, 2, 3],
    [1, 3, 1],
    [1, 3, 2],
    [2, 1, 1],
    [2, 1, 2],
    [2, 1, 3],
    [2, 2, 1],
    [2, 2, 3],
    [2, 3, 1],
    [2, 3, 2],
    [3, 1, 1],
    [3, 1, 2],
    [3, 2, 1],
    [3, 2, 2],
];

/// Tele-op metrics whose standard deviations come from Monte Carlo draws.
const SIMULATED_METRICS: [&str; 9] = [
    "telePoints",
    "teleRocketLevelOneHatches",
    "teleRocketLevelOneCargo",
    "teleRocketLevelTwoHatches",
    "teleRocketLevelTwoCargo",
    "teleRocketLevelThreeHatches",
    "teleRocketLevelThreeCargo",
    "teleCargoShipHatches",
    "teleCargoShipCargo",
];

/// One Monte Carlo draw: an independent random sample per alliance member.
type Draw = [HashMap<String, f64>; 3];

/// Score predictions, uncertainty estimates, and ranking point probabilities
/// for an in-match alliance of exactly three teams.
///
/// Everything is computed once at construction; all accessors afterwards are
/// read-only. Pass a seed for reproducible Monte Carlo estimates, `None` for
/// an entropy-seeded run.
#[derive(Clone, Debug)]
pub struct AllianceReport {
    teams: [TeamReport; 3],
    /// Mean observation count across the three member teams.
    avg_sample_size: f64,
    expected_values: HashMap<String, f64>,
    predicted_values: HashMap<String, f64>,
    standard_deviations: HashMap<String, f64>,
    best_starting_levels: [u8; 3],
    best_climb_levels: [u8; 3],
    best_sandstorm_game_pieces: [GamePiece; 3],
}

impl AllianceReport {
    pub fn new(teams: [TeamReport; 3], seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };

        let avg_sample_size =
            teams.iter().map(|t| t.sample_size() as f64).sum::<f64>() / teams.len() as f64;

        let mut report = AllianceReport {
            teams,
            avg_sample_size,
            expected_values: HashMap::new(),
            predicted_values: HashMap::new(),
            standard_deviations: HashMap::new(),
            best_starting_levels: [1, 1, 1],
            best_climb_levels: [1, 1, 1],
            best_sandstorm_game_pieces: [Hatch, Hatch, Hatch],
        };

        report.compute(&mut rng);
        report
    }

    fn compute(&mut self, rng: &mut ChaCha8Rng) {
        self.calculate_expected_values();

        let sandstorm_points = self.calculate_predicted_sandstorm_points();
        let tele_op_points = self.calculate_predicted_tele_op_points();
        let endgame_points = self.calculate_predicted_endgame_points();

        let draws = self.generate_monte_carlo_set(rng, MONTE_CARLO_ITERATIONS);
        self.calculate_standard_deviations(&draws);
        self.calculate_predicted_rp(&draws);
        self.calculate_optimal_null_hatches(NULL_HATCH_CONFIDENCE);

        self.predicted_values.insert(
            "totalPoints".to_string(),
            sandstorm_points + tele_op_points + endgame_points,
        );

        debug!(
            "alliance [{}, {}, {}]: start {:?}, pieces {:?}, climb {:?}, {:.1} predicted points",
            self.teams[0].team_num(),
            self.teams[1].team_num(),
            self.teams[2].team_num(),
            self.best_starting_levels,
            self.best_sandstorm_game_pieces,
            self.best_climb_levels,
            get(&self.predicted_values, "totalPoints"),
        );
    }

    /// Expected value of each metric: the sum of the member teams' means,
    /// assuming independent contributions.
    fn calculate_expected_values(&mut self) {
        for (key, _) in prefixed_metrics() {
            let expected: f64 = self.teams.iter().map(|t| t.average(&key).unwrap_or(0.0)).sum();
            self.expected_values.insert(key, expected);
        }
    }

    fn calculate_predicted_sandstorm_points(&mut self) -> f64 {
        let points =
            self.calculate_predicted_sandstorm_bonus() + self.calculate_predicted_game_piece_points();
        self.predicted_values.insert("sandstormPoints".to_string(), points);
        points
    }

    /// Pick the starting-level assignment with the greatest expected HAB
    /// crossing bonus.
    fn calculate_predicted_sandstorm_bonus(&mut self) -> f64 {
        let mut best_score = 0.0;

        for combo in STARTING_LEVEL_COMBOS {
            let mut score = 0.0;
            for (i, &level) in combo.iter().enumerate() {
                let rate = self.rate(i, &format!("{}Cross", LEVEL_PREFIXES[level as usize - 1]));
                score += CROSS_POINT_VALUES[level as usize - 1] * rate;
            }

            if score >= best_score {
                best_score = score;
                self.best_starting_levels = combo;
            }
        }

        self.predicted_values.insert("sandstormBonus".to_string(), best_score);
        best_score
    }

    /// Pick the starting game piece assignment with the greatest expected
    /// sandstorm placement points, and record the winning assignment's
    /// placement breakdown for the tele-op cascade.
    ///
    /// Placement modeling assumptions: a team's attempt-success rate is
    /// location-independent, each robot places at most one piece during the
    /// sandstorm, at most two hatches go on the front cargo ship bays, and
    /// hatched bays are pre-populated with cargo.
    fn calculate_predicted_game_piece_points(&mut self) -> f64 {
        let mut best_score = 0.0;

        for combo in GAME_PIECE_COMBOS {
            let mut cargo_ship_cargo = 0.0;
            let mut cargo_ship_hatches = 0.0;
            let mut rocket_hatches = 0.0;
            let mut front_bays_used = 0;

            for (i, piece) in combo.iter().enumerate() {
                match piece {
                    Hatch => {
                        let rate = self.rate(i, "hatchAutoSuccess");
                        if self.ability(i, "frontCargoShipHatchSandstorm") && front_bays_used < 2 {
                            cargo_ship_hatches += rate;
                            front_bays_used += 1;
                        } else if self.ability(i, "sideCargoShipHatchSandstorm") {
                            cargo_ship_hatches += rate;
                        } else if self.ability(i, "rocketHatchSandstorm") {
                            rocket_hatches += rate;
                        }
                    }
                    Cargo => {
                        cargo_ship_cargo += self.rate(i, "cargoAutoSuccess");
                    }
                }
            }

            let score = SANDSTORM_CARGO_SHIP_HATCH_VALUE * cargo_ship_hatches
                + CARGO_POINT_VALUE * cargo_ship_cargo
                + SANDSTORM_ROCKET_HATCH_VALUE * rocket_hatches;

            if score >= best_score {
                best_score = score;
                self.best_sandstorm_game_pieces = combo;

                self.predicted_values
                    .insert("autoCargoShipCargo".to_string(), cargo_ship_cargo);
                self.predicted_values
                    .insert("autoCargoShipHatches".to_string(), cargo_ship_hatches);
                self.predicted_values
                    .insert("autoRocketHatches".to_string(), rocket_hatches);
                self.predicted_values.insert("autoRocketCargo".to_string(), 0.0);
            }
        }

        self.predicted_values
            .insert("sandstormGamePiecePoints".to_string(), best_score);
        best_score
    }

    fn calculate_predicted_tele_op_points(&mut self) -> f64 {
        Self::project_tele_op(&self.expected_values, &mut self.predicted_values)
    }

    /// Pick the climb assignment with the greatest expected endgame points.
    fn calculate_predicted_endgame_points(&mut self) -> f64 {
        let mut best_points = 0.0;

        for combo in CLIMB_LEVEL_COMBOS {
            let mut points = 0.0;
            for (i, &level) in combo.iter().enumerate() {
                let rate = self.rate(i, &format!("level{}Climb", LEVEL_NAMES[level as usize - 1]));
                points += CLIMB_POINT_VALUES[level as usize - 1] * rate;
            }

            if points >= best_points {
                best_points = points;
                self.best_climb_levels = combo;
            }
        }

        self.predicted_values.insert("endgamePoints".to_string(), best_points);
        best_points
    }

    /// Distribute expected tele-op hatch supply over the rocket levels from
    /// the top down, spilling excess to the next level and finally to the
    /// cargo ship. Returns the total hatches placed.
    ///
    /// Under the RP-seeking policy the per-level cap tightens from a full
    /// level to the two panels needed for a complete rocket.
    fn project_hatches(
        expected: &HashMap<String, f64>,
        predicted: &mut HashMap<String, f64>,
        rp_seeking: bool,
    ) -> f64 {
        let mut excess = 0.0;
        let mut total = 0.0;

        for i in (0..3).rev() {
            let mut cap = if rp_seeking {
                ROCKET_RP_LEVEL_CAPACITY
            } else {
                ROCKET_LEVEL_CAPACITY
            };

            if i == 0 {
                // Cargo ship hatches are interchangeable with level 1
                // hatches, and sandstorm rocket hatches consume level 1 slots
                excess += get(expected, "telecargoShipHatches");
                cap = (cap - get(predicted, "autoRocketHatches")).max(0.0);
            }

            let supply = get(expected, &format!("telerocketLevel{}Hatches", LEVEL_NAMES[i]));
            let key = format!("teleRocketLevel{}Hatches", LEVEL_NAMES[i]);

            if excess + supply > cap {
                excess += supply - cap;
                predicted.insert(key, cap);
                total += cap;
            } else {
                predicted.insert(key, supply + excess);
                total += supply + excess;
                excess = 0.0;
            }
        }

        let cargo_ship_hatches =
            excess.min(CARGO_SHIP_CAPACITY - get(predicted, "autoCargoShipHatches"));
        predicted.insert("teleCargoShipHatches".to_string(), cargo_ship_hatches);
        predicted.insert(
            "cargoShipHatches".to_string(),
            cargo_ship_hatches + get(predicted, "autoCargoShipHatches"),
        );
        predicted.insert(
            "rocketLevelOneHatches".to_string(),
            get(predicted, "teleRocketLevelOneHatches") + get(predicted, "autoRocketHatches"),
        );

        total += cargo_ship_hatches;
        predicted.insert("teleHatches".to_string(), total);
        predicted.insert("teleHatchPoints".to_string(), HATCH_POINT_VALUE * total);

        total
    }

    /// Distribute expected tele-op cargo over the rocket levels, capped at
    /// each level by the hatches predicted there (a bay without a panel
    /// cannot hold cargo), then spill to the cargo ship.
    fn project_cargo(
        expected: &HashMap<String, f64>,
        predicted: &mut HashMap<String, f64>,
        rp_seeking: bool,
    ) -> f64 {
        let base_cap = if rp_seeking {
            ROCKET_RP_LEVEL_CAPACITY
        } else {
            ROCKET_LEVEL_CAPACITY
        };

        let mut excess = 0.0;
        let mut total = 0.0;

        for i in (0..3).rev() {
            let mut cap =
                base_cap.min(get(predicted, &format!("teleRocketLevel{}Hatches", LEVEL_NAMES[i])));

            if i == 0 {
                // Cargo ship cargo is interchangeable with level 1 cargo, and
                // sandstorm rocket hatches also open level 1 bays
                excess += get(expected, "telecargoShipCargo");
                cap = base_cap.min(
                    get(predicted, "teleRocketLevelOneHatches") + get(predicted, "autoRocketHatches"),
                );
            }

            let supply = get(expected, &format!("telerocketLevel{}Cargo", LEVEL_NAMES[i]));
            let key = format!("teleRocketLevel{}Cargo", LEVEL_NAMES[i]);

            if excess + supply > cap {
                excess += supply - cap;
                predicted.insert(key, cap);
                total += cap;
            } else {
                predicted.insert(key, supply + excess);
                total += supply + excess;
                excess = 0.0;
            }
        }

        // Not capped by hatch panels: null hatch bays still accept cargo, and
        // sandstorm hatch bays start pre-populated
        let cargo_ship_cargo = excess.min(
            CARGO_SHIP_CAPACITY
                - get(predicted, "autoCargoShipCargo")
                - get(predicted, "autoCargoShipHatches"),
        );
        predicted.insert("teleCargoShipCargo".to_string(), cargo_ship_cargo);

        total += cargo_ship_cargo;
        predicted.insert("teleCargo".to_string(), total);
        predicted.insert("teleCargoPoints".to_string(), CARGO_POINT_VALUE * total);
        predicted.insert(
            "cargoShipCargo".to_string(),
            cargo_ship_cargo + get(predicted, "autoCargoShipCargo"),
        );
        predicted.insert(
            "rocketLevelOneCargo".to_string(),
            get(predicted, "teleRocketLevelOneCargo"),
        );

        total
    }

    /// Full tele-op projection: hatches, then cargo capped by them.
    fn project_tele_op(expected: &HashMap<String, f64>, predicted: &mut HashMap<String, f64>) -> f64 {
        let hatches = Self::project_hatches(expected, predicted, false);
        let cargo = Self::project_cargo(expected, predicted, false);

        let points = HATCH_POINT_VALUE * hatches + CARGO_POINT_VALUE * cargo;
        predicted.insert("telePoints".to_string(), points);
        points
    }

    /// Draw `iterations` joint samples, one random sample per member team.
    ///
    /// Sampling is sequential on the owned RNG so a fixed seed reproduces
    /// the exact draw set; evaluation of the draws may run in parallel.
    fn generate_monte_carlo_set(&self, rng: &mut ChaCha8Rng, iterations: usize) -> Vec<Draw> {
        (0..iterations)
            .map(|_| {
                [
                    self.teams[0].generate_random_sample(rng),
                    self.teams[1].generate_random_sample(rng),
                    self.teams[2].generate_random_sample(rng),
                ]
            })
            .collect()
    }

    /// Alliance expected values under one draw: per-metric sum of the three
    /// sampled team values.
    fn combine_draw(draw: &Draw) -> HashMap<String, f64> {
        let mut combined = HashMap::new();
        for (key, _) in prefixed_metrics() {
            let sum: f64 = draw.iter().map(|sample| get(sample, &key)).sum();
            combined.insert(key, sum);
        }
        combined
    }

    fn calculate_standard_deviations(&mut self, draws: &[Draw]) {
        let sandstorm_std_dev = self.calculate_std_dev_sandstorm_points();
        let tele_op_std_dev = self.calculate_std_dev_tele_op_points(draws);
        let endgame_std_dev = self.calculate_std_dev_endgame_points();

        self.standard_deviations.insert(
            "totalPoints".to_string(),
            stats::sum_std_dev(&[sandstorm_std_dev, tele_op_std_dev, endgame_std_dev]),
        );
    }

    /// Closed-form sandstorm uncertainty: the chosen assignments are linear
    /// combinations of independent per-team success rates.
    fn calculate_std_dev_sandstorm_points(&mut self) -> f64 {
        let mut bonus_variance = 0.0;

        for (i, &level) in self.best_starting_levels.iter().enumerate() {
            let sd = self.member_std_dev(i, &format!("level{}Cross", LEVEL_NAMES[level as usize - 1]));
            bonus_variance += stats::scaled_variance(CROSS_POINT_VALUES[level as usize - 1], sd);
        }

        self.standard_deviations
            .insert("sandstormBonus".to_string(), bonus_variance.sqrt());

        let mut game_piece_variance = 0.0;
        let mut hatch_variance = 0.0;

        for (i, piece) in self.best_sandstorm_game_pieces.iter().enumerate() {
            match piece {
                Hatch => {
                    let sd = self.member_std_dev(i, "hatchAutoSuccess");
                    game_piece_variance +=
                        stats::scaled_variance(SANDSTORM_CARGO_SHIP_HATCH_VALUE, sd);
                    hatch_variance += sd.powi(2);
                }
                Cargo => {
                    let sd = self.member_std_dev(i, "cargoAutoSuccess");
                    game_piece_variance += stats::scaled_variance(CARGO_POINT_VALUE, sd);
                }
            }
        }

        self.standard_deviations
            .insert("autoCargoShipHatches".to_string(), hatch_variance.sqrt());
        self.standard_deviations
            .insert("sandstormGamePiecePoints".to_string(), game_piece_variance.sqrt());

        let sandstorm_std_dev = (bonus_variance + game_piece_variance).sqrt();
        self.standard_deviations
            .insert("sandstormPoints".to_string(), sandstorm_std_dev);

        sandstorm_std_dev
    }

    /// Monte Carlo uncertainty for the tele-op phase, whose capacity-capped
    /// cascade is a non-linear function of the random inputs. Each draw
    /// replaces the alliance expected values with sampled ones, re-runs the
    /// projection, and the per-metric sample spread across draws becomes the
    /// estimated standard deviation. The report's own expected and predicted
    /// values are never touched.
    fn calculate_std_dev_tele_op_points(&mut self, draws: &[Draw]) -> f64 {
        let base_predicted = self.predicted_values.clone();

        let per_draw: Vec<HashMap<String, f64>> = draws
            .par_iter()
            .map(|draw| {
                let sampled_expected = Self::combine_draw(draw);
                let mut predicted = base_predicted.clone();
                Self::project_tele_op(&sampled_expected, &mut predicted);
                predicted
            })
            .collect();

        for metric in SIMULATED_METRICS {
            let outcomes: Vec<f64> = per_draw.iter().map(|p| get(p, metric)).collect();
            self.standard_deviations
                .insert(metric.to_string(), stats::sample_std_dev(&outcomes));
        }

        debug!("monte carlo: {} draws evaluated for tele-op spread", draws.len());

        get(&self.standard_deviations, "telePoints")
    }

    fn calculate_std_dev_endgame_points(&mut self) -> f64 {
        let mut endgame_variance = 0.0;

        for (i, &level) in self.best_climb_levels.iter().enumerate() {
            let sd = self.member_std_dev(i, &format!("level{}Climb", LEVEL_NAMES[level as usize - 1]));
            endgame_variance += stats::scaled_variance(CLIMB_POINT_VALUES[level as usize - 1], sd);
        }

        let endgame_std_dev = endgame_variance.sqrt();
        self.standard_deviations
            .insert("endgamePoints".to_string(), endgame_std_dev);

        endgame_std_dev
    }

    fn calculate_predicted_rp(&mut self, draws: &[Draw]) {
        let bonus_rp = self.calculate_climb_rp_chance() + self.calculate_rocket_rp_chance(draws);
        self.predicted_values.insert("bonusRp".to_string(), bonus_rp);
    }

    /// Exact probability of the HAB docking ranking point: enumerate all
    /// 2³ climb outcomes under the chosen assignment and sum the probability
    /// of those reaching the point threshold.
    fn calculate_climb_rp_chance(&mut self) -> f64 {
        let mut rp_chance = 0.0;

        for outcome in 0..8u32 {
            let climbed = [outcome & 1 != 0, outcome & 2 != 0, outcome & 4 != 0];

            let points: f64 = climbed
                .iter()
                .zip(self.best_climb_levels)
                .map(|(&success, level)| {
                    if success {
                        CLIMB_POINT_VALUES[level as usize - 1]
                    } else {
                        0.0
                    }
                })
                .sum();

            if points >= CLIMB_RP_THRESHOLD {
                let mut probability = 1.0;
                for (i, &success) in climbed.iter().enumerate() {
                    let level = self.best_climb_levels[i];
                    let rate = self.rate(i, &format!("level{}Climb", LEVEL_NAMES[level as usize - 1]));
                    probability *= if success { rate } else { 1.0 - rate };
                }
                rp_chance += probability;
            }
        }

        self.predicted_values.insert("climbRp".to_string(), rp_chance);
        rp_chance
    }

    /// Estimated probability of the rocket ranking point: the fraction of
    /// Monte Carlo draws in which every rocket level fills with two hatches
    /// and two cargo under the RP-seeking cascade. Sandstorm rocket pieces
    /// count toward level 1.
    fn calculate_rocket_rp_chance(&mut self, draws: &[Draw]) -> f64 {
        let base_predicted = self.predicted_values.clone();

        let attained = draws
            .par_iter()
            .filter(|draw| {
                let sampled_expected = Self::combine_draw(draw);
                let mut predicted = base_predicted.clone();
                Self::project_hatches(&sampled_expected, &mut predicted, true);
                Self::project_cargo(&sampled_expected, &mut predicted, true);

                LEVEL_NAMES.iter().enumerate().all(|(level, name)| {
                    ["Hatches", "Cargo"].iter().all(|piece| {
                        let sandstorm_credit = if level == 0 {
                            get(&predicted, &format!("autoRocket{piece}"))
                        } else {
                            0.0
                        };
                        let threshold = ROCKET_RP_LEVEL_CAPACITY - sandstorm_credit;
                        get(&predicted, &format!("teleRocketLevel{name}{piece}")) >= threshold
                    })
                })
            })
            .count();

        let rp_chance = if draws.is_empty() {
            0.0
        } else {
            attained as f64 / draws.len() as f64
        };

        self.predicted_values.insert("rocketRp".to_string(), rp_chance);
        rp_chance
    }

    /// How many cargo ship bays to leave without hatch panels (null panels),
    /// from an upper confidence bound on the alliance's hatch output. With an
    /// average sample size of one or less the raw mean stands in for the
    /// bound.
    fn calculate_optimal_null_hatches(&mut self, confidence_level: f64) {
        let mean =
            get(&self.predicted_values, "autoCargoShipHatches") + get(&self.predicted_values, "teleCargoShipHatches");

        let std_dev = stats::sum_std_dev(&[
            get(&self.standard_deviations, "autoCargoShipHatches"),
            get(&self.standard_deviations, "teleCargoShipHatches"),
        ]);

        let optimistic_hatches = if self.avg_sample_size > 1.0 {
            stats::inverse_t_value(confidence_level, self.avg_sample_size, mean, std_dev)
        } else {
            mean
        };

        let null_hatches = (CARGO_SHIP_CAPACITY - optimistic_hatches).clamp(0.0, MAX_NULL_HATCHES);
        self.predicted_values
            .insert("optimalNullHatches".to_string(), null_hatches);
    }

    /// Probability that this alliance outscores `opponent`, from a Welch
    /// two-sample t-test on the total point predictions.
    pub fn win_chance(&self, opponent: &AllianceReport) -> f64 {
        let own_standard_error = stats::standard_error(
            get(&self.standard_deviations, "totalPoints"),
            self.avg_sample_size,
        );
        let opposing_standard_error = stats::standard_error(
            get(&opponent.standard_deviations, "totalPoints"),
            opponent.avg_sample_size,
        );

        let t_score = stats::two_sample_t_score(
            get(&self.predicted_values, "totalPoints"),
            own_standard_error,
            get(&opponent.predicted_values, "totalPoints"),
            opposing_standard_error,
        );
        let degrees_of_freedom = stats::two_sample_degrees_of_freedom(
            own_standard_error,
            self.avg_sample_size,
            opposing_standard_error,
            opponent.avg_sample_size,
        );

        stats::t_cumulative_distribution(degrees_of_freedom, t_score)
    }

    /// Expected ranking points in a match against `opponent`: the bonus RP
    /// probabilities plus the win RP value weighted by the win chance.
    pub fn predicted_ranking_points(&self, opponent: &AllianceReport) -> f64 {
        get(&self.predicted_values, "bonusRp") + WIN_RP_VALUE * self.win_chance(opponent)
    }

    /// Predicted value of a metric, `None` if the metric is not part of the
    /// prediction output.
    pub fn predicted_value(&self, metric: &str) -> Option<f64> {
        self.predicted_values.get(metric).copied()
    }

    /// Alliance expected value (sum of member means) of a metric.
    pub fn expected_value(&self, metric: &str) -> Option<f64> {
        self.expected_values.get(metric).copied()
    }

    /// Estimated standard deviation of a predicted metric.
    pub fn standard_deviation(&self, metric: &str) -> Option<f64> {
        self.standard_deviations.get(metric).copied()
    }

    /// Chosen HAB starting level per alliance position.
    pub fn best_starting_levels(&self) -> [u8; 3] {
        self.best_starting_levels
    }

    /// Chosen endgame climb level per alliance position.
    pub fn best_climb_levels(&self) -> [u8; 3] {
        self.best_climb_levels
    }

    /// Chosen sandstorm starting game piece per alliance position.
    pub fn best_sandstorm_game_pieces(&self) -> [GamePiece; 3] {
        self.best_sandstorm_game_pieces
    }

    pub fn avg_sample_size(&self) -> f64 {
        self.avg_sample_size
    }

    pub fn teams(&self) -> &[TeamReport; 3] {
        &self.teams
    }

    /// Multi-line summary: the member teams followed by every predicted
    /// metric in alphabetical order, rounded for display.
    pub fn quick_report(&self) -> String {
        let mut out = String::new();

        for team in &self.teams {
            out.push_str(&format!("Team {}", team.team_num()));
            if !team.team_name().is_empty() {
                out.push_str(&format!(" - {}", team.team_name()));
            }
            out.push('\n');
        }

        let mut keys: Vec<&String> = self.predicted_values.keys().collect();
        keys.sort();

        for key in keys {
            out.push_str(&format!("{}: {}\n", key, stats::round(self.predicted_values[key], 2)));
        }

        out
    }

    fn rate(&self, member: usize, metric: &str) -> f64 {
        self.teams[member].attempt_success_rate(metric).unwrap_or(0.0)
    }

    fn member_std_dev(&self, member: usize, metric: &str) -> f64 {
        self.teams[member].std_dev(metric).unwrap_or(0.0)
    }

    fn ability(&self, member: usize, name: &str) -> bool {
        self.teams[member].ability(name).unwrap_or(false)
    }
}

fn get(map: &HashMap<String, f64>, key: &str) -> f64 {
    map.get(key).copied().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::{Observation, PostMatch, PreMatch, Sandstorm, TeleOp};
    use proptest::prelude::*;

    /// Observation with a level 1 cross, one sandstorm cargo ship hatch, one
    /// tele-op piece on rocket level 1 of each kind, and a level 1 climb.
    fn baseline_observation() -> Observation {
        Observation {
            pre_match: PreMatch {
                starting_level: 1,
                starting_game_piece: Some(GamePiece::Hatch),
                ..Default::default()
            },
            sandstorm: Sandstorm {
                cargo_ship_hatches: 1,
                cross_hab_line: true,
                ..Default::default()
            },
            tele_op: TeleOp {
                rocket_level_one_hatches: 1,
                rocket_level_one_cargo: 1,
                attempt_hab_climb: true,
                attempt_hab_climb_level: 1,
                success_hab_climb: true,
                success_hab_climb_level: 1,
                ..Default::default()
            },
            post_match: PostMatch::default(),
        }
    }

    fn uniform_team(team_num: u32, observation: Observation, copies: usize) -> TeamReport {
        let mut report = TeamReport::new(team_num);
        for _ in 0..copies {
            report.add_observation(observation.clone());
        }
        report.process();
        report
    }

    /// Team whose level `level` cross succeeds in `crosses` of `matches`
    /// matches.
    fn crossing_team(team_num: u32, level: u8, crosses: usize, matches: usize) -> TeamReport {
        let mut report = TeamReport::new(team_num);
        for i in 0..matches {
            let mut obs = baseline_observation();
            obs.pre_match.starting_level = level;
            obs.sandstorm.cross_hab_line = i < crosses;
            report.add_observation(obs);
        }
        report.process();
        report
    }

    fn deterministic_alliance() -> AllianceReport {
        AllianceReport::new(
            [
                uniform_team(1, baseline_observation(), 2),
                uniform_team(2, baseline_observation(), 2),
                uniform_team(3, baseline_observation(), 2),
            ],
            Some(42),
        )
    }

    #[test]
    fn test_expected_values_sum_member_means() {
        let alliance = deterministic_alliance();

        assert!((alliance.expected_value("autocargoShipHatches").unwrap() - 3.0).abs() < 1e-10);
        assert!((alliance.expected_value("telerocketLevelOneHatches").unwrap() - 3.0).abs() < 1e-10);
        assert!((alliance.expected_value("telerocketLevelOneCargo").unwrap() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_variance_predictions_match_hand_computation() {
        let alliance = deterministic_alliance();

        // All three cross from level 1 with certainty: 3 + 3 + 3
        assert_eq!(alliance.best_starting_levels(), [1, 1, 1]);
        assert!((alliance.predicted_value("sandstormBonus").unwrap() - 9.0).abs() < 1e-10);

        // No placement abilities were observed, so sandstorm pieces score 0
        assert_eq!(alliance.predicted_value("sandstormGamePiecePoints"), Some(0.0));

        // Three expected hatches and cargo flow onto rocket level 1 untouched
        assert!((alliance.predicted_value("teleRocketLevelOneHatches").unwrap() - 3.0).abs() < 1e-10);
        assert!((alliance.predicted_value("teleRocketLevelOneCargo").unwrap() - 3.0).abs() < 1e-10);
        assert!((alliance.predicted_value("telePoints").unwrap() - 15.0).abs() < 1e-10);

        // Certain level 1 climbs for everyone
        assert_eq!(alliance.best_climb_levels(), [1, 1, 1]);
        assert!((alliance.predicted_value("endgamePoints").unwrap() - 9.0).abs() < 1e-10);

        assert!((alliance.predicted_value("totalPoints").unwrap() - 33.0).abs() < 1e-10);

        // Identical observations leave no spread anywhere
        assert_eq!(alliance.standard_deviation("totalPoints"), Some(0.0));
        assert_eq!(alliance.standard_deviation("telePoints"), Some(0.0));

        // 9 climb points cannot reach the 15 point RP threshold
        assert_eq!(alliance.predicted_value("climbRp"), Some(0.0));

        // Zero cargo ship hatches predicted, so all six null panels fit
        assert_eq!(alliance.predicted_value("optimalNullHatches"), Some(6.0));
    }

    #[test]
    fn test_starting_level_optimizer_picks_best_literal_combo() {
        // Cross rates 0.9, 0.5, 0.1, all from level 1
        let alliance = AllianceReport::new(
            [
                crossing_team(1, 1, 9, 10),
                crossing_team(2, 1, 5, 10),
                crossing_team(3, 1, 1, 10),
            ],
            Some(7),
        );

        // With no level 2 data, [1, 1, 1] maximizes 3·(0.9 + 0.5 + 0.1)
        assert_eq!(alliance.best_starting_levels(), [1, 1, 1]);
        assert!((alliance.predicted_value("sandstormBonus").unwrap() - 4.5).abs() < 1e-10);
    }

    #[test]
    fn test_game_piece_tie_break_favors_later_combo() {
        // Every team places a sandstorm hatch with certainty and can reach
        // the front cargo ship, but only two front bays exist
        let mut obs = baseline_observation();
        obs.sandstorm.front_cargo_ship_hatch_capable = true;

        let alliance = AllianceReport::new(
            [
                uniform_team(1, obs.clone(), 2),
                uniform_team(2, obs.clone(), 2),
                uniform_team(3, obs, 2),
            ],
            Some(7),
        );

        // HHH, HHC, HCH and CHH all score 10; the last enumerated wins
        assert_eq!(alliance.best_sandstorm_game_pieces(), [Cargo, Hatch, Hatch]);
        assert!((alliance.predicted_value("sandstormGamePiecePoints").unwrap() - 10.0).abs() < 1e-10);
        assert!((alliance.predicted_value("autoCargoShipHatches").unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_certain_high_climbs_guarantee_climb_rp() {
        // Every match ends in a successful level 3 climb attempt
        let mut obs = baseline_observation();
        obs.tele_op.attempt_hab_climb_level = 3;
        obs.tele_op.success_hab_climb_level = 3;

        let alliance = AllianceReport::new(
            [
                uniform_team(1, obs.clone(), 2),
                uniform_team(2, obs.clone(), 2),
                uniform_team(3, obs, 2),
            ],
            Some(7),
        );

        // Constraint allows one level 3 climber; 12 + 3 + 3 falls short of
        // 15 only if the optimizer mixes levels wrong
        let levels = alliance.best_climb_levels();
        assert_eq!(levels.iter().filter(|&&l| l == 3).count(), 1);

        let rp = alliance.predicted_value("climbRp").unwrap();
        assert!((0.0..=1.0).contains(&rp));
    }

    #[test]
    fn test_win_chance_symmetry() {
        let strong = AllianceReport::new(
            [
                crossing_team(1, 1, 9, 10),
                crossing_team(2, 1, 8, 10),
                crossing_team(3, 1, 7, 10),
            ],
            Some(1),
        );
        let weak = AllianceReport::new(
            [
                crossing_team(4, 1, 3, 10),
                crossing_team(5, 1, 2, 10),
                crossing_team(6, 1, 1, 10),
            ],
            Some(2),
        );

        let p = strong.win_chance(&weak);
        let q = weak.win_chance(&strong);

        assert!((p + q - 1.0).abs() < 1e-9);
        assert!(p > 0.5, "stronger alliance should be favored, got {p}");
    }

    #[test]
    fn test_predicted_ranking_points_non_negative() {
        let a = AllianceReport::new(
            [
                crossing_team(1, 1, 9, 10),
                crossing_team(2, 1, 5, 10),
                crossing_team(3, 1, 1, 10),
            ],
            Some(5),
        );
        let b = AllianceReport::new(
            [
                crossing_team(4, 1, 4, 10),
                crossing_team(5, 1, 4, 10),
                crossing_team(6, 1, 4, 10),
            ],
            Some(6),
        );

        assert!(a.predicted_ranking_points(&b) >= 0.0);
        assert!(b.predicted_ranking_points(&a) >= 0.0);
    }

    #[test]
    fn test_seeded_monte_carlo_reproducible() {
        let teams = || {
            [
                crossing_team(1, 1, 9, 10),
                crossing_team(2, 1, 5, 10),
                crossing_team(3, 1, 1, 10),
            ]
        };

        let first = AllianceReport::new(teams(), Some(1234));
        let second = AllianceReport::new(teams(), Some(1234));

        for metric in SIMULATED_METRICS {
            assert_eq!(
                first.standard_deviation(metric),
                second.standard_deviation(metric),
                "standard deviation of {metric} differs between identically seeded runs"
            );
        }
        assert_eq!(
            first.predicted_value("rocketRp"),
            second.predicted_value("rocketRp")
        );
    }

    #[test]
    fn test_different_seeds_converge() {
        let teams = || {
            [
                crossing_team(1, 1, 9, 10),
                crossing_team(2, 1, 5, 10),
                crossing_team(3, 1, 1, 10),
            ]
        };

        let first = AllianceReport::new(teams(), Some(1));
        let second = AllianceReport::new(teams(), Some(2));

        let sd1 = first.standard_deviation("telePoints").unwrap();
        let sd2 = second.standard_deviation("telePoints").unwrap();

        // 1000 draws estimate the same spread to within a loose tolerance
        assert!(
            (sd1 - sd2).abs() < 0.5,
            "telePoints spread diverged: {sd1} vs {sd2}"
        );
    }

    #[test]
    fn test_quick_report_sorted_and_rounded() {
        let alliance = deterministic_alliance();
        let report = alliance.quick_report();

        assert!(report.contains("Team 1\n"));
        assert!(report.contains("totalPoints: 33"));

        // bonusRp sorts before totalPoints
        let bonus_pos = report.find("bonusRp").unwrap();
        let total_pos = report.find("totalPoints").unwrap();
        assert!(bonus_pos < total_pos);
    }

    /// Team whose climb record is given per match as (level, success).
    fn climbing_team(team_num: u32, climbs: &[(u8, bool)]) -> TeamReport {
        let mut report = TeamReport::new(team_num);
        for &(level, success) in climbs {
            let mut obs = baseline_observation();
            obs.tele_op.attempt_hab_climb_level = level;
            obs.tele_op.success_hab_climb = success;
            obs.tele_op.success_hab_climb_level = if success { level } else { 0 };
            report.add_observation(obs);
        }
        report.process();
        report
    }

    proptest! {
        #[test]
        fn prop_endgame_assignment_respects_hab_capacity(
            climbs in proptest::collection::vec((1u8..=3, any::<bool>()), 12)
        ) {
            let alliance = AllianceReport::new(
                [
                    climbing_team(1, &climbs[0..4]),
                    climbing_team(2, &climbs[4..8]),
                    climbing_team(3, &climbs[8..12]),
                ],
                Some(99),
            );

            let levels = alliance.best_climb_levels();
            prop_assert!(levels.iter().filter(|&&l| l == 3).count() <= 1);
            prop_assert!(levels.iter().filter(|&&l| l == 2).count() <= 2);

            let climb_rp = alliance.predicted_value("climbRp").unwrap();
            prop_assert!((0.0..=1.0).contains(&climb_rp));

            let rocket_rp = alliance.predicted_value("rocketRp").unwrap();
            prop_assert!((0.0..=1.0).contains(&rocket_rp));

            let null_hatches = alliance.predicted_value("optimalNullHatches").unwrap();
            prop_assert!((0.0..=6.0).contains(&null_hatches));
        }
    }
}
