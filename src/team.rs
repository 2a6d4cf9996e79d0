//! Per-team aggregation of match observations.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use log::debug;
use rand::Rng;

use crate::constants::{CLIMB_POINT_VALUES, FREQUENT_COMMENT_RATIO, LEVEL_PREFIXES};
use crate::error::ScoutError;
use crate::metrics::{prefixed_metrics, AUTO_METRICS, OVERALL_METRICS, TELE_METRICS};
use crate::observation::{GamePiece, Observation};
use crate::stats;
use crate::text::{camel_to_sentence_case, sanitize_comment};

/// Aggregated report for one team: its observations in arrival order and
/// the statistics, counters, rates, and capability flags derived from them.
///
/// Intended use is append-only construction ([`add_observation`]) followed
/// by a single [`process`] call, after which the report is read-only.
/// Derived values read before `process` are empty.
///
/// [`add_observation`]: TeamReport::add_observation
/// [`process`]: TeamReport::process
#[derive(Clone, Debug)]
pub struct TeamReport {
    team_num: u32,
    team_name: String,
    entries: Vec<Observation>,
    averages: HashMap<String, f64>,
    standard_deviations: HashMap<String, f64>,
    attempt_success_rates: HashMap<String, f64>,
    counts: HashMap<String, u32>,
    abilities: HashMap<String, bool>,
    frequent_comments: Vec<String>,
    frequent_comment_str: String,
    all_comments: String,
}

impl TeamReport {
    pub fn new(team_num: u32) -> Self {
        let mut counts = HashMap::new();
        counts.insert("noShow".to_string(), 0);
        counts.insert("dysfunctional".to_string(), 0);

        TeamReport {
            team_num,
            team_name: String::new(),
            entries: Vec::new(),
            averages: HashMap::new(),
            standard_deviations: HashMap::new(),
            attempt_success_rates: HashMap::new(),
            counts,
            abilities: HashMap::new(),
            frequent_comments: Vec::new(),
            frequent_comment_str: String::new(),
            all_comments: String::new(),
        }
    }

    pub fn team_num(&self) -> u32 {
        self.team_num
    }

    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    pub fn set_team_name(&mut self, name: impl Into<String>) {
        self.team_name = name.into();
    }

    pub fn entries(&self) -> &[Observation] {
        &self.entries
    }

    /// Number of observations backing the statistics (no-shows excluded).
    pub fn sample_size(&self) -> usize {
        self.entries.len()
    }

    /// Append one observation, preserving arrival order.
    ///
    /// No-shows are tallied under the `noShow` and `dysfunctional` counters
    /// and otherwise dropped. The free-text comment is sanitized so it can
    /// never break a flat-file export.
    pub fn add_observation(&mut self, mut observation: Observation) {
        if observation.pre_match.robot_no_show {
            self.increment_count("noShow");
            self.increment_count("dysfunctional");
            return;
        }

        observation.post_match.robot_comment = sanitize_comment(&observation.post_match.robot_comment);
        self.entries.push(observation);
    }

    /// Compute every derived value from the stored observations.
    ///
    /// One-shot: call after the last observation is added. Safe on an empty
    /// report, which yields zero-count summaries throughout.
    pub fn process(&mut self) {
        self.find_frequent_comments();
        self.calculate_counts();
        self.calculate_averages();
        self.calculate_standard_deviations();
        self.calculate_attempt_success_rates();
        self.find_abilities();

        debug!(
            "processed team {}: {} observations, {} metrics",
            self.team_num,
            self.entries.len(),
            self.averages.len()
        );
    }

    fn find_frequent_comments(&mut self) {
        let mut frequencies: BTreeMap<String, usize> = BTreeMap::new();

        if let Some(first) = self.entries.first() {
            for tag in first.post_match.quick_comments.keys() {
                let count = self
                    .entries
                    .iter()
                    .filter(|e| e.quick_comment_selected(tag))
                    .count();
                frequencies.insert(tag.clone(), count);
            }
        }

        self.frequent_comments = frequencies
            .into_iter()
            .filter(|(_, count)| *count as f64 >= self.entries.len() as f64 * FREQUENT_COMMENT_RATIO)
            .map(|(tag, _)| tag)
            .collect();

        self.frequent_comment_str = self
            .frequent_comments
            .iter()
            .map(|c| format!("{} \n", sanitize_comment(c)))
            .collect();

        self.all_comments = self
            .entries
            .iter()
            .filter(|e| !e.post_match.robot_comment.is_empty())
            .map(|e| format!("{}; ", e.post_match.robot_comment))
            .collect();
    }

    pub fn increment_count(&mut self, name: &str) {
        *self.counts.entry(name.to_string()).or_insert(0) += 1;
    }

    fn calculate_counts(&mut self) {
        for prefix in LEVEL_PREFIXES {
            for suffix in ["Start", "Cross", "ClimbAttempt", "ClimbSuccess"] {
                self.counts.insert(format!("{prefix}{suffix}"), 0);
            }
        }
        for prefix in ["cargo", "hatch"] {
            for suffix in ["Start", "AutoSuccess"] {
                self.counts.insert(format!("{prefix}{suffix}"), 0);
            }
        }

        // Split borrows: the counter updates below cannot hold &self.entries
        let entries = std::mem::take(&mut self.entries);

        for entry in &entries {
            let start_level = entry.pre_match.starting_level;

            if let Some(prefix) = level_prefix(start_level) {
                self.increment_count(&format!("{prefix}Start"));
            }

            match entry.pre_match.starting_game_piece {
                Some(GamePiece::Cargo) => {
                    self.increment_count("cargoStart");
                    if entry.sandstorm_cargo() >= 1 {
                        self.increment_count("cargoAutoSuccess");
                    }
                }
                Some(GamePiece::Hatch) => {
                    self.increment_count("hatchStart");
                    if entry.sandstorm_hatches() >= 1 {
                        self.increment_count("hatchAutoSuccess");
                    }
                }
                None => {}
            }

            if entry.sandstorm.cross_hab_line {
                // A level 2 start that crosses also clears level 1, so it
                // doubles as a level 1 data point
                if start_level == 2 {
                    self.increment_count("levelOneCross");
                    self.increment_count("levelOneStart");
                }
                if let Some(prefix) = level_prefix(start_level) {
                    self.increment_count(&format!("{prefix}Cross"));
                }
                self.increment_count("totalCross");
            }

            if entry.tele_op.attempt_hab_climb {
                if let Some(prefix) = level_prefix(entry.tele_op.attempt_hab_climb_level) {
                    self.increment_count(&format!("{prefix}ClimbAttempt"));
                }
                self.increment_count("totalClimbAttempt");
            }

            if entry.tele_op.success_hab_climb {
                let success_level = entry.tele_op.success_hab_climb_level;

                if let Some(prefix) = level_prefix(success_level) {
                    self.increment_count(&format!("{prefix}ClimbSuccess"));

                    // A climb that ends on a different level than attempted
                    // was never tallied as an attempt at that level
                    if success_level != entry.tele_op.attempt_hab_climb_level {
                        self.increment_count(&format!("{prefix}ClimbAttempt"));
                    }
                }
                self.increment_count("totalClimbSuccess");
            }

            if entry.quick_comment_selected("Lost communications")
                || entry.quick_comment_selected("Tipped over")
            {
                self.increment_count("dysfunctional");
            }
        }

        self.entries = entries;
    }

    fn calculate_averages(&mut self) {
        for (key, extract) in prefixed_metrics() {
            let values: Vec<f64> = self.entries.iter().map(extract).collect();
            self.averages.insert(key, stats::mean(&values));
        }
    }

    fn calculate_standard_deviations(&mut self) {
        for (key, extract) in prefixed_metrics() {
            let values: Vec<f64> = self.entries.iter().map(extract).collect();
            self.standard_deviations.insert(key, stats::sample_std_dev(&values));
        }
    }

    fn calculate_attempt_success_rates(&mut self) {
        for (i, prefix) in LEVEL_PREFIXES.iter().enumerate() {
            // Nothing starts on HAB level 3, so there is no level 3 cross rate
            if i != 2 {
                let crosses = self.raw_count(&format!("{prefix}Cross"));
                let attempts = if i == 3 {
                    self.entries.len() as u32
                } else {
                    self.raw_count(&format!("{prefix}Start"))
                };

                let rate = if attempts != 0 {
                    f64::from(crosses) / f64::from(attempts)
                } else {
                    0.0
                };

                self.standard_deviations
                    .insert(format!("{prefix}Cross"), stats::attempt_std_dev(attempts, crosses));
                self.attempt_success_rates.insert(format!("{prefix}Cross"), rate);
            }

            let climb_attempts = self.raw_count(&format!("{prefix}ClimbAttempt"));
            let climb_successes = self.raw_count(&format!("{prefix}ClimbSuccess"));

            let climb_rate = if climb_attempts != 0 {
                f64::from(climb_successes) / f64::from(climb_attempts)
            } else {
                0.0
            };

            self.standard_deviations.insert(
                format!("{prefix}Climb"),
                stats::attempt_std_dev(climb_attempts, climb_successes),
            );
            self.attempt_success_rates.insert(format!("{prefix}Climb"), climb_rate);
        }

        for prefix in ["cargo", "hatch"] {
            let starts = self.raw_count(&format!("{prefix}Start"));
            let successes = self.raw_count(&format!("{prefix}AutoSuccess"));

            let rate = if starts != 0 {
                f64::from(successes) / f64::from(starts)
            } else {
                0.0
            };

            self.standard_deviations.insert(
                format!("{prefix}AutoSuccess"),
                stats::attempt_std_dev(starts, successes),
            );
            self.attempt_success_rates
                .insert(format!("{prefix}AutoSuccess"), rate);
        }
    }

    fn find_abilities(&mut self) {
        self.abilities.insert(
            "cargoFloorIntake".to_string(),
            self.frequent_comments.iter().any(|c| c == "Cargo floor intake"),
        );
        self.abilities.insert(
            "hatchPanelFloorIntake".to_string(),
            self.frequent_comments.iter().any(|c| c == "Hatch panel floor intake"),
        );

        for flag in [
            "frontCargoShipHatchSandstorm",
            "sideCargoShipHatchSandstorm",
            "rocketHatchSandstorm",
            "cargoShipCargoSandstorm",
            "rocketCargoSandstorm",
            "singleBuddyClimb",
            "doubleBuddyClimb",
            "levelTwoBuddyClimb",
            "levelThreeBuddyClimb",
        ] {
            self.abilities.insert(flag.to_string(), false);
        }

        fn set_if(abilities: &mut HashMap<String, bool>, flag: &str, condition: bool) {
            if condition {
                abilities.insert(flag.to_string(), true);
            }
        }

        for entry in &self.entries {
            let abilities = &mut self.abilities;
            set_if(
                abilities,
                "frontCargoShipHatchSandstorm",
                entry.sandstorm.front_cargo_ship_hatch_capable,
            );
            set_if(
                abilities,
                "sideCargoShipHatchSandstorm",
                entry.sandstorm.side_cargo_ship_hatch_capable,
            );
            set_if(abilities, "rocketHatchSandstorm", entry.sandstorm.rocket_hatches >= 1);
            set_if(abilities, "cargoShipCargoSandstorm", entry.sandstorm.cargo_ship_cargo >= 1);
            set_if(abilities, "rocketCargoSandstorm", entry.sandstorm.rocket_cargo >= 1);
            set_if(abilities, "singleBuddyClimb", entry.tele_op.num_partner_climb_assists == 1);
            set_if(abilities, "doubleBuddyClimb", entry.tele_op.num_partner_climb_assists == 2);
            set_if(
                abilities,
                "levelTwoBuddyClimb",
                entry.tele_op.partner_climb_assist_end_level == 2,
            );
            set_if(
                abilities,
                "levelThreeBuddyClimb",
                entry.tele_op.partner_climb_assist_end_level == 3,
            );
        }
    }

    fn raw_count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Mean of a metric, keyed by prefixed name (e.g. `autorocketHatches`).
    pub fn average(&self, metric: &str) -> Option<f64> {
        self.averages.get(metric).copied()
    }

    /// Sample standard deviation of a metric or attempt-success rate.
    pub fn std_dev(&self, metric: &str) -> Option<f64> {
        self.standard_deviations.get(metric).copied()
    }

    /// Success rate of an attempted task (e.g. `levelTwoClimb`).
    pub fn attempt_success_rate(&self, metric: &str) -> Option<f64> {
        self.attempt_success_rates.get(metric).copied()
    }

    /// Capability flag lookup. Unknown names indicate a schema mismatch and
    /// fail fast.
    pub fn ability(&self, name: &str) -> Result<bool, ScoutError> {
        self.abilities
            .get(name)
            .copied()
            .ok_or_else(|| ScoutError::UnknownAbility(name.to_string()))
    }

    /// Counter lookup. Unknown names fail fast.
    pub fn count(&self, name: &str) -> Result<u32, ScoutError> {
        self.counts
            .get(name)
            .copied()
            .ok_or_else(|| ScoutError::UnknownCount(name.to_string()))
    }

    /// Quick-comment tags selected in at least a quarter of observations.
    pub fn frequent_comments(&self) -> &[String] {
        &self.frequent_comments
    }

    /// Draw one value per statistics metric from Normal(mean, sd²).
    ///
    /// Draws are independent across metrics; cross-metric correlations are
    /// deliberately ignored. Iteration follows the metric tables, so a
    /// seeded RNG reproduces the same sample map exactly.
    pub fn generate_random_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> HashMap<String, f64> {
        let mut sample = HashMap::new();

        for (key, _) in prefixed_metrics() {
            let mean = self.average(&key).unwrap_or(0.0);
            let std_dev = self.std_dev(&key).unwrap_or(0.0);
            sample.insert(key, stats::random_normal_value(mean, std_dev, rng));
        }

        sample
    }

    /// HAB level with the greatest expected climb points. Exact ties go to
    /// the higher level.
    pub fn find_best_climb_level(&self) -> u8 {
        let mut best_level = 0;
        let mut best_points = 0.0;

        for i in 0..3 {
            let rate = self
                .attempt_success_rate(&format!("{}Climb", LEVEL_PREFIXES[i]))
                .unwrap_or(0.0);
            let potential = rate * CLIMB_POINT_VALUES[i];
            if potential >= best_points {
                best_points = potential;
                best_level = i as u8 + 1;
            }
        }

        best_level
    }

    /// Multi-line, human-readable summary of the team's aggregate stats.
    pub fn quick_status(&self) -> String {
        let mut out = format!("Team {}", self.team_num);

        if !self.team_name.is_empty() {
            let _ = write!(out, " - {}", self.team_name);
        }

        out.push_str("\n\nSandstorm:");
        for (metric, _) in AUTO_METRICS {
            let _ = write!(
                out,
                "\nAvg. {}: {}",
                camel_to_sentence_case(metric),
                stats::round(self.average(&format!("auto{metric}")).unwrap_or(0.0), 2)
            );
        }

        let _ = write!(
            out,
            "\nHAB line cross: {}% ({}/{})",
            stats::round(self.attempt_success_rate("totalCross").unwrap_or(0.0) * 100.0, 2),
            self.raw_count("totalCross"),
            self.entries.len()
        );

        for i in 0..2 {
            let _ = write!(
                out,
                "\nHAB lvl {} cross: {}% ({}/{})",
                i + 1,
                stats::round(
                    self.attempt_success_rate(&format!("{}Cross", LEVEL_PREFIXES[i]))
                        .unwrap_or(0.0)
                        * 100.0,
                    2
                ),
                self.raw_count(&format!("{}Cross", LEVEL_PREFIXES[i])),
                self.raw_count(&format!("{}Start", LEVEL_PREFIXES[i]))
            );
        }

        out.push_str("\n\nTele-Op:");
        for (metric, _) in TELE_METRICS {
            let _ = write!(
                out,
                "\nAvg. {}: {}",
                camel_to_sentence_case(metric),
                stats::round(self.average(&format!("tele{metric}")).unwrap_or(0.0), 2)
            );
        }

        out.push_str("\n\nEndgame:");
        for (i, prefix) in LEVEL_PREFIXES.iter().enumerate() {
            if i == 3 {
                out.push_str("\nTotal climb success: ");
            } else {
                let _ = write!(out, "\nLvl {} climb success: ", i + 1);
            }
            let _ = write!(
                out,
                "{}% ({}/{})",
                stats::round(
                    self.attempt_success_rate(&format!("{prefix}Climb")).unwrap_or(0.0) * 100.0,
                    0
                ),
                self.raw_count(&format!("{prefix}ClimbSuccess")),
                self.raw_count(&format!("{prefix}ClimbAttempt"))
            );
        }

        out.push_str("\n\nOverall:");
        for (metric, _) in OVERALL_METRICS {
            let _ = write!(
                out,
                "\nAvg. {}: {}",
                camel_to_sentence_case(metric),
                stats::round(self.average(metric).unwrap_or(0.0), 2)
            );
        }

        if !self.frequent_comment_str.is_empty() {
            let _ = write!(out, "\n\nCommon quick comments:\n{}", self.frequent_comment_str);
        }
        if !self.all_comments.is_empty() {
            let _ = write!(out, "\nAll comments:\n{}", self.all_comments);
        }

        out
    }
}

fn level_prefix(level: u8) -> Option<&'static str> {
    match level {
        1..=3 => Some(LEVEL_PREFIXES[level as usize - 1]),
        _ => None,
    }
}
