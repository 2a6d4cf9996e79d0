//! Data model for a single match observation of one team.
//!
//! An observation is the immutable record one scout produces for one team in
//! one match. Reports never own derived state inside the observation; the
//! few per-match roll-ups (total pieces, point contribution) are computed on
//! demand from the raw fields.

use std::collections::BTreeMap;

use crate::constants::{CARGO_POINT_VALUE, CLIMB_POINT_VALUES, CROSS_POINT_VALUES, HATCH_POINT_VALUE};

/// A game piece a robot can start the match holding, or place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamePiece {
    Hatch,
    Cargo,
}

/// Pre-match context recorded before the robot moves.
#[derive(Clone, Debug, Default)]
pub struct PreMatch {
    pub scout_name: String,
    pub match_num: u32,
    pub team_num: u32,
    pub robot_no_show: bool,
    /// HAB platform level the robot starts on (1 or 2).
    pub starting_level: u8,
    pub starting_game_piece: Option<GamePiece>,
}

/// Sandstorm (autonomous) period data.
#[derive(Clone, Debug, Default)]
pub struct Sandstorm {
    pub cargo_ship_hatches: u32,
    pub rocket_hatches: u32,
    pub cargo_ship_cargo: u32,
    pub rocket_cargo: u32,
    pub hatches_dropped: u32,
    pub cargo_dropped: u32,
    pub cross_hab_line: bool,
    pub front_cargo_ship_hatch_capable: bool,
    pub side_cargo_ship_hatch_capable: bool,
}

/// Tele-operated period data, endgame included.
#[derive(Clone, Debug, Default)]
pub struct TeleOp {
    pub cargo_ship_hatches: u32,
    pub rocket_level_one_hatches: u32,
    pub rocket_level_two_hatches: u32,
    pub rocket_level_three_hatches: u32,
    pub cargo_ship_cargo: u32,
    pub rocket_level_one_cargo: u32,
    pub rocket_level_two_cargo: u32,
    pub rocket_level_three_cargo: u32,
    pub attempt_hab_climb: bool,
    /// Level the climb was attempted at (1-3); meaningful only when
    /// `attempt_hab_climb` is set.
    pub attempt_hab_climb_level: u8,
    pub success_hab_climb: bool,
    pub success_hab_climb_level: u8,
    pub num_partner_climb_assists: u32,
    /// HAB level partners were lifted to (2 or 3), 0 if none.
    pub partner_climb_assist_end_level: u8,
}

/// Qualitative post-match reflection.
#[derive(Clone, Debug, Default)]
pub struct PostMatch {
    pub robot_comment: String,
    /// Quick-comment tags offered to the scout, with their selection state.
    /// Ordered so comment-frequency summaries are deterministic.
    pub quick_comments: BTreeMap<String, bool>,
}

/// One match's record for one team.
#[derive(Clone, Debug, Default)]
pub struct Observation {
    pub pre_match: PreMatch,
    pub sandstorm: Sandstorm,
    pub tele_op: TeleOp,
    pub post_match: PostMatch,
}

impl Observation {
    pub fn new(pre_match: PreMatch, sandstorm: Sandstorm, tele_op: TeleOp, post_match: PostMatch) -> Self {
        Observation {
            pre_match,
            sandstorm,
            tele_op,
            post_match,
        }
    }

    /// Hatch panels placed during the sandstorm.
    pub fn sandstorm_hatches(&self) -> u32 {
        self.sandstorm.cargo_ship_hatches + self.sandstorm.rocket_hatches
    }

    /// Cargo scored during the sandstorm.
    pub fn sandstorm_cargo(&self) -> u32 {
        self.sandstorm.cargo_ship_cargo + self.sandstorm.rocket_cargo
    }

    /// Hatch panels placed during tele-op.
    pub fn tele_op_hatches(&self) -> u32 {
        self.tele_op.cargo_ship_hatches
            + self.tele_op.rocket_level_one_hatches
            + self.tele_op.rocket_level_two_hatches
            + self.tele_op.rocket_level_three_hatches
    }

    /// Cargo scored during tele-op.
    pub fn tele_op_cargo(&self) -> u32 {
        self.tele_op.cargo_ship_cargo
            + self.tele_op.rocket_level_one_cargo
            + self.tele_op.rocket_level_two_cargo
            + self.tele_op.rocket_level_three_cargo
    }

    /// Hatch panels placed across the whole match.
    pub fn total_hatches(&self) -> u32 {
        self.sandstorm_hatches() + self.tele_op_hatches()
    }

    /// Cargo scored across the whole match.
    pub fn total_cargo(&self) -> u32 {
        self.sandstorm_cargo() + self.tele_op_cargo()
    }

    /// Points scored during the sandstorm: the HAB line crossing bonus for
    /// the starting level plus piece values.
    pub fn calculated_sandstorm_points(&self) -> f64 {
        let cross_bonus = if self.sandstorm.cross_hab_line {
            CROSS_POINT_VALUES
                .get(self.pre_match.starting_level.saturating_sub(1) as usize)
                .copied()
                .unwrap_or(0.0)
        } else {
            0.0
        };

        cross_bonus
            + HATCH_POINT_VALUE * f64::from(self.sandstorm_hatches())
            + CARGO_POINT_VALUE * f64::from(self.sandstorm_cargo())
    }

    /// Points scored during tele-op, endgame climb excluded.
    pub fn calculated_tele_op_points(&self) -> f64 {
        HATCH_POINT_VALUE * f64::from(self.tele_op_hatches())
            + CARGO_POINT_VALUE * f64::from(self.tele_op_cargo())
    }

    /// Points earned by the endgame climb, 0.0 without a successful climb.
    pub fn climb_points(&self) -> f64 {
        if !self.tele_op.success_hab_climb {
            return 0.0;
        }

        CLIMB_POINT_VALUES
            .get(self.tele_op.success_hab_climb_level.saturating_sub(1) as usize)
            .copied()
            .unwrap_or(0.0)
    }

    /// The team's full point contribution for this match.
    pub fn calculated_point_contribution(&self) -> f64 {
        self.calculated_sandstorm_points() + self.calculated_tele_op_points() + self.climb_points()
    }

    /// Whether a quick-comment tag was selected for this match.
    pub fn quick_comment_selected(&self, tag: &str) -> bool {
        self.post_match.quick_comments.get(tag).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_observation() -> Observation {
        Observation {
            pre_match: PreMatch {
                team_num: 25,
                starting_level: 2,
                starting_game_piece: Some(GamePiece::Hatch),
                ..Default::default()
            },
            sandstorm: Sandstorm {
                cargo_ship_hatches: 1,
                rocket_cargo: 1,
                cross_hab_line: true,
                ..Default::default()
            },
            tele_op: TeleOp {
                cargo_ship_hatches: 2,
                rocket_level_one_hatches: 1,
                rocket_level_one_cargo: 3,
                success_hab_climb: true,
                success_hab_climb_level: 2,
                attempt_hab_climb: true,
                attempt_hab_climb_level: 2,
                ..Default::default()
            },
            post_match: PostMatch::default(),
        }
    }

    #[test]
    fn test_piece_totals() {
        let obs = sample_observation();
        assert_eq!(obs.sandstorm_hatches(), 1);
        assert_eq!(obs.sandstorm_cargo(), 1);
        assert_eq!(obs.total_hatches(), 4);
        assert_eq!(obs.total_cargo(), 4);
    }

    #[test]
    fn test_point_contribution() {
        let obs = sample_observation();

        // Level 2 cross (6) + hatch (2) + cargo (3)
        assert!((obs.calculated_sandstorm_points() - 11.0).abs() < 1e-10);
        // 3 hatches (6) + 3 cargo (9)
        assert!((obs.calculated_tele_op_points() - 15.0).abs() < 1e-10);
        // Level 2 climb
        assert!((obs.climb_points() - 6.0).abs() < 1e-10);
        assert!((obs.calculated_point_contribution() - 32.0).abs() < 1e-10);
    }

    #[test]
    fn test_no_cross_no_bonus() {
        let mut obs = sample_observation();
        obs.sandstorm.cross_hab_line = false;
        assert!((obs.calculated_sandstorm_points() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_failed_climb_scores_nothing() {
        let mut obs = sample_observation();
        obs.tele_op.success_hab_climb = false;
        assert_eq!(obs.climb_points(), 0.0);
    }
}
