//! Match-level validity gate.
//!
//! A match is accepted or rejected as a unit. Rejections are reported as
//! errors so the caller can log the reason and count the file as failed.

use rounds_core::{Error, Result, RoundSummary, Side};

/// Sanity checks over a match's round summaries.
#[derive(Debug, Clone, Copy)]
pub struct ValidityGate {
    equip_ceiling: u64,
}

impl ValidityGate {
    /// Create a gate with the opening-round equipment ceiling.
    pub fn new(equip_ceiling: u64) -> Self {
        Self { equip_ceiling }
    }

    /// Accept or reject a match.
    ///
    /// Rejects when there are no rounds, when round 1 is missing or either side's
    /// round-1 equipment is unknown or above the ceiling, and when round numbers
    /// are not the contiguous sequence `1..=n`.
    pub fn check(&self, rounds: &[RoundSummary]) -> Result<()> {
        if rounds.is_empty() {
            return Err(Error::NoResolvedOutcome);
        }

        let opening = rounds
            .iter()
            .find(|r| r.round == 1)
            .ok_or_else(|| Error::opening_economy("no round 1 in match"))?;
        self.check_opening_economy(opening)?;

        for (expected, row) in (1u32..).zip(rounds) {
            if row.round != expected {
                return Err(Error::round_sequence(format!(
                    "expected round {}, found round {}",
                    expected, row.round
                )));
            }
        }

        Ok(())
    }

    fn check_opening_economy(&self, opening: &RoundSummary) -> Result<()> {
        for side in [Side::Ct, Side::T] {
            match opening.equip_value(side) {
                None => {
                    return Err(Error::opening_economy(format!(
                        "{:?} equipment value is unknown",
                        side
                    )))
                }
                Some(value) if value > self.equip_ceiling => {
                    return Err(Error::opening_economy(format!(
                        "{:?} equipment value {} exceeds ceiling {}",
                        side, value, self.equip_ceiling
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_round(round: u32, ct_equip: Option<u64>, t_equip: Option<u64>) -> RoundSummary {
        RoundSummary {
            round,
            round_winner: 3,
            round_reason: 8,
            team_ct_name: "CT".to_string(),
            team_t_name: "TERRORIST".to_string(),
            team_ct_players: vec!["a".to_string()],
            team_t_players: vec!["b".to_string()],
            team_ct_current_equip_value: ct_equip,
            team_t_current_equip_value: t_equip,
            map_name: Some("de_inferno".to_string()),
        }
    }

    fn gate() -> ValidityGate {
        ValidityGate::new(5500)
    }

    #[test]
    fn test_accepts_sane_match() {
        let rounds = vec![
            make_round(1, Some(4000), Some(3500)),
            make_round(2, Some(20000), Some(18000)),
        ];
        assert!(gate().check(&rounds).is_ok());
    }

    #[test]
    fn test_ceiling_is_inclusive() {
        let rounds = vec![make_round(1, Some(5500), Some(5500))];
        assert!(gate().check(&rounds).is_ok());
    }

    #[test]
    fn test_rejects_rich_opening_round() {
        let rounds = vec![
            make_round(1, Some(6000), Some(3500)),
            make_round(2, Some(4000), Some(4000)),
        ];
        assert!(matches!(gate().check(&rounds), Err(Error::InvalidOpeningEconomy(_))));
    }

    #[test]
    fn test_rejects_unknown_opening_equipment() {
        let rounds = vec![make_round(1, Some(4000), None)];
        assert!(matches!(gate().check(&rounds), Err(Error::InvalidOpeningEconomy(_))));
    }

    #[test]
    fn test_rejects_empty_match() {
        assert!(matches!(gate().check(&[]), Err(Error::NoResolvedOutcome)));
    }

    #[test]
    fn test_rejects_missing_opening_round() {
        let rounds = vec![make_round(2, Some(100), Some(100))];
        assert!(matches!(gate().check(&rounds), Err(Error::InvalidOpeningEconomy(_))));
    }

    #[test]
    fn test_rejects_round_gap() {
        let rounds = vec![
            make_round(1, Some(4000), Some(3500)),
            make_round(3, Some(4000), Some(3500)),
        ];
        assert!(matches!(gate().check(&rounds), Err(Error::InvalidRoundSequence(_))));
    }

    #[test]
    fn test_configured_ceiling() {
        let rounds = vec![make_round(1, Some(5000), Some(3500))];
        assert!(ValidityGate::new(4800).check(&rounds).is_err());
    }
}
