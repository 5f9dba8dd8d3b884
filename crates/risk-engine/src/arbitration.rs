//! Worst-wins arbitration over independently evaluated threats
//!
//! The reduction walks classifications in the order given and keeps a
//! running highest threat, starting from SAFE with no fields. A candidate
//! replaces the current highest only when it is strictly worse under
//! SAFE < WARNING < DANGER, so among equal severities the first one found
//! is reported. Callers decide the order (the geo strategy feeds peers in
//! roster order, then hazards in list order).

use crate::verdict::{Classification, Verdict};

/// Reduce an ordered sequence of classifications to a single verdict
pub fn arbitrate<I>(classifications: I) -> Verdict
where
    I: IntoIterator<Item = Classification>,
{
    classifications
        .into_iter()
        .fold(Verdict::safe(), |highest, candidate| {
            // A SAFE candidate can never be strictly above the SAFE start
            if candidate.level > highest.level {
                Verdict::from_classification(candidate)
            } else {
                highest
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::{RiskLevel, Threat, ThreatType};

    fn candidate(id: &str, level: RiskLevel) -> Classification {
        Classification {
            level,
            threat: Threat {
                kind: ThreatType::Vehicle,
                id: id.to_string(),
                distance_m: 10.0,
            },
        }
    }

    #[test]
    fn test_empty_is_safe() {
        let verdict = arbitrate(Vec::new());
        assert_eq!(verdict, Verdict::safe());
    }

    #[test]
    fn test_all_safe_has_no_threat() {
        let verdict = arbitrate(vec![
            candidate("a", RiskLevel::Safe),
            candidate("b", RiskLevel::Safe),
        ]);
        assert!(verdict.is_safe());
        assert!(verdict.threat.is_none());
    }

    #[test]
    fn test_worst_wins() {
        let verdict = arbitrate(vec![
            candidate("a", RiskLevel::Warning),
            candidate("b", RiskLevel::Danger),
            candidate("c", RiskLevel::Warning),
        ]);
        assert_eq!(verdict.level, RiskLevel::Danger);
        assert_eq!(verdict.threat_id(), Some("b"));
    }

    #[test]
    fn test_first_found_wins_ties() {
        let verdict = arbitrate(vec![
            candidate("a", RiskLevel::Safe),
            candidate("b", RiskLevel::Danger),
            candidate("c", RiskLevel::Danger),
        ]);
        assert_eq!(verdict.threat_id(), Some("b"));

        let verdict = arbitrate(vec![
            candidate("x", RiskLevel::Warning),
            candidate("y", RiskLevel::Warning),
        ]);
        assert_eq!(verdict.threat_id(), Some("x"));
    }

    #[test]
    fn test_never_downgrades() {
        let mut candidates = vec![candidate("danger", RiskLevel::Danger)];
        candidates.extend((0..20).map(|i| candidate(&format!("safe-{i}"), RiskLevel::Safe)));
        candidates.push(candidate("warn", RiskLevel::Warning));

        let verdict = arbitrate(candidates);
        assert_eq!(verdict.level, RiskLevel::Danger);
        assert_eq!(verdict.threat_id(), Some("danger"));
    }
}
