//! Association rules, their strength metrics, and direction classes.

use crate::itemset::Itemset;
use crate::schema::Schema;
use crate::types::Namespace;
use crate::error::RuleMineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Conviction of a rule. Undefined (infinite) when confidence is exactly 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conviction {
    Finite(f64),
    Infinite,
}

impl Conviction {
    /// `(1 - support(consequent)) / (1 - confidence)`.
    pub fn compute(consequent_support: f64, confidence: f64) -> Self {
        let denominator = 1.0 - confidence;
        if denominator <= 0.0 {
            Conviction::Infinite
        } else {
            Conviction::Finite((1.0 - consequent_support) / denominator)
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Conviction::Finite(v) => v,
            Conviction::Infinite => f64::INFINITY,
        }
    }
}

impl fmt::Display for Conviction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conviction::Finite(v) => write!(f, "{}", v),
            Conviction::Infinite => write!(f, "inf"),
        }
    }
}

// JSON has no infinity, so the sentinel is the string "inf".
impl Serialize for Conviction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Conviction::Finite(v) => serializer.serialize_f64(*v),
            Conviction::Infinite => serializer.serialize_str("inf"),
        }
    }
}

impl<'de> Deserialize<'de> for Conviction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(Conviction::Finite(v)),
            Raw::Text(s) if s.eq_ignore_ascii_case("inf") => Ok(Conviction::Infinite),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "invalid conviction '{}', expected a number or \"inf\"",
                s
            ))),
        }
    }
}

/// Metrics that need the supports of the antecedent and consequent on their
/// own. Only available when the full frequent-itemset lattice was mined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleMetrics {
    pub antecedent_support: f64,
    pub consequent_support: f64,
    /// `confidence / support(consequent)`.
    pub lift: f64,
    /// `support(rule) - support(antecedent) * support(consequent)`.
    pub leverage: f64,
    pub conviction: Conviction,
    /// Zhang's metric; `None` when its denominator is zero.
    pub zhangs_metric: Option<f64>,
}

impl RuleMetrics {
    pub fn compute(rule_support: f64, antecedent_support: f64, consequent_support: f64) -> Self {
        let confidence = rule_support / antecedent_support;
        let lift = confidence / consequent_support;
        let leverage = rule_support - antecedent_support * consequent_support;
        let conviction = Conviction::compute(consequent_support, confidence);
        let denominator = f64::max(
            rule_support * (1.0 - antecedent_support),
            antecedent_support * (consequent_support - rule_support),
        );
        let zhangs_metric = (denominator > 0.0).then(|| leverage / denominator);
        Self {
            antecedent_support,
            consequent_support,
            lift,
            leverage,
            conviction,
            zhangs_metric,
        }
    }
}

/// A directional rule: if `antecedent` holds then `consequent` holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    pub antecedent: Itemset,
    pub consequent: Itemset,
    /// Absolute support of `antecedent ∪ consequent`.
    pub support_count: usize,
    /// Relative support of `antecedent ∪ consequent`.
    pub support: f64,
    /// `support(union) / support(antecedent)`; `None` in support-only mode.
    pub confidence: Option<f64>,
    /// `None` in support-only mode.
    pub metrics: Option<RuleMetrics>,
}

/// How a rule's sides relate to the two namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleDirection {
    /// All antecedent features influencer-side, all consequent user-side.
    InfluencerToUser,
    /// All antecedent features user-side, all consequent influencer-side.
    UserToInfluencer,
    /// Both sides entirely within one namespace.
    SameNamespace,
    /// At least one side mixes namespaces.
    Mixed,
}

impl RuleDirection {
    pub fn classify(antecedent: &Itemset, consequent: &Itemset, schema: &Schema) -> Self {
        let side = |items: &Itemset| -> Option<Namespace> {
            let mut iter = items.iter().map(|id| schema.namespace(id));
            let first = iter.next()?;
            iter.all(|ns| ns == first).then_some(first)
        };
        match (side(antecedent), side(consequent)) {
            (Some(Namespace::Influencer), Some(Namespace::User)) => RuleDirection::InfluencerToUser,
            (Some(Namespace::User), Some(Namespace::Influencer)) => RuleDirection::UserToInfluencer,
            (Some(_), Some(_)) => RuleDirection::SameNamespace,
            _ => RuleDirection::Mixed,
        }
    }
}

impl fmt::Display for RuleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleDirection::InfluencerToUser => "influencer_to_user",
            RuleDirection::UserToInfluencer => "user_to_influencer",
            RuleDirection::SameNamespace => "same_namespace",
            RuleDirection::Mixed => "mixed",
        };
        f.write_str(s)
    }
}

impl FromStr for RuleDirection {
    type Err = RuleMineError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s {
            "influencer_to_user" => Ok(RuleDirection::InfluencerToUser),
            "user_to_influencer" => Ok(RuleDirection::UserToInfluencer),
            "same_namespace" => Ok(RuleDirection::SameNamespace),
            "mixed" => Ok(RuleDirection::Mixed),
            other => Err(RuleMineError::invalid_config(
                "direction",
                other,
                "expected influencer_to_user, user_to_influencer, same_namespace or mixed",
            )),
        }
    }
}

impl FromStr for Conviction {
    type Err = RuleMineError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        if s.eq_ignore_ascii_case("inf") {
            return Ok(Conviction::Infinite);
        }
        s.parse::<f64>()
            .map(Conviction::Finite)
            .map_err(|_| RuleMineError::Serialization(format!("invalid conviction '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeatureId, NamespacePrefixes};

    #[test]
    fn conviction_is_infinite_at_full_confidence() {
        assert_eq!(Conviction::compute(0.4, 1.0), Conviction::Infinite);
        match Conviction::compute(0.5, 0.75) {
            Conviction::Finite(v) => assert!((v - 2.0).abs() < 1e-12),
            Conviction::Infinite => panic!("expected finite conviction"),
        }
    }

    #[test]
    fn conviction_json_sentinel() {
        assert_eq!(serde_json::to_string(&Conviction::Infinite).unwrap(), "\"inf\"");
        assert_eq!(serde_json::to_string(&Conviction::Finite(1.5)).unwrap(), "1.5");
        let back: Conviction = serde_json::from_str("\"inf\"").unwrap();
        assert_eq!(back, Conviction::Infinite);
        assert!(serde_json::from_str::<Conviction>("\"never\"").is_err());
    }

    #[test]
    fn metrics_match_definitions() {
        // support(A)=0.75, support(C)=0.75, support(A∪C)=0.5
        let m = RuleMetrics::compute(0.5, 0.75, 0.75);
        assert!((m.lift - (0.5 / 0.75) / 0.75).abs() < 1e-12);
        assert!((m.leverage - (0.5 - 0.5625)).abs() < 1e-12);
        match m.conviction {
            Conviction::Finite(v) => assert!((v - 0.25 / (1.0 - 2.0 / 3.0)).abs() < 1e-9),
            Conviction::Infinite => panic!("expected finite conviction"),
        }
        assert!(m.zhangs_metric.unwrap() < 0.0);
    }

    #[test]
    fn direction_classes() {
        let schema = Schema::from_columns(
            &["inf_a", "inf_b", "usr_c", "usr_d"],
            &NamespacePrefixes::default(),
        )
        .unwrap();
        let set = |ids: &[u32]| Itemset::new(ids.iter().map(|&i| FeatureId(i)).collect()).unwrap();

        assert_eq!(
            RuleDirection::classify(&set(&[0, 1]), &set(&[2]), &schema),
            RuleDirection::InfluencerToUser
        );
        assert_eq!(
            RuleDirection::classify(&set(&[3]), &set(&[0]), &schema),
            RuleDirection::UserToInfluencer
        );
        assert_eq!(
            RuleDirection::classify(&set(&[0]), &set(&[1]), &schema),
            RuleDirection::SameNamespace
        );
        assert_eq!(
            RuleDirection::classify(&set(&[0, 2]), &set(&[3]), &schema),
            RuleDirection::Mixed
        );
    }

    #[test]
    fn direction_parses_its_display_form() {
        for d in [
            RuleDirection::InfluencerToUser,
            RuleDirection::UserToInfluencer,
            RuleDirection::SameNamespace,
            RuleDirection::Mixed,
        ] {
            assert_eq!(d.to_string().parse::<RuleDirection>().unwrap(), d);
        }
        assert!("sideways".parse::<RuleDirection>().is_err());
    }
}
