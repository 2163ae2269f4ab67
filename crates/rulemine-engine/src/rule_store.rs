//! Rule-set persistence.
//!
//! A mined rule set is written either as a versioned JSON document or as a
//! CSV export whose feature-set columns use the escaped `{a,b}` codec. The
//! format is picked from the file extension and both load back into the
//! same [`RuleRecord`]s. Records are self-contained: the validator needs
//! nothing from the mining run beyond them.

use crate::filter::DirectedRule;
use crate::run_log::RunParameters;
use rulemine_core::codec::{split_escaped, FeatureSet, CODEC_VERSION};
use rulemine_core::error::{Result, RuleMineError};
use rulemine_core::rule::{Conviction, RuleDirection};
use rulemine_core::schema::Schema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const RULE_SET_FORMAT_VERSION: u32 = 1;

const CSV_HEADER: [&str; 11] = [
    "antecedents",
    "consequents",
    "antecedent_support",
    "consequent_support",
    "support",
    "confidence",
    "lift",
    "leverage",
    "conviction",
    "zhangs_metric",
    "direction",
];

/// One persisted rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub antecedent: FeatureSet,
    pub consequent: FeatureSet,
    /// Absolute number of training transactions holding both sides.
    pub support: u64,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub antecedent_support: Option<f64>,
    #[serde(default)]
    pub consequent_support: Option<f64>,
    #[serde(default)]
    pub lift: Option<f64>,
    #[serde(default)]
    pub leverage: Option<f64>,
    #[serde(default)]
    pub conviction: Option<Conviction>,
    #[serde(default)]
    pub zhangs_metric: Option<f64>,
    pub direction: RuleDirection,
}

impl RuleRecord {
    pub fn from_rule(directed: &DirectedRule, schema: &Schema) -> Self {
        let rule = &directed.rule;
        let metrics = rule.metrics.as_ref();
        Self {
            antecedent: FeatureSet::from_itemset(&rule.antecedent, schema),
            consequent: FeatureSet::from_itemset(&rule.consequent, schema),
            support: rule.support_count as u64,
            confidence: rule.confidence,
            antecedent_support: metrics.map(|m| m.antecedent_support),
            consequent_support: metrics.map(|m| m.consequent_support),
            lift: metrics.map(|m| m.lift),
            leverage: metrics.map(|m| m.leverage),
            conviction: metrics.map(|m| m.conviction),
            zhangs_metric: metrics.and_then(|m| m.zhangs_metric),
            direction: directed.direction,
        }
    }
}

/// A persisted rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSetDocument {
    pub format_version: u32,
    /// Version of the feature-set text codec used by the CSV form.
    #[serde(default = "default_codec_version")]
    pub codec_version: u32,
    #[serde(default)]
    pub parameters: Option<RunParameters>,
    #[serde(default)]
    pub training_transactions: Option<usize>,
    pub rules: Vec<RuleRecord>,
}

fn default_codec_version() -> u32 {
    CODEC_VERSION
}

impl RuleSetDocument {
    pub fn new(rules: Vec<RuleRecord>) -> Self {
        Self {
            format_version: RULE_SET_FORMAT_VERSION,
            codec_version: CODEC_VERSION,
            parameters: None,
            training_transactions: None,
            rules,
        }
    }

    pub fn with_run(mut self, parameters: RunParameters, training_transactions: usize) -> Self {
        self.parameters = Some(parameters);
        self.training_transactions = Some(training_transactions);
        self
    }
}

/// On-disk form of a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Json,
    Csv,
}

impl RuleFormat {
    pub fn extension(self) -> &'static str {
        match self {
            RuleFormat::Json => "json",
            RuleFormat::Csv => "csv",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(RuleFormat::Json),
            Some("csv") => Ok(RuleFormat::Csv),
            _ => Err(RuleMineError::invalid_config(
                "rules",
                path.display().to_string(),
                "rule sets must be .json or .csv",
            )),
        }
    }
}

impl FromStr for RuleFormat {
    type Err = RuleMineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(RuleFormat::Json),
            "csv" => Ok(RuleFormat::Csv),
            other => Err(RuleMineError::invalid_config("format", other, "expected json or csv")),
        }
    }
}

/// `rules_support_{s}_confidence_{c}.{ext}`
pub fn rules_file_name(min_support: f64, min_confidence: f64, format: RuleFormat) -> String {
    format!(
        "rules_support_{}_confidence_{}.{}",
        min_support,
        min_confidence,
        format.extension()
    )
}

/// Write a rule set, picking the format from the extension.
pub fn write_rule_set(path: &Path, document: &RuleSetDocument) -> Result<()> {
    let text = match RuleFormat::from_path(path)? {
        RuleFormat::Json => serde_json::to_string_pretty(document)?,
        RuleFormat::Csv => rules_to_csv(&document.rules),
    };
    std::fs::write(path, text)?;
    Ok(())
}

/// Load a rule set, picking the format from the extension.
pub fn read_rule_set(path: &Path) -> Result<RuleSetDocument> {
    let format = RuleFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    match format {
        RuleFormat::Json => {
            let document: RuleSetDocument = serde_json::from_str(&text)?;
            if document.format_version != RULE_SET_FORMAT_VERSION {
                return Err(RuleMineError::Serialization(format!(
                    "unsupported rule set format_version {} (expected {})",
                    document.format_version, RULE_SET_FORMAT_VERSION
                )));
            }
            Ok(document)
        }
        RuleFormat::Csv => Ok(RuleSetDocument::new(rules_from_csv(&text)?)),
    }
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn rules_to_csv(rules: &[RuleRecord]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');
    for r in rules {
        let fields = [
            r.antecedent.encode(),
            r.consequent.encode(),
            opt(r.antecedent_support),
            opt(r.consequent_support),
            r.support.to_string(),
            opt(r.confidence),
            opt(r.lift),
            opt(r.leverage),
            r.conviction.map(|c| c.to_string()).unwrap_or_default(),
            opt(r.zhangs_metric),
            r.direction.to_string(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn parse_opt(field: &str, name: &str, line: usize) -> Result<Option<f64>> {
    if field.is_empty() {
        return Ok(None);
    }
    field.parse::<f64>().map(Some).map_err(|_| {
        RuleMineError::Serialization(format!("line {}: invalid {} '{}'", line, name, field))
    })
}

/// Parse the CSV export. Any malformed record fails the whole load.
pub fn rules_from_csv(text: &str) -> Result<Vec<RuleRecord>> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim_end_matches('\r')));
    let header = lines
        .next()
        .map(|(_, l)| l)
        .ok_or_else(|| RuleMineError::Serialization("empty rule file".into()))?;
    if split_escaped(header, ',') != CSV_HEADER {
        return Err(RuleMineError::Serialization(format!(
            "unexpected rule file header '{}'",
            header
        )));
    }

    let mut rules = Vec::new();
    for (line_no, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let f = split_escaped(line, ',');
        if f.len() != CSV_HEADER.len() {
            return Err(RuleMineError::Serialization(format!(
                "line {}: expected {} fields, found {}",
                line_no,
                CSV_HEADER.len(),
                f.len()
            )));
        }
        let support = f[4].parse::<u64>().map_err(|_| {
            RuleMineError::Serialization(format!("line {}: invalid support '{}'", line_no, f[4]))
        })?;
        let conviction = if f[8].is_empty() {
            None
        } else {
            Some(f[8].parse::<Conviction>()?)
        };
        rules.push(RuleRecord {
            antecedent: FeatureSet::decode(f[0])?,
            consequent: FeatureSet::decode(f[1])?,
            support,
            confidence: parse_opt(f[5], "confidence", line_no)?,
            antecedent_support: parse_opt(f[2], "antecedent_support", line_no)?,
            consequent_support: parse_opt(f[3], "consequent_support", line_no)?,
            lift: parse_opt(f[6], "lift", line_no)?,
            leverage: parse_opt(f[7], "leverage", line_no)?,
            conviction,
            zhangs_metric: parse_opt(f[9], "zhangs_metric", line_no)?,
            direction: f[10].parse()?,
        });
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulemine_core::error::ItemsetParseError;

    fn record(ant: &[&str], cons: &[&str], confidence: Option<f64>) -> RuleRecord {
        RuleRecord {
            antecedent: FeatureSet::from_names(ant.iter().copied()).unwrap(),
            consequent: FeatureSet::from_names(cons.iter().copied()).unwrap(),
            support: 12,
            confidence,
            antecedent_support: confidence.map(|_| 0.4),
            consequent_support: confidence.map(|_| 0.5),
            lift: confidence.map(|c| c / 0.5),
            leverage: confidence.map(|_| 0.05),
            conviction: confidence.map(|c| Conviction::compute(0.5, c)),
            zhangs_metric: None,
            direction: RuleDirection::InfluencerToUser,
        }
    }

    #[test]
    fn file_name_convention() {
        assert_eq!(
            rules_file_name(0.1, 0.3, RuleFormat::Csv),
            "rules_support_0.1_confidence_0.3.csv"
        );
    }

    #[test]
    fn csv_keeps_escaped_names_and_sentinels() {
        let rules = vec![
            record(&["inf_a,b", "inf_c"], &["usr_{d}"], Some(1.0)),
            record(&["inf_x"], &["usr_y"], None),
        ];
        let text = rules_to_csv(&rules);
        assert!(text.contains(r"{inf_a\,b,inf_c},{usr_\{d\}}"));
        assert!(text.contains(",inf,"));
        assert_eq!(rules_from_csv(&text).unwrap(), rules);
    }

    #[test]
    fn malformed_feature_set_fails_the_load() {
        let mut text = rules_to_csv(&[record(&["inf_a"], &["usr_b"], Some(0.5))]);
        text = text.replace("{inf_a}", "inf_a");
        let err = rules_from_csv(&text).unwrap_err();
        assert!(matches!(
            err,
            RuleMineError::Itemset(ItemsetParseError::MissingBraces(_))
        ));
    }

    #[test]
    fn rejects_unknown_extension_and_version() {
        assert!(RuleFormat::from_path(Path::new("rules.txt")).is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        let mut doc = RuleSetDocument::new(vec![]);
        doc.format_version = 7;
        std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();
        assert!(matches!(
            read_rule_set(&path).unwrap_err(),
            RuleMineError::Serialization(_)
        ));
    }
}
