//! Configuration surface of the engine.
//!
//! Everything pattern-shaped lives here as an explicit, immutable config
//! object handed to the pipeline at construction. There is no process-wide
//! pattern state: patterns are compiled once into [`CompiledPatterns`] and
//! shared by reference.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

/// Pattern cascades and anchors, as regex source strings.
///
/// Defaults target the São Paulo electronic justice gazette (DJE), but every
/// pattern can be swapped at construction for other courts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Canonical process-number anchor (CNJ numbering:
    /// digits-digits.year.branch.court.origin).
    pub process_anchor: String,

    /// Lawyer-citation marker: a name followed by "(OAB <digits>/<state>)".
    ///
    /// Used by the scanner to flag truncation and by the merger to validate
    /// splices; the extraction cascade below is what actually captures
    /// lawyers.
    pub lawyer_marker: String,

    /// Ordered lawyer cascade, most specific first.
    ///
    /// Every entry captures (1) name, (2) OAB number and optionally
    /// (3) OAB state.
    pub lawyer_cascade: Vec<String>,

    /// Role keywords that terminate the author segment (matched as
    /// `keyword:`).
    pub author_keywords: Vec<String>,

    /// Role keywords that introduce the defendant.
    pub defendant_keywords: Vec<String>,

    /// Label-anchored monetary patterns; group 1 captures the value token.
    pub money_gross: String,
    pub money_net: String,
    pub money_interest: String,
    pub money_fees: String,

    /// Label-anchored date patterns; group 1 captures ISO or DD/MM/YYYY.
    pub date_publication: String,
    pub date_availability: String,
}

/// Name shape shared by the lawyer patterns: starts uppercase, letters and
/// spaces only. Dots and colons are excluded so preamble words ("Vistos.",
/// "ADV:") cannot bleed into the captured name.
const NAME: &str = r"[A-ZÀ-Ú][A-ZÀ-Úa-zà-ú\s]{2,80}?";

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            process_anchor: r"\d{7}-\d{2}\.\d{4}\.\d\.\d{2}\.\d{4}".to_string(),
            lawyer_marker: format!(
                r"{NAME}\s*\(\s*OAB[\s.:]*\d{{1,6}}(?:\s*/\s*[A-Z]{{2}})?\s*\)"
            ),
            lawyer_cascade: vec![
                // "ADV: NAME (OAB 12345/SP)"
                format!(r"ADV[.:]\s*({NAME})\s*\(\s*OAB[\s.:]*(\d{{1,6}})\s*/\s*([A-Z]{{2}})\s*\)"),
                // "ADVOGADO: NAME (OAB 12345/SP)"
                format!(
                    r"ADVOGAD[OA]S?[.:]\s*({NAME})\s*\(\s*OAB[\s.:]*(\d{{1,6}})\s*/\s*([A-Z]{{2}})\s*\)"
                ),
                // "NAME (OAB 12345/SP)" - catches comma-separated lists
                format!(r"({NAME})\s*\(\s*OAB[\s.:]*(\d{{1,6}})\s*/\s*([A-Z]{{2}})\s*\)"),
                // "NAME (OAB 12345 SP)" - missing slash
                format!(r"({NAME})\s*\(\s*OAB[\s.:]*(\d{{1,6}})\s+([A-Z]{{2}})\s*\)"),
                // "NAME - OAB 12345/SP" - no parentheses
                format!(r"({NAME})\s*[-,]\s*OAB[\s.:]*(\d{{1,6}})\s*/\s*([A-Z]{{2}})"),
                // "NAME (OAB 12345)" - loosest, no state
                format!(r"({NAME})\s*\(\s*OAB[\s.:]*(\d{{1,6}})\s*\)"),
            ],
            author_keywords: vec![
                "autores".to_string(),
                "autora".to_string(),
                "autor".to_string(),
                "requerentes".to_string(),
                "requerente".to_string(),
                "exequente".to_string(),
                "reclamante".to_string(),
            ],
            defendant_keywords: vec![
                "réus".to_string(),
                "réu".to_string(),
                "ré".to_string(),
                "requerida".to_string(),
                "requerido".to_string(),
                "executada".to_string(),
                "executado".to_string(),
                "reclamada".to_string(),
                "reclamado".to_string(),
            ],
            money_gross: r"(?i)valor\s+principal\s+bruto[^\d]{0,40}?(\d[\d.,]*)".to_string(),
            money_net: r"(?i)valor\s+principal\s+l[íi]quido[^\d]{0,40}?(\d[\d.,]*)".to_string(),
            money_interest: r"(?i)\bjuros(?:\s+morat[óo]rios?)?[^\d]{0,40}?(\d[\d.,]*)"
                .to_string(),
            money_fees: r"(?i)honor[áa]rios(?:\s+advocat[íi]cios)?[^\d]{0,40}?(\d[\d.,]*)"
                .to_string(),
            date_publication:
                r"(?i)(?:data\s+d[ea]\s+publica[çc][ãa]o|publicad[oa]\s+em)[^\d]{0,20}?(\d{2}/\d{2}/\d{4}|\d{4}-\d{2}-\d{2})"
                    .to_string(),
            date_availability:
                r"(?i)(?:data\s+d[ea]\s+disponibiliza[çc][ãa]o|disponibilizad[oa]\s+em)[^\d]{0,20}?(\d{2}/\d{2}/\d{4}|\d{4}-\d{2}-\d{2})"
                    .to_string(),
        }
    }
}

impl PatternConfig {
    /// Compile all patterns once. Fails fast at pipeline construction if any
    /// configured pattern is invalid.
    pub fn compile(&self) -> Result<CompiledPatterns> {
        let cascade = self
            .lawyer_cascade
            .iter()
            .enumerate()
            .map(|(i, src)| compile_one(&format!("lawyer_cascade[{}]", i), src))
            .collect::<Result<Vec<_>>>()?;

        let author_role = format!(r"(?i)\b(?:{})\s*:", self.author_keywords.join("|"));
        let defendant_role = format!(
            r"(?i)\b(?:{})\s*:\s*([^-;\n]{{3,100}})",
            self.defendant_keywords.join("|")
        );

        Ok(CompiledPatterns {
            anchor: compile_one("process_anchor", &self.process_anchor)?,
            lawyer_marker: compile_one("lawyer_marker", &self.lawyer_marker)?,
            lawyer_cascade: cascade,
            author_role: compile_one("author_keywords", &author_role)?,
            defendant_role: compile_one("defendant_keywords", &defendant_role)?,
            money_gross: compile_one("money_gross", &self.money_gross)?,
            money_net: compile_one("money_net", &self.money_net)?,
            money_interest: compile_one("money_interest", &self.money_interest)?,
            money_fees: compile_one("money_fees", &self.money_fees)?,
            date_publication: compile_one("date_publication", &self.date_publication)?,
            date_availability: compile_one("date_availability", &self.date_availability)?,
        })
    }
}

fn compile_one(name: &str, src: &str) -> Result<Regex> {
    Regex::new(src).map_err(|source| ExtractError::Pattern {
        name: name.to_string(),
        source,
    })
}

/// Compiled form of [`PatternConfig`], built once per pipeline.
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    pub anchor: Regex,
    pub lawyer_marker: Regex,
    pub lawyer_cascade: Vec<Regex>,
    pub author_role: Regex,
    pub defendant_role: Regex,
    pub money_gross: Regex,
    pub money_net: Regex,
    pub money_interest: Regex,
    pub money_fees: Regex,
    pub date_publication: Regex,
    pub date_availability: Regex,
}

/// Weights for the quality score. Each term contributes only when its field
/// is non-empty; the sum is clamped to [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub process_number: f32,
    pub authors: f32,
    pub lawyers: f32,
    pub monetary: f32,
    pub date: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            process_number: 0.2,
            authors: 0.3,
            lawyers: 0.2,
            monetary: 0.2,
            date: 0.1,
        }
    }
}

/// Engine configuration, consumed at pipeline construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Page-cache capacity (entries). Default: 50.
    pub cache_capacity: usize,

    /// Accept threshold for the enhanced path. Default: 0.7.
    pub quality_threshold: f32,

    /// Merge hops per direction. Fixed at 1; validated, not tunable upward.
    pub max_merge_hops: u32,

    /// Chars taken from an adjoining page when it carries no anchor to cut
    /// at. Default: 3000.
    pub merge_safety_budget: usize,

    /// Trailing window re-scanned for comma-separated lawyer lists.
    /// Default: 500.
    pub tail_window: usize,

    /// How far into a page's pre-anchor prefix a lawyer citation must start
    /// for the prefix to count as head truncation. Default: 160.
    pub head_probe_window: usize,

    /// Score penalty for unresolved or rejected merges. Default: 0.1.
    pub truncation_penalty: f32,

    /// Pattern cascades.
    pub patterns: PatternConfig,

    /// Quality-score weights.
    pub weights: ScoreWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 50,
            quality_threshold: 0.7,
            max_merge_hops: 1,
            merge_safety_budget: 3000,
            tail_window: 500,
            head_probe_window: 160,
            truncation_penalty: 0.1,
            patterns: PatternConfig::default(),
            weights: ScoreWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the quality threshold.
    pub fn with_quality_threshold(mut self, threshold: f32) -> Self {
        self.quality_threshold = threshold;
        self
    }

    /// Set the merge safety budget.
    pub fn with_merge_safety_budget(mut self, chars: usize) -> Self {
        self.merge_safety_budget = chars;
        self
    }

    /// Set the truncation penalty.
    pub fn with_truncation_penalty(mut self, penalty: f32) -> Self {
        self.truncation_penalty = penalty;
        self
    }

    /// Replace the pattern config.
    pub fn with_patterns(mut self, patterns: PatternConfig) -> Self {
        self.patterns = patterns;
        self
    }

    /// Replace the score weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Validate invariants before the pipeline is built.
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(ExtractError::Config {
                reason: "cache_capacity must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.quality_threshold) {
            return Err(ExtractError::Config {
                reason: format!(
                    "quality_threshold must be within [0, 1], got {}",
                    self.quality_threshold
                ),
            });
        }
        // Multi-page chains cascade fetches; one hop per direction is a hard
        // bound, not a tunable.
        if self.max_merge_hops != 1 {
            return Err(ExtractError::Config {
                reason: format!("max_merge_hops is fixed at 1, got {}", self.max_merge_hops),
            });
        }
        if self.merge_safety_budget == 0 {
            return Err(ExtractError::Config {
                reason: "merge_safety_budget must be positive".to_string(),
            });
        }
        if self.truncation_penalty < 0.0 {
            return Err(ExtractError::Config {
                reason: "truncation_penalty must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_patterns_compile() {
        PatternConfig::default().compile().expect("defaults compile");
    }

    #[test]
    fn default_config_validates() {
        EngineConfig::default().validate().expect("defaults valid");
    }

    #[test]
    fn rejects_zero_capacity() {
        let config = EngineConfig::new().with_cache_capacity(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_tuned_merge_hops() {
        let mut config = EngineConfig::new();
        config.max_merge_hops = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let config = EngineConfig::new().with_quality_threshold(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_pattern_reports_its_name() {
        let mut patterns = PatternConfig::default();
        patterns.process_anchor = "([unclosed".to_string();

        let err = patterns.compile().unwrap_err();
        assert!(err.to_string().contains("process_anchor"));
    }

    #[test]
    fn anchor_matches_cnj_format() {
        let compiled = PatternConfig::default().compile().unwrap();
        assert!(compiled.anchor.is_match("1234567-89.2024.8.26.0100"));
        assert!(!compiled.anchor.is_match("1234567-89.2024"));
    }

    #[test]
    fn marker_matches_with_and_without_state() {
        let compiled = PatternConfig::default().compile().unwrap();
        assert!(compiled.lawyer_marker.is_match("MARCIO SILVA (OAB 45683/SP)"));
        assert!(compiled.lawyer_marker.is_match("MARCIO SILVA (OAB 45683)"));
        assert!(!compiled.lawyer_marker.is_match("sem citação aqui"));
    }
}
