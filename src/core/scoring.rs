//! Qe-VESS score engine.
//!
//! Stateless functions that turn raw layer measurements into sample and
//! evaluation scores, and scores into categories and management advice.
//! Inputs are trusted: validation happens before anything reaches here.

use crate::domain::model::{EvaluationWithUser, Layer, LayerData, ScoreCategory};
use chrono::{DateTime, Local};

/// The nine points of the VESS scale.
pub const VESS_SCORES: [f64; 9] = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];

pub const DECISION_GOOD: &str = "Amostras com escores Qe-VESS de 1-2,9 indicam um solo com boa qualidade estrutural e não requerem mudanças no manejo.";
pub const DECISION_REASONABLE: &str = "Amostras com escores Qe-VESS de 3-3,9 indicam um solo com qualidade estrutural razoável que pode ser melhorado. Para maximizar a exploração do solo pelas raízes das culturas, as mudanças no manejo devem ser a longo prazo.";
pub const DECISION_POOR: &str = "Amostras com escores Qe-VESS de 4-5 sugerem danos às funções do solo, comprometendo sua capacidade de suporte ao crescimento das culturas. Mudança de manejo deve ser a curto prazo.";

/// Anything that carries a layer length and a layer score.
pub trait LayerMeasurement {
    fn length(&self) -> f64;
    fn score(&self) -> f64;
}

impl LayerMeasurement for LayerData {
    fn length(&self) -> f64 {
        self.length
    }

    fn score(&self) -> f64 {
        self.score
    }
}

impl LayerMeasurement for Layer {
    fn length(&self) -> f64 {
        self.length
    }

    fn score(&self) -> f64 {
        self.score
    }
}

/// Round to one decimal place, ties away from zero (`3.25` → `3.3`).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Length-weighted mean of the layer scores. `order` plays no part.
pub fn compute_sample_score<L: LayerMeasurement>(layers: &[L]) -> f64 {
    if layers.is_empty() {
        return 0.0;
    }

    // sum in a canonical order so the rounding of a tie never depends on input order
    let mut pairs: Vec<(f64, f64)> = layers.iter().map(|l| (l.length(), l.score())).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let total_length: f64 = pairs.iter().map(|(length, _)| length).sum();
    if total_length == 0.0 {
        return 0.0;
    }

    let weighted_sum: f64 = pairs.iter().map(|(length, score)| score * length).sum();
    round1(weighted_sum / total_length)
}

/// Unweighted mean of the sample scores.
pub fn compute_evaluation_score(sample_scores: &[f64]) -> f64 {
    if sample_scores.is_empty() {
        return 0.0;
    }

    round1(ordered_sum(sample_scores) / sample_scores.len() as f64)
}

/// Sum of `values` taken in ascending order.
pub(crate) fn ordered_sum(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.iter().sum()
}

/// Scores below 1 fall through to `Poor`.
pub fn categorize_score(score: f64) -> ScoreCategory {
    if (1.0..3.0).contains(&score) {
        ScoreCategory::Excellent
    } else if (3.0..4.0).contains(&score) {
        ScoreCategory::Reasonable
    } else {
        ScoreCategory::Poor
    }
}

/// Management advice for a score. Unlike [`categorize_score`], scores below 1
/// (and NaN) get an empty string.
pub fn management_recommendation(score: f64) -> &'static str {
    if (1.0..3.0).contains(&score) {
        DECISION_GOOD
    } else if (3.0..4.0).contains(&score) {
        DECISION_REASONABLE
    } else if score >= 4.0 {
        DECISION_POOR
    } else {
        ""
    }
}

/// Exact membership in [`VESS_SCORES`].
pub fn is_valid_vess_score(score: f64) -> bool {
    VESS_SCORES.contains(&score)
}

/// Decimal comma, as shown to Brazilian users: `3.2` → `"3,2"`.
pub fn format_score_for_display(score: f64) -> String {
    score.to_string().replace('.', ",")
}

/// Multi-line header used on evaluation reports. When the evaluation has no
/// end time yet the current local time stands in.
pub fn generate_evaluation_summary(input: &EvaluationWithUser) -> String {
    summary_with_clock(input, Local::now())
}

fn summary_with_clock(input: &EvaluationWithUser, now: DateTime<Local>) -> String {
    let evaluation = &input.evaluation;
    let end_time = evaluation
        .end_time
        .clone()
        .unwrap_or_else(|| now.format("%H:%M").to_string());

    format!(
        "{} amostras\nAvaliador: {}\nData das avaliações: {}\nHora: {} - {}",
        evaluation.samples.len(),
        input.user.name,
        evaluation.date,
        evaluation.start_time,
        end_time
    )
}
