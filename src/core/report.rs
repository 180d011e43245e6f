use crate::core::scoring::{
    categorize_score, format_score_for_display, generate_evaluation_summary,
    management_recommendation,
};
use crate::domain::model::{EvaluationStats, EvaluationWithUser};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, VessError};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = VessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(VessError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: text, json, csv".to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    evaluations: &'a [EvaluationWithUser],
    stats: &'a EvaluationStats,
}

/// One CSV row per sample.
#[derive(Serialize)]
struct SampleRow<'a> {
    evaluation_id: &'a str,
    evaluation_name: &'a str,
    date: &'a str,
    evaluation_score: f64,
    evaluation_category: &'static str,
    sample_name: &'a str,
    sample_score: f64,
    sample_category: &'static str,
    layers: usize,
    recommendation: &'static str,
}

pub fn render_report(
    evaluations: &[EvaluationWithUser],
    stats: &EvaluationStats,
    format: ReportFormat,
) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(evaluations, stats)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(&JsonReport { evaluations, stats })?),
        ReportFormat::Csv => render_csv(evaluations),
    }
}

fn render_text(evaluations: &[EvaluationWithUser], stats: &EvaluationStats) -> String {
    let mut lines: Vec<String> = Vec::new();

    for item in evaluations {
        let evaluation = &item.evaluation;
        let score = evaluation.average_score;
        lines.push(format!("== {} ==", evaluation.name));
        lines.push(generate_evaluation_summary(item));
        lines.push(format!(
            "Escore Qe-VESS: {} ({})",
            format_score_for_display(score),
            categorize_score(score)
        ));
        let recommendation = management_recommendation(score);
        if !recommendation.is_empty() {
            lines.push(recommendation.to_string());
        }
        for sample in &evaluation.samples {
            lines.push(format!(
                "  - {}: {} ({}, {} camadas)",
                sample.name,
                format_score_for_display(sample.sample_score),
                categorize_score(sample.sample_score),
                sample.layers.len()
            ));
        }
        lines.push(String::new());
    }

    let dist = &stats.score_distribution;
    lines.push(format!("Avaliações: {}", stats.total_evaluations));
    lines.push(format!("Amostras: {}", stats.total_samples));
    lines.push(format!(
        "Escore médio: {}",
        format_score_for_display(stats.average_score)
    ));
    lines.push(format!(
        "Distribuição: excellent={} reasonable={} poor={}",
        dist.excellent, dist.reasonable, dist.poor
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn render_csv(evaluations: &[EvaluationWithUser]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for item in evaluations {
        let evaluation = &item.evaluation;
        for sample in &evaluation.samples {
            writer.serialize(SampleRow {
                evaluation_id: &evaluation.id,
                evaluation_name: &evaluation.name,
                date: &evaluation.date,
                evaluation_score: evaluation.average_score,
                evaluation_category: categorize_score(evaluation.average_score).as_str(),
                sample_name: &sample.name,
                sample_score: sample.sample_score,
                sample_category: categorize_score(sample.sample_score).as_str(),
                layers: sample.layers.len(),
                recommendation: management_recommendation(sample.sample_score),
            })?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| VessError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| VessError::ConfigError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

/// Renders a report and hands it to storage.
pub struct ReportWriter<S: Storage> {
    storage: S,
    file_stem: String,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            file_stem: "qe_vess_report".to_string(),
        }
    }

    pub fn with_file_stem(mut self, stem: &str) -> Self {
        self.file_stem = stem.to_string();
        self
    }

    /// Returns the path the report was written to.
    pub async fn write(
        &self,
        evaluations: &[EvaluationWithUser],
        stats: &EvaluationStats,
        format: ReportFormat,
    ) -> Result<String> {
        let content = render_report(evaluations, stats, format)?;
        let file_name = format!("{}.{}", self.file_stem, format.extension());
        let path = self.storage.write_file(&file_name, content.as_bytes()).await?;
        tracing::info!("📁 Report written to {}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::DECISION_REASONABLE;
    use crate::domain::model::{Evaluation, Layer, Sample, ScoreDistribution, UserSummary};
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStorage {
        files: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl Storage for RecordingStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().unwrap();
            files
                .iter()
                .find(|(name, _)| name == path)
                .map(|(_, data)| data.clone())
                .ok_or_else(|| VessError::not_found("File", path))
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
            self.files
                .lock()
                .unwrap()
                .push((path.to_string(), data.to_vec()));
            Ok(format!("memory://{}", path))
        }
    }

    fn fixture() -> (Vec<EvaluationWithUser>, EvaluationStats) {
        let now = Utc::now();
        let layer = |order: i32, score: f64| Layer {
            id: format!("l{}", order),
            length: 10.0,
            score,
            order,
        };
        let evaluation = Evaluation {
            id: "e1".to_string(),
            user_id: "u1".to_string(),
            name: "Campo Sul".to_string(),
            date: "2024-05-02".to_string(),
            start_time: "08:00".to_string(),
            end_time: Some("10:00".to_string()),
            management_description: None,
            average_score: 3.2,
            samples: vec![
                Sample {
                    id: "s1".to_string(),
                    name: "Amostra 1".to_string(),
                    location: None,
                    other_info: None,
                    management_decision: None,
                    sample_score: 2.5,
                    layers: vec![layer(1, 2.0), layer(2, 3.0)],
                },
                Sample {
                    id: "s2".to_string(),
                    name: "Amostra 2".to_string(),
                    location: None,
                    other_info: None,
                    management_decision: None,
                    sample_score: 4.0,
                    layers: vec![layer(1, 4.0)],
                },
            ],
            created_at: now,
            updated_at: now,
        };
        let stats = EvaluationStats {
            total_evaluations: 1,
            total_samples: 2,
            average_score: 3.2,
            score_distribution: ScoreDistribution {
                excellent: 0,
                reasonable: 1,
                poor: 0,
            },
            recent_activity: Default::default(),
        };
        let user = UserSummary {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@vess.com".to_string(),
        };
        (vec![EvaluationWithUser { evaluation, user }], stats)
    }

    #[test]
    fn test_text_report() {
        let (evaluations, stats) = fixture();
        let text = render_report(&evaluations, &stats, ReportFormat::Text).unwrap();

        assert!(text.contains("== Campo Sul =="));
        assert!(text.contains("2 amostras\nAvaliador: Ana"));
        assert!(text.contains("Escore Qe-VESS: 3,2 (reasonable)"));
        assert!(text.contains("  - Amostra 2: 4 (poor, 1 camadas)"));
        assert!(text.contains("Distribuição: excellent=0 reasonable=1 poor=0"));
    }

    #[test]
    fn test_text_report_layout() {
        let (evaluations, stats) = fixture();
        let text = render_report(&evaluations, &stats, ReportFormat::Text).unwrap();

        let expected = format!(
            "== Campo Sul ==\n\
             2 amostras\nAvaliador: Ana\nData das avaliações: 2024-05-02\nHora: 08:00 - 10:00\n\
             Escore Qe-VESS: 3,2 (reasonable)\n\
             {}\n\
             \x20 - Amostra 1: 2,5 (excellent, 2 camadas)\n\
             \x20 - Amostra 2: 4 (poor, 1 camadas)\n\
             \n\
             Avaliações: 1\nAmostras: 2\nEscore médio: 3,2\n\
             Distribuição: excellent=0 reasonable=1 poor=0\n",
            DECISION_REASONABLE
        );
        assert_eq!(text, expected);

        let empty = render_report(&[], &EvaluationStats::default(), ReportFormat::Text).unwrap();
        assert_eq!(
            empty,
            "Avaliações: 0\nAmostras: 0\nEscore médio: 0\nDistribuição: excellent=0 reasonable=0 poor=0\n"
        );
    }

    #[test]
    fn test_writer_names_file_after_stem_and_format() {
        let (evaluations, stats) = fixture();
        let writer = ReportWriter::new(RecordingStorage::default()).with_file_stem("campo_sul");

        let path = tokio_test::block_on(writer.write(&evaluations, &stats, ReportFormat::Csv))
            .unwrap();
        assert_eq!(path, "memory://campo_sul.csv");

        let stored = tokio_test::block_on(writer.storage.read_file("campo_sul.csv")).unwrap();
        let csv_text = String::from_utf8(stored).unwrap();
        assert!(csv_text.contains("Amostra 2,4.0,poor,1"));
    }

    #[test]
    fn test_csv_report_has_row_per_sample() {
        let (evaluations, stats) = fixture();
        let csv_text = render_report(&evaluations, &stats, ReportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv_text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("evaluation_id,evaluation_name,date,evaluation_score"));
        assert!(lines[1].contains("Amostra 1,2.5,excellent,2"));
        assert!(lines[2].contains("Amostra 2,4.0,poor,1"));
    }

    #[test]
    fn test_json_report_uses_camel_case() {
        let (evaluations, stats) = fixture();
        let json = render_report(&evaluations, &stats, ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["evaluations"][0]["averageScore"], 3.2);
        assert_eq!(value["evaluations"][0]["user"]["name"], "Ana");
        assert_eq!(value["stats"]["scoreDistribution"]["reasonable"], 1);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ReportFormat>().unwrap(), ReportFormat::Csv);
        assert_eq!("txt".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert!("xml".parse::<ReportFormat>().is_err());
    }
}
