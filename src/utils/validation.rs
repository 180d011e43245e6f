use crate::core::scoring::is_valid_vess_score;
use crate::domain::model::{
    CreateUserData, EvaluationData, EvaluationUpdate, LayerData, SampleData, UpdateUserData,
};
use crate::utils::error::{Result, ValidationErrors, VessError};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Request payloads report every violation at once instead of failing fast.
pub trait ValidateFields {
    fn field_errors(&self) -> ValidationErrors;
}

macro_rules! validate_by_fields {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Validate for $ty {
                fn validate(&self) -> Result<()> {
                    self.field_errors().into_result()
                }
            }
        )+
    };
}

validate_by_fields!(
    LayerData,
    SampleData,
    EvaluationData,
    EvaluationUpdate,
    CreateUserData,
    UpdateUserData,
);

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

impl ValidateFields for LayerData {
    fn field_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if !self.length.is_finite() || self.length <= 0.0 {
            errors.add("length", "Comprimento deve ser positivo");
        }
        if !is_valid_vess_score(self.score) {
            errors.add("score", "Escore deve ser um valor VESS válido");
        }
        if self.order < 1 {
            errors.add("order", "Ordem deve ser um número inteiro positivo");
        }
        errors
    }
}

impl ValidateFields for SampleData {
    fn field_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.is_empty() {
            errors.add("name", "Nome da amostra é obrigatório");
        }
        if self.layers.is_empty() {
            errors.add("layers", "Pelo menos uma camada é obrigatória");
        }
        for (i, layer) in self.layers.iter().enumerate() {
            errors.merge_prefixed(&format!("layers[{}]", i), layer.field_errors());
        }
        errors
    }
}

impl ValidateFields for EvaluationData {
    fn field_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.name.is_empty() {
            errors.add("name", "Nome da avaliação é obrigatório");
        }
        if self.date.is_empty() {
            errors.add("date", "Data é obrigatória");
        }
        if self.start_time.is_empty() {
            errors.add("startTime", "Hora de início é obrigatória");
        }
        if self.samples.is_empty() {
            errors.add("samples", "Pelo menos uma amostra é obrigatória");
        }
        for (i, sample) in self.samples.iter().enumerate() {
            errors.merge_prefixed(&format!("samples[{}]", i), sample.field_errors());
        }
        errors
    }
}

impl ValidateFields for EvaluationUpdate {
    fn field_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            if name.is_empty() {
                errors.add("name", "Nome da avaliação é obrigatório");
            }
        }
        errors
    }
}

impl ValidateFields for CreateUserData {
    fn field_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if !is_valid_email(&self.email) {
            errors.add("email", "Email inválido");
        }
        if self.name.chars().count() < 2 {
            errors.add("name", "Nome deve ter pelo menos 2 caracteres");
        }
        if self.password.chars().count() < 6 {
            errors.add("password", "Senha deve ter pelo menos 6 caracteres");
        }
        errors
    }
}

impl ValidateFields for UpdateUserData {
    fn field_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            if name.chars().count() < 2 {
                errors.add("name", "Nome deve ter pelo menos 2 caracteres");
            }
        }
        errors
    }
}

// ---- configuration helpers ----

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(VessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(VessError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(VessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(VessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(VessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(VessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(layers: Vec<LayerData>) -> SampleData {
        SampleData {
            name: "Amostra 1".to_string(),
            location: None,
            other_info: None,
            management_decision: None,
            layers,
        }
    }

    fn evaluation(samples: Vec<SampleData>) -> EvaluationData {
        EvaluationData {
            name: "Campo Norte".to_string(),
            date: "2024-01-15".to_string(),
            start_time: "09:00".to_string(),
            end_time: None,
            management_description: None,
            samples,
        }
    }

    #[test]
    fn test_layer_rules() {
        let ok = LayerData { length: 10.0, score: 2.5, order: 1 };
        assert!(ok.validate().is_ok());

        let bad = LayerData { length: 0.0, score: 2.6, order: 0 };
        let errors = bad.field_errors();
        assert_eq!(errors.len(), 3);
        assert!(errors.has_field("length"));
        assert!(errors.has_field("score"));
        assert!(errors.has_field("order"));

        let nan = LayerData { length: f64::NAN, score: 3.0, order: 1 };
        assert!(nan.field_errors().has_field("length"));
    }

    #[test]
    fn test_nested_paths_are_reported() {
        let data = evaluation(vec![
            sample(vec![LayerData { length: 10.0, score: 3.0, order: 1 }]),
            sample(vec![
                LayerData { length: 10.0, score: 3.0, order: 1 },
                LayerData { length: -1.0, score: 7.0, order: 2 },
            ]),
        ]);

        let errors = data.field_errors();
        assert!(errors.has_field("samples[1].layers[1].length"));
        assert!(errors.has_field("samples[1].layers[1].score"));
        assert!(!errors.has_field("samples[0].layers[0].score"));

        match data.validate() {
            Err(VessError::Validation(report)) => assert_eq!(report.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_collections_rejected() {
        let errors = evaluation(vec![]).field_errors();
        assert!(errors.has_field("samples"));

        let errors = evaluation(vec![sample(vec![])]).field_errors();
        assert!(errors.has_field("samples[0].layers"));
    }

    #[test]
    fn test_user_rules() {
        let data = CreateUserData {
            email: "demo@vess.com".to_string(),
            name: "Demo".to_string(),
            password: "123456".to_string(),
            address: None,
            country: None,
            city_state: None,
            language: None,
        };
        assert!(data.validate().is_ok());

        let bad = CreateUserData {
            email: "not-an-email".to_string(),
            name: "D".to_string(),
            password: "123".to_string(),
            ..data
        };
        let errors = bad.field_errors();
        assert!(errors.has_field("email"));
        assert!(errors.has_field("name"));
        assert!(errors.has_field("password"));

        let update = UpdateUserData {
            name: Some("X".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(UpdateUserData::default().validate().is_ok());
    }

    #[test]
    fn test_evaluation_update_rules() {
        let update = EvaluationUpdate {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(update.field_errors().has_field("name"));
        assert!(EvaluationUpdate::default().validate().is_ok());

        let spaces = EvaluationUpdate {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(spaces.validate().is_ok());
    }

    #[test]
    fn test_required_text_only_rejects_empty() {
        let layers = vec![LayerData { length: 10.0, score: 3.0, order: 1 }];

        let mut spaced = evaluation(vec![SampleData {
            name: " ".to_string(),
            ..sample(layers.clone())
        }]);
        spaced.name = "  ".to_string();
        spaced.date = " ".to_string();
        spaced.start_time = " ".to_string();
        assert!(spaced.validate().is_ok());

        let mut empty = evaluation(vec![SampleData {
            name: String::new(),
            ..sample(layers)
        }]);
        empty.name.clear();
        empty.date.clear();
        empty.start_time.clear();
        let errors = empty.field_errors();
        assert!(errors.has_field("name"));
        assert!(errors.has_field("date"));
        assert!(errors.has_field("startTime"));
        assert!(errors.has_field("samples[0].name"));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("cors_origin", "https://example.com").is_ok());
        assert!(validate_url("cors_origin", "http://localhost:5173").is_ok());
        assert!(validate_url("cors_origin", "").is_err());
        assert!(validate_url("cors_origin", "invalid-url").is_err());
        assert!(validate_url("cors_origin", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("max_page_size", 100u32, 1, 1000).is_ok());
        assert!(validate_range("max_page_size", 0u32, 1, 1000).is_err());
    }
}
