use crate::core::evaluation_service::EvaluationService;
use crate::core::user_service::UserService;
use crate::domain::model::{
    CreateUserData, EvaluationData, EvaluationWithUser, LayerData, SampleData, User,
};
use crate::domain::ports::{EvaluationRepository, UserRepository};
use crate::utils::error::Result;

pub const DEMO_EMAIL: &str = "demo@vess.com";

fn layer(length: f64, score: f64, order: i32) -> LayerData {
    LayerData { length, score, order }
}

pub fn demo_user() -> CreateUserData {
    CreateUserData {
        email: DEMO_EMAIL.to_string(),
        name: "Usuário Demo".to_string(),
        password: "123456".to_string(),
        address: Some("Rua das Plantas, 123".to_string()),
        country: Some("Brasil".to_string()),
        city_state: Some("Pato Branco - PR".to_string()),
        language: Some("Português (Brasil)".to_string()),
    }
}

pub fn demo_evaluation() -> EvaluationData {
    EvaluationData {
        name: "Avaliação Demo - Campo Norte".to_string(),
        date: "2024-01-15".to_string(),
        start_time: "09:00".to_string(),
        end_time: Some("11:30".to_string()),
        management_description: Some(
            "Solo com qualidade estrutural razoável. Recomenda-se rotação de culturas com sistema radicular abundante."
                .to_string(),
        ),
        samples: vec![
            SampleData {
                name: "Amostra 1".to_string(),
                location: Some("-26.2285, -52.6769".to_string()),
                other_info: Some("Solo argiloso, pós-colheita do milho".to_string()),
                management_decision: Some("Implementar rotação de culturas".to_string()),
                layers: vec![layer(8.0, 2.0, 1), layer(12.0, 3.5, 2), layer(5.0, 4.0, 3)],
            },
            SampleData {
                name: "Amostra 2".to_string(),
                location: Some("-26.2290, -52.6775".to_string()),
                other_info: Some("Solo arenoso, área de pastagem".to_string()),
                management_decision: Some("Reduzir tráfego de máquinas pesadas".to_string()),
                layers: vec![layer(10.0, 3.0, 1), layer(15.0, 3.5, 2)],
            },
        ],
    }
}

/// Registers the demo user (or reuses it) and stores the demo evaluation.
pub async fn seed_demo<U, E>(
    users: &UserService<U, E>,
    evaluations: &EvaluationService<E, U>,
) -> Result<(User, EvaluationWithUser)>
where
    U: UserRepository,
    E: EvaluationRepository,
{
    tracing::info!("🌱 Seeding demo data");

    let user = match users.find_by_email(DEMO_EMAIL).await? {
        Some(existing) => existing,
        None => users.register(demo_user()).await?,
    };
    let evaluation = evaluations.create(&user.id, demo_evaluation()).await?;

    tracing::info!(
        "📊 Demo evaluation created: {} (score {})",
        evaluation.evaluation.name,
        evaluation.evaluation.average_score
    );
    Ok((user, evaluation))
}
