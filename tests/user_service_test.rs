use qe_vess::core::seed::{demo_evaluation, seed_demo, DEMO_EMAIL};
use qe_vess::domain::model::{CreateUserData, UpdateUserData};
use qe_vess::{AppConfig, EvaluationService, InMemoryStore, UserService, VessError};
use std::sync::Arc;

fn services(
    config: &AppConfig,
) -> (
    UserService<InMemoryStore, InMemoryStore>,
    EvaluationService<InMemoryStore, InMemoryStore>,
) {
    let store = Arc::new(InMemoryStore::new());
    (
        UserService::new(store.clone(), store.clone(), config),
        EvaluationService::new(store.clone(), store, config),
    )
}

fn new_user(email: &str) -> CreateUserData {
    CreateUserData {
        email: email.to_string(),
        name: "Carla".to_string(),
        password: "123456".to_string(),
        address: None,
        country: None,
        city_state: None,
        language: None,
    }
}

#[tokio::test]
async fn test_register_applies_configured_defaults() {
    let mut config = AppConfig::default();
    config.defaults.country = "Uruguai".to_string();
    let (users, _) = services(&config);

    let user = users.register(new_user("carla@vess.com")).await.unwrap();
    assert_eq!(user.country, "Uruguai");
    assert_eq!(user.language, "Português (Brasil)");

    let profile = users.profile(&user.id).await.unwrap();
    assert_eq!(profile, user);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let (users, _) = services(&AppConfig::default());
    users.register(new_user("carla@vess.com")).await.unwrap();

    let err = users.register(new_user("carla@vess.com")).await.unwrap_err();
    assert!(matches!(err, VessError::Conflict { .. }));
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_register_validates_payload() {
    let (users, _) = services(&AppConfig::default());
    let err = users
        .register(CreateUserData {
            password: "123".to_string(),
            ..new_user("nope")
        })
        .await
        .unwrap_err();

    match err {
        VessError::Validation(report) => {
            assert!(report.has_field("email"));
            assert!(report.has_field("password"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_profile() {
    let (users, _) = services(&AppConfig::default());
    let user = users.register(new_user("carla@vess.com")).await.unwrap();

    let updated = users
        .update_profile(
            &user.id,
            UpdateUserData {
                city_state: Some("Pato Branco - PR".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.city_state.as_deref(), Some("Pato Branco - PR"));
    assert_eq!(updated.name, "Carla");
    assert!(updated.updated_at >= user.updated_at);

    assert!(users
        .update_profile("ghost", UpdateUserData::default())
        .await
        .is_err());
}

#[tokio::test]
async fn test_delete_user_cascades_to_evaluations() {
    let (users, evaluations) = services(&AppConfig::default());
    let user = users.register(new_user("carla@vess.com")).await.unwrap();
    let created = evaluations.create(&user.id, demo_evaluation()).await.unwrap();

    users.delete(&user.id).await.unwrap();

    assert!(users.profile(&user.id).await.is_err());
    assert!(evaluations
        .get(&user.id, &created.evaluation.id)
        .await
        .is_err());
    assert_eq!(evaluations.stats(&user.id).await.unwrap().total_evaluations, 0);
    assert!(users.delete(&user.id).await.is_err());
}

#[tokio::test]
async fn test_delete_user_clears_a_separate_evaluation_store() {
    use qe_vess::domain::ports::EvaluationRepository;

    let config = AppConfig::default();
    let user_store = Arc::new(InMemoryStore::new());
    let evaluation_store = Arc::new(InMemoryStore::new());
    let users = UserService::new(user_store.clone(), evaluation_store.clone(), &config);
    let evaluations = EvaluationService::new(evaluation_store.clone(), user_store.clone(), &config);

    let user = users.register(new_user("carla@vess.com")).await.unwrap();
    evaluations.create(&user.id, demo_evaluation()).await.unwrap();
    evaluations.create(&user.id, demo_evaluation()).await.unwrap();
    assert_eq!(evaluation_store.count_evaluations(&user.id).await.unwrap(), 2);

    users.delete(&user.id).await.unwrap();

    assert_eq!(evaluation_store.count_evaluations(&user.id).await.unwrap(), 0);
    assert!(user_store.snapshot().await.users.is_empty());
    assert!(users.delete(&user.id).await.is_err());
}

#[tokio::test]
async fn test_user_stats() {
    let (users, evaluations) = services(&AppConfig::default());
    let user = users.register(new_user("carla@vess.com")).await.unwrap();

    let empty = users.stats(&user.id).await.unwrap();
    assert_eq!(empty.total_evaluations, 0);
    assert!(empty.last_evaluation.is_none());
    assert_eq!(empty.member_since, user.created_at);

    evaluations.create(&user.id, demo_evaluation()).await.unwrap();
    let latest = evaluations.create(&user.id, demo_evaluation()).await.unwrap();

    let stats = users.stats(&user.id).await.unwrap();
    assert_eq!(stats.total_evaluations, 2);
    assert_eq!(stats.total_samples, 4);
    assert_eq!(stats.evaluations_this_month, 2);
    let last = stats.last_evaluation.unwrap();
    assert_eq!(last.id, latest.evaluation.id);
    assert_eq!(last.average_score, 3.2);
}

#[tokio::test]
async fn test_seed_demo_computes_scores() {
    let (users, evaluations) = services(&AppConfig::default());

    let (user, seeded) = seed_demo(&users, &evaluations).await.unwrap();
    assert_eq!(user.email, DEMO_EMAIL);
    assert_eq!(user.city_state.as_deref(), Some("Pato Branco - PR"));

    let scores: Vec<f64> = seeded
        .evaluation
        .samples
        .iter()
        .map(|s| s.sample_score)
        .collect();
    assert_eq!(scores, vec![3.1, 3.3]);
    assert_eq!(seeded.evaluation.average_score, 3.2);

    // a second seed reuses the demo account
    let (again, _) = seed_demo(&users, &evaluations).await.unwrap();
    assert_eq!(again.id, user.id);
    assert_eq!(evaluations.stats(&user.id).await.unwrap().total_evaluations, 2);
}
