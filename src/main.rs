use anyhow::Context;
use clap::Parser;
use qe_vess::core::seed::seed_demo;
use qe_vess::domain::model::{EvaluationData, EvaluationWithUser, PaginationQuery, SortOrder, User};
use qe_vess::domain::ports::Storage;
use qe_vess::utils::error::{ErrorSeverity, VessError};
use qe_vess::utils::{logger, validation::Validate};
use qe_vess::{
    AppConfig, CliConfig, EvaluationService, InMemoryStore, LocalStorage, ReportFormat,
    ReportWriter, UserService,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// An input file holds one evaluation or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum EvaluationInput {
    Many(Vec<EvaluationData>),
    One(Box<EvaluationData>),
}

impl EvaluationInput {
    fn into_vec(self) -> Vec<EvaluationData> {
        match self {
            EvaluationInput::Many(items) => items,
            EvaluationInput::One(item) => vec![*item],
        }
    }
}

type Evaluations = EvaluationService<InMemoryStore, InMemoryStore>;
type Users = UserService<InMemoryStore, InMemoryStore>;

async fn acting_user(cli: &CliConfig, users: &Users, evaluations: &Evaluations) -> qe_vess::Result<User> {
    if cli.seed_demo {
        let (user, _) = seed_demo(users, evaluations).await?;
        return Ok(user);
    }

    if let Some(user) = users.find_by_email(&cli.user_email).await? {
        return Ok(user);
    }
    users
        .register(qe_vess::domain::model::CreateUserData {
            email: cli.user_email.clone(),
            name: cli.user_name.clone(),
            // the CLI never authenticates; the account only owns the records
            password: uuid::Uuid::new_v4().simple().to_string(),
            address: None,
            country: None,
            city_state: None,
            language: None,
        })
        .await
}

async fn all_evaluations(
    evaluations: &Evaluations,
    user_id: &str,
    page_size: u32,
) -> qe_vess::Result<Vec<EvaluationWithUser>> {
    let mut collected = Vec::new();
    let mut page = 1;
    loop {
        let query = PaginationQuery {
            page: Some(page),
            limit: Some(page_size),
            sort_order: Some(SortOrder::Asc),
        };
        let result = evaluations.list(user_id, &query).await?;
        collected.extend(result.evaluations);
        if !result.pagination.has_next_page {
            return Ok(collected);
        }
        page += 1;
    }
}

async fn run(cli: &CliConfig, config: &AppConfig) -> qe_vess::Result<String> {
    let store = match &config.report.snapshot_file {
        Some(path) if Path::new(path).exists() => {
            tracing::info!("📂 Loading store snapshot from {}", path);
            Arc::new(InMemoryStore::load_from_file(path).await?)
        }
        _ => Arc::new(InMemoryStore::new()),
    };

    let users = UserService::new(store.clone(), store.clone(), config);
    let evaluations = EvaluationService::new(store.clone(), store.clone(), config);

    let user = acting_user(cli, &users, &evaluations).await?;
    tracing::info!("👤 Acting as {} <{}>", user.name, user.email);

    let inputs = LocalStorage::new(".".to_string());
    for file in &cli.input {
        tracing::info!("📥 Importing {}", file);
        let bytes = inputs.read_file(file).await?;
        let parsed: EvaluationInput = serde_json::from_slice(&bytes)?;
        for data in parsed.into_vec() {
            let created = evaluations.create(&user.id, data).await?;
            tracing::debug!(
                "{} -> {}",
                created.evaluation.name,
                created.evaluation.average_score
            );
        }
    }

    let listed = all_evaluations(&evaluations, &user.id, config.pagination.max_limit).await?;
    let stats = evaluations.stats(&user.id).await?;

    if cli.format == ReportFormat::Text {
        println!("{}", qe_vess::render_report(&listed, &stats, ReportFormat::Text)?);
    }

    let writer = ReportWriter::new(LocalStorage::new(config.report.output_path.clone()));
    let output_path = writer.write(&listed, &stats, cli.format).await?;

    if let Some(path) = &config.report.snapshot_file {
        store.save_to_file(path).await?;
    }

    Ok(output_path)
}

fn load_config(cli: &CliConfig) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?,
        None => AppConfig::default(),
    };
    config
        .apply_env_overrides()
        .context("Invalid VESS_* environment variable")?;
    if let Some(output_path) = &cli.output_path {
        config.report.output_path = output_path.clone();
    }
    Ok(config)
}

fn exit_code(e: &VessError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    let config = load_config(&cli)?;

    // logging
    logger::init_for_environment(config.is_production(), cli.verbose);

    tracing::info!("Starting qe-vess");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
        tracing::debug!("App config: {:?}", config);
    }

    // validate before touching any file
    if let Err(e) = cli.validate().and_then(|_| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&cli, &config).await {
        Ok(output_path) => {
            tracing::info!("✅ Report completed successfully!");
            println!("📁 Report saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?}, Status: {})",
                e,
                e.category(),
                e.severity(),
                e.status_code()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let code = exit_code(&e);
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}
