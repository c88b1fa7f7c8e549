//! MedAssist Command Line Interface
//!
//! Terminal client for a running MedAssist node: disease lookups, the
//! health risk questionnaire and the interactive symptom diagnosis.

use std::collections::BTreeSet;
use std::io;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use medassist_risk::{Condition, DietType, Gender, RiskAssessment};

mod client;
mod pages;
mod prompt;
mod render;

use client::ApiClient;
use prompt::Prompter;

#[derive(Parser)]
#[command(name = "medassist-cli")]
#[command(about = "MedAssist healthcare chatbot client", long_about = None)]
#[command(version)]
struct Cli {
    /// Node API URL
    #[arg(long, alias = "rpc", default_value = "http://localhost:8000")]
    rpc_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the node is up
    Health,
    /// Show description, treatment and recommendations for a disease
    Info {
        /// Disease name, case-insensitive
        disease: String,
    },
    /// List diseases that present a symptom
    Symptom {
        /// Symptom, matched exactly
        name: String,
    },
    /// Score the health risk questionnaire
    Risk(RiskArgs),
    /// Answer yes/no symptom questions until a diagnosis is reached
    Diagnose,
    /// Interactive menu
    Menu,
}

#[derive(Args)]
struct RiskArgs {
    #[arg(long, default_value_t = 25)]
    age: u32,
    #[arg(long, value_enum, default_value_t = GenderArg::Male)]
    gender: GenderArg,
    #[arg(long)]
    smoker: bool,
    /// Days per week with physical activity
    #[arg(long, default_value_t = 3)]
    activity_days: u8,
    #[arg(long, default_value_t = 22.5)]
    bmi: f64,
    #[arg(long, value_enum, default_value_t = DietArg::Balanced)]
    diet: DietArg,
    #[arg(long)]
    family_history: bool,
    /// 1 = poor, 10 = excellent
    #[arg(long, default_value_t = 7)]
    sleep_quality: u8,
    /// 1 = low, 10 = high
    #[arg(long, default_value_t = 5)]
    stress_level: u8,
    /// Pre-existing condition, repeatable
    #[arg(long = "condition", value_enum)]
    conditions: Vec<ConditionArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Female,
    Other,
}

#[derive(Clone, Copy, ValueEnum)]
enum DietArg {
    Balanced,
    HighFatSugar,
    Vegetarian,
    Vegan,
}

#[derive(Clone, Copy, ValueEnum)]
enum ConditionArg {
    Diabetes,
    Hypertension,
    HeartDisease,
    Asthma,
}

impl From<GenderArg> for Gender {
    fn from(value: GenderArg) -> Self {
        match value {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
            GenderArg::Other => Gender::Other,
        }
    }
}

impl From<DietArg> for DietType {
    fn from(value: DietArg) -> Self {
        match value {
            DietArg::Balanced => DietType::Balanced,
            DietArg::HighFatSugar => DietType::HighFatSugar,
            DietArg::Vegetarian => DietType::Vegetarian,
            DietArg::Vegan => DietType::Vegan,
        }
    }
}

impl From<ConditionArg> for Condition {
    fn from(value: ConditionArg) -> Self {
        match value {
            ConditionArg::Diabetes => Condition::Diabetes,
            ConditionArg::Hypertension => Condition::Hypertension,
            ConditionArg::HeartDisease => Condition::HeartDisease,
            ConditionArg::Asthma => Condition::Asthma,
        }
    }
}

impl From<RiskArgs> for RiskAssessment {
    fn from(args: RiskArgs) -> Self {
        RiskAssessment {
            age: args.age,
            gender: args.gender.into(),
            smoker: args.smoker,
            activity_days: args.activity_days,
            bmi: args.bmi,
            diet: args.diet.into(),
            family_history: args.family_history,
            sleep_quality: args.sleep_quality,
            stress_level: args.stress_level,
            existing_conditions: args
                .conditions
                .into_iter()
                .map(Condition::from)
                .collect::<BTreeSet<_>>(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.rpc_url)?;

    match cli.command {
        Commands::Health => {
            let health = client.health().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
        Commands::Info { disease } => {
            let info = client.disease_info(&disease).await?;
            let tip = if info.is_not_found() {
                String::new()
            } else {
                client.health_tip(&disease).await?
            };
            print!("{}", render::disease(&disease, &info, &tip));
        }
        Commands::Symptom { name } => {
            let related = client.related_diseases(&name).await?;
            print!("{}", render::related(&name, &related));
        }
        Commands::Risk(args) => {
            let assessment = RiskAssessment::from(args);
            let report = client.assess_risk(&assessment).await?;
            print!("{}", render::risk(&report));
        }
        Commands::Diagnose => {
            let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
            pages::diagnosis_page(&client, &mut prompter).await?;
        }
        Commands::Menu => {
            let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
            pages::run_menu(&client, &mut prompter).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_flags_build_assessment() {
        let cli = Cli::try_parse_from([
            "medassist-cli",
            "risk",
            "--age",
            "55",
            "--smoker",
            "--diet",
            "high-fat-sugar",
            "--condition",
            "diabetes",
            "--condition",
            "heart-disease",
        ])
        .unwrap();

        let Commands::Risk(args) = cli.command else {
            panic!("expected risk command");
        };
        let assessment = RiskAssessment::from(args);
        assert_eq!(assessment.age, 55);
        assert!(assessment.smoker);
        assert_eq!(assessment.diet, DietType::HighFatSugar);
        assert_eq!(assessment.activity_days, 3);
        assert_eq!(assessment.existing_conditions.len(), 2);
        assert!(assessment
            .existing_conditions
            .contains(&Condition::HeartDisease));
    }

    #[test]
    fn default_rpc_url() {
        let cli = Cli::try_parse_from(["medassist-cli", "diagnose"]).unwrap();
        assert_eq!(cli.rpc_url, "http://localhost:8000");
    }
}
