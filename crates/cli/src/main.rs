use anyhow::Context;
use api_shared::HealthService;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dority_core::{
    extract_patient_data, history_summary, resolver, source_from_config, CoreConfig,
    PatientSelection, SessionService, SessionStore,
};
use fhir::Patient;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dority")]
#[command(about = "Dority clinical session CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the service wiring
    Health,
    /// List patients from the configured source
    Patients,
    /// Flatten a FHIR Patient file (JSON or YAML) and print the result
    Extract {
        /// Path to a Patient resource (.json, .yaml or .yml)
        file: PathBuf,
        /// Reference date for age calculation (YYYY-MM-DD, default today)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Fallback pharmacy when the record names none
        #[arg(long)]
        pharmacy: Option<String>,
        /// Fallback address when the record has none
        #[arg(long)]
        address: Option<String>,
    },
    /// Start a session for a patient and print the session bundle
    Start {
        /// FHIR logical id of the patient
        patient_id: String,
        /// Fallback pharmacy when the record names none
        #[arg(long)]
        pharmacy: Option<String>,
        /// Fallback general practitioner
        #[arg(long)]
        gp: Option<String>,
        /// Fallback address when the record has none
        #[arg(long)]
        address: Option<String>,
    },
}

fn read_patient_file(path: &Path) -> anyhow::Result<fhir::PatientResource> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let resource = if is_yaml {
        Patient::parse_yaml(&text)?
    } else {
        Patient::parse_json(&text)?
    };
    Ok(resource)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dority=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Health) => {
            let res = HealthService::check_health();
            println!("{}", res.message);
        }
        Some(Commands::Patients) => {
            let cfg = Arc::new(CoreConfig::from_env()?);
            let service =
                SessionService::new(cfg.clone(), source_from_config(&cfg)?, Arc::new(SessionStore::new()));
            let patients = service.list_patients().await?;
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in patients {
                    println!(
                        "ID: {}, Name: {} {}",
                        patient.patient_id,
                        patient.patient_first_name.unwrap_or_default(),
                        patient.patient_last_name.unwrap_or_default()
                    );
                }
            }
        }
        Some(Commands::Extract {
            file,
            today,
            pharmacy,
            address,
        }) => {
            let resource = read_patient_file(&file)?;
            let today = today.unwrap_or_else(|| Utc::now().date_naive());
            let data = extract_patient_data(&resource, today);

            println!("{}", serde_json::to_string_pretty(&data)?);
            println!();
            println!("{}", history_summary(&data));
            println!();
            println!(
                "Preferred pharmacy: {}",
                resolver::resolve_pharmacy(&resource, pharmacy.as_deref()).value
            );
            println!(
                "General practitioner: {}",
                resolver::resolve_general_practitioner(&resource, None).value
            );
            println!(
                "Address: {}",
                resolver::resolve_address(&data, address.as_deref()).value
            );
        }
        Some(Commands::Start {
            patient_id,
            pharmacy,
            gp,
            address,
        }) => {
            let cfg = Arc::new(CoreConfig::from_env()?);
            let service =
                SessionService::new(cfg.clone(), source_from_config(&cfg)?, Arc::new(SessionStore::new()));
            let selection = PatientSelection {
                preferred_pharmacy: pharmacy,
                general_practitioner: gp,
                address,
            };
            let started = service
                .start(Some(&patient_id), Some(&selection), Utc::now().date_naive())
                .await?;
            println!("{}", serde_json::to_string_pretty(&started)?);
        }
        None => {
            println!("No command given. Run `dority --help` for usage.");
        }
    }

    Ok(())
}
