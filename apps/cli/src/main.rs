use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod client;

use appointment_cell::models::{BookingRequest, RemoteOutcome};
use auth_cell::models::{LoginRequest, RegisterRequest};
use shared_config::AppConfig;

use crate::client::HmsClient;

#[derive(Parser, Debug)]
#[command(name = "smartcare-cli", about = "Book and review hospital appointments.")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session on this device.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = auth_cell::models::DEFAULT_ROLE)]
        role: String,
    },
    Logout,
    Whoami,
    /// List the doctor directory.
    Doctors,
    /// Book an appointment; saved locally when the server is unreachable.
    Book {
        #[arg(long)]
        doctor: String,
        /// e.g. 2024-01-05T14:30
        #[arg(long)]
        datetime: String,
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Show the signed-in user's appointments.
    Appointments,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Loading Env Vars
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env();
    info!("Using API at {}", config.api_base_url);

    let client = HmsClient::new(&config);

    match args.command {
        Command::Login { email, password } => {
            let identity = client
                .session
                .login(LoginRequest { email, password })
                .await
                .context("login failed")?;
            println!("Logged in as {}", identity.name);
        }
        Command::Register { name, email, password, role } => {
            client
                .session
                .register(RegisterRequest { name, email, password, role })
                .await
                .context("registration failed")?;
            println!("Registered. You can now log in.");
        }
        Command::Logout => {
            client.session.logout().await?;
            println!("Logged out");
        }
        Command::Whoami => match client.session.current_identity().await? {
            Some(identity) => println!(
                "{} <{}>",
                identity.name,
                identity.email.as_deref().unwrap_or("no email")
            ),
            None => println!("Not logged in"),
        },
        Command::Doctors => {
            for doctor in client.doctors.get_doctors().await {
                println!(
                    "{:<10} {:<20} {:<16} {} yrs",
                    doctor.id, doctor.name, doctor.specialization, doctor.experience
                );
            }
        }
        Command::Book { doctor, datetime, reason } => {
            let identity = client.session.current_identity().await?;
            let confirmation = client
                .booking
                .book_appointment(BookingRequest::new(doctor, datetime, reason), identity.as_ref())
                .await
                .context("could not save appointment")?;

            let place = match confirmation.outcome {
                RemoteOutcome::Confirmed(_) => "confirmed by hospital",
                RemoteOutcome::Fallback(_) => "saved on this device",
            };
            println!(
                "Appointment {}. Token {}, estimated wait {} min",
                place, confirmation.token, confirmation.eta
            );
        }
        Command::Appointments => {
            let identity = client.session.current_identity().await?;
            let appointments = client.listing.list_mine(identity.as_ref()).await?;
            if appointments.is_empty() {
                println!("No appointments");
            }
            for appointment in appointments {
                println!(
                    "[{:>3}] {}  {} with {} ({})",
                    appointment.token,
                    appointment.datetime,
                    appointment.patient_name,
                    appointment.doctor_name,
                    appointment.status
                );
            }
        }
    }

    Ok(())
}
