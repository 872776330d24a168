use std::{path::PathBuf, process::Termination};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use cinzagro::{FileStore, RecordRepository, Session, SessionPhase, UserType};

pub mod cancel;
pub mod dashboard;
pub mod login;
pub mod logout;
pub mod migrate;
pub mod new_collection;
pub mod profile;
pub mod request_waste;
pub mod show;

/// Shown for every failed save, whatever the cause.
pub const SAVE_FAILED_MESSAGE: &str = "Não foi possível salvar sua solicitação. Tente novamente.";

#[repr(u8)]
pub enum ExitCode {
    Ok = 0,
    FaultOrArgsError = 1,
    RequestUnsatisfied = 2,
}

impl Termination for ExitCode {
    fn report(self) -> std::process::ExitCode {
        std::process::ExitCode::from(self as u8)
    }
}

/// Handles shared by every command.
pub struct Context {
    pub store: FileStore,
}

impl Context {
    pub async fn open(data_dir: PathBuf) -> anyhow::Result<Self> {
        let store = FileStore::open(&data_dir)
            .await
            .with_context(|| format!("Opening data directory {}", data_dir.display()))?;
        Ok(Context { store })
    }

    pub async fn session(&self) -> Session<FileStore> {
        Session::restored(self.store.clone()).await
    }

    pub fn repository(&self) -> RecordRepository<FileStore> {
        RecordRepository::new(self.store.clone())
    }

    /// The logged in user's role, or the exit code to stop with after
    /// telling the user why.
    pub async fn current_role(&self) -> Result<UserType, ExitCode> {
        match self.session().await.phase() {
            SessionPhase::LoggedIn(Some(user_type)) => Ok(user_type),
            SessionPhase::LoggedIn(None) => {
                eprintln!("Your session has no user type. Log out and log in again.");
                Err(ExitCode::FaultOrArgsError)
            }
            SessionPhase::LoggedOut | SessionPhase::Loading => {
                eprintln!("Not logged in. Run `cinzagro login` first.");
                Err(ExitCode::FaultOrArgsError)
            }
        }
    }

    pub async fn require_role(&self, expected: UserType) -> Result<(), ExitCode> {
        let role = self.current_role().await?;
        if role != expected {
            eprintln!("This command is only available to {} users.", expected);
            return Err(ExitCode::FaultOrArgsError);
        }
        Ok(())
    }
}

/// Renders a timestamp in the local time of Tangará da Serra.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&chrono_tz::America::Cuiaba)
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

pub fn format_day(date: &DateTime<Utc>) -> String {
    date.with_timezone(&chrono_tz::America::Cuiaba)
        .format("%d/%m/%Y")
        .to_string()
}

/// Prints a library error the way the user-facing forms do and picks the
/// exit code.
pub fn report_save_error(err: cinzagro::Error) -> ExitCode {
    match err {
        cinzagro::Error::Validation(msg) => {
            eprintln!("Campos obrigatórios: {}", msg);
        }
        other => {
            log::debug!("Save failed: {:?}", other);
            eprintln!("{}", SAVE_FAILED_MESSAGE);
        }
    }
    ExitCode::FaultOrArgsError
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_dates_render_in_cuiaba_time() {
        // Cuiabá is UTC-4 with no daylight saving time since 2019.
        let date = Utc.with_ymd_and_hms(2025, 6, 1, 2, 30, 0).unwrap();
        assert_eq!(format_date(&date), "31/05/2025 22:30");
        assert_eq!(format_day(&date), "31/05/2025");
    }
}
