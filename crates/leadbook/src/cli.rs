use std::{
    fs::File,
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use api_types::{
    auth::Role,
    staff::{Member, MemberNew},
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use engine::{
    EngineError, Enquiry, EnquiryStatus, Experience, LeadSource, LearningMode, Metrics, Money,
    Payment, PaymentMode, ReportWindow, Transition, WorkSector,
};

use crate::{
    api::{Api, attender_choices},
    config::{AppConfig, ConfigArgs},
    dashboard::Dashboard,
    error::Result,
    export,
    gateway::Gateway,
    session::{SessionObserver, SessionStore},
};

const PASSWORD_ENV: &str = "LEADBOOK_PASSWORD";

#[derive(Debug, Parser)]
#[command(name = "leadbook", about = "Enquiries, payments and follow-ups of the institute")]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,
    #[command(subcommand)]
    pub command: Command,
}

/// Day range flags; both default to today in the reporting zone.
#[derive(Debug, clap::Args)]
pub struct WindowArgs {
    /// First day (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD), defaults to `--from`.
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl WindowArgs {
    fn window(&self, now: DateTime<Utc>, tz: Tz) -> ReportWindow {
        let today = now.with_timezone(&tz).date_naive();
        let start = self.from.unwrap_or(today);
        let end = self.to.unwrap_or(start);
        ReportWindow::new(start, end, tz)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in; the password is read from stdin or LEADBOOK_PASSWORD.
    Signin {
        #[arg(long)]
        email: String,
    },
    Signout,
    /// Show who is signed in.
    Whoami,
    /// Ask the backend to mail a one-time code.
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    VerifyOtp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
    },
    /// Set a new password; it is read twice from stdin or once from
    /// LEADBOOK_PASSWORD.
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    /// Counts and revenue for a day range.
    Dashboard {
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Write enquiries of a day range as CSV.
    Export {
        #[command(flatten)]
        window: WindowArgs,
        /// Only rows whose name or phone contains this text.
        #[arg(long)]
        search: Option<String>,
        /// Output file, stdout when absent.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Upload enquiries from a CSV file (administrators only).
    Import { file: PathBuf },
    #[command(subcommand)]
    Enquiry(EnquiryCommand),
    #[command(subcommand)]
    Course(CourseCommand),
    #[command(subcommand)]
    Staff(StaffCommand),
}

#[derive(Debug, Subcommand)]
pub enum EnquiryCommand {
    /// Register a new enquiry (administrators only).
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        /// Course title, as listed by `course list`.
        #[arg(long)]
        course: String,
        #[arg(long)]
        experience: Experience,
        #[arg(long)]
        working_in: WorkSector,
        #[arg(long)]
        learning_mode: LearningMode,
        #[arg(long)]
        source: LeadSource,
        #[arg(long)]
        attender: String,
        #[arg(long)]
        status: Option<EnquiryStatus>,
        #[arg(long)]
        note: Option<String>,
        /// RFC 3339 instant, required with `--status "Follow up"`.
        #[arg(long)]
        follow_up: Option<DateTime<Utc>>,
    },
    /// Record a payment against an enquiry.
    Pay {
        #[arg(long)]
        id: String,
        #[arg(long)]
        amount: Money,
        #[arg(long)]
        mode: PaymentMode,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Move an enquiry to another status.
    Status {
        #[arg(long)]
        id: String,
        #[arg(long)]
        status: EnquiryStatus,
        /// Defaults to the current attender.
        #[arg(long)]
        attender: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        follow_up: Option<DateTime<Utc>>,
        #[command(flatten)]
        window: WindowArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum CourseCommand {
    List,
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        fee: Money,
    },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum StaffCommand {
    List,
    /// Add a staff account; the password is read from stdin or
    /// LEADBOOK_PASSWORD.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "user")]
        role: Role,
    },
    Delete { id: String },
}

/// Tells the user to sign in again once the backend rejects the token.
struct SignInPrompt;

impl SessionObserver for SignInPrompt {
    fn on_session_invalidated(&self) {
        eprintln!("Your session has ended. Run `leadbook signin --email <email>` to continue.");
    }
}

pub async fn run(command: Command, config: &AppConfig) -> Result<()> {
    let session = Arc::new(SessionStore::load(&config.session_path)?);
    let mut gateway = Gateway::new(&config.base_url, config.timeout(), session)?;
    gateway.subscribe(Arc::new(SignInPrompt));
    let api = Api::new(gateway);
    let tz = config.tz()?;
    let now = Utc::now();

    match command {
        Command::Signin { email } => {
            let password = read_password("Password: ")?;
            let session = api.sign_in(&email, &password).await?;
            println!("Signed in as {} ({})", session.name, session.role_label());
        }
        Command::Signout => {
            api.sign_out()?;
            println!("Signed out");
        }
        Command::Whoami => {
            let session = api.session().require_signed_in()?;
            println!("{} ({})", session.name, session.role_label());
        }
        Command::ForgotPassword { email } => {
            println!("{}", api.forgot_password(&email).await?);
        }
        Command::VerifyOtp { email, otp } => {
            println!("{}", api.verify_otp(&email, &otp).await?);
        }
        Command::ResetPassword { email } => {
            let password = read_password("New password: ")?;
            let confirm = match std::env::var(PASSWORD_ENV) {
                Ok(_) => password.clone(),
                Err(_) => read_password("Confirm password: ")?,
            };
            println!("{}", api.reset_password(&email, &password, &confirm).await?);
        }
        Command::Dashboard { window } => {
            let dashboard = Dashboard::new(api, tz);
            if let Some(snapshot) = dashboard.refresh(window.window(now, tz)).await? {
                render_metrics(&mut io::stdout().lock(), &snapshot.metrics)?;
            }
        }
        Command::Export {
            window,
            search,
            out,
        } => {
            let enquiries = api.list_enquiries(window.window(now, tz)).await?;
            let query = search.as_deref();
            let written = match out {
                Some(path) => export::export_csv(File::create(&path)?, &enquiries, query)?,
                None => export::export_csv(io::stdout().lock(), &enquiries, query)?,
            };
            tracing::info!(written, "enquiries exported");
        }
        Command::Import { file } => {
            api.session().require_admin()?;
            let students = export::import_csv(File::open(&file)?)?;
            println!("{}", api.import_students(students).await?);
        }
        Command::Enquiry(command) => enquiry(&api, command, now, tz).await?,
        Command::Course(command) => course(&api, command).await?,
        Command::Staff(command) => staff(&api, command).await?,
    }
    Ok(())
}

async fn enquiry(api: &Api, command: EnquiryCommand, now: DateTime<Utc>, tz: Tz) -> Result<()> {
    match command {
        EnquiryCommand::Create {
            name,
            phone,
            course,
            experience,
            working_in,
            learning_mode,
            source,
            attender,
            status,
            note,
            follow_up,
        } => {
            api.session().require_admin()?;
            let catalog = api.list_courses().await?;
            let mut draft = Enquiry::draft();
            draft.name = name.trim().to_string();
            draft.phone = phone.trim().to_string();
            draft.experience = Some(experience);
            draft.working_in = Some(working_in);
            draft.learning_mode = Some(learning_mode);
            draft.source = Some(source);
            draft.attender = attender.trim().to_string();
            draft.select_course(&catalog, &course)?;
            if let Some(status) = status.filter(|status| *status != EnquiryStatus::Pending) {
                let actor = draft.attender.clone();
                draft.transition(transition(status, actor, note, follow_up), now)?;
            }
            println!("{}", api.create_enquiry(&draft).await?);
        }
        EnquiryCommand::Pay {
            id,
            amount,
            mode,
            window,
        } => {
            let current = find_enquiry(api, &id, window.window(now, tz)).await?;
            let payment = Payment::new(mode, amount, now)?;
            let updated = api.record_payment(&current, payment).await?;
            println!(
                "Paid {} of {}, balance {} ({})",
                updated.paid_amount,
                updated.course_fee,
                updated.balance_amount,
                updated.payment_status
            );
        }
        EnquiryCommand::Status {
            id,
            status,
            attender,
            note,
            follow_up,
            window,
        } => {
            let current = find_enquiry(api, &id, window.window(now, tz)).await?;
            let actor = attender.unwrap_or_else(|| current.attender.clone());
            let updated = api
                .change_status(&current, transition(status, actor, note, follow_up), now)
                .await?;
            println!(
                "{} is now {}",
                updated.name,
                updated.status.unwrap_or_default()
            );
        }
    }
    Ok(())
}

async fn course(api: &Api, command: CourseCommand) -> Result<()> {
    match command {
        CourseCommand::List => {
            let catalog = api.list_courses().await?;
            for course in catalog.iter() {
                println!(
                    "{}\t{}\t{}",
                    course.id.as_deref().unwrap_or("-"),
                    course.title,
                    course.fee
                );
            }
        }
        CourseCommand::Add { title, fee } => println!("{}", api.add_course(&title, fee).await?),
        CourseCommand::Delete { id } => println!("{}", api.delete_course(&id).await?),
    }
    Ok(())
}

async fn staff(api: &Api, command: StaffCommand) -> Result<()> {
    match command {
        StaffCommand::List => {
            let members = api.list_staff().await?;
            render_members(&mut io::stdout().lock(), &members)?;
        }
        StaffCommand::Add { name, email, role } => {
            api.session().require_admin()?;
            let password = read_password("Password for the new account: ")?;
            let member = MemberNew {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                password,
                role,
            };
            println!("{}", api.add_staff(&member).await?);
        }
        StaffCommand::Delete { id } => println!("{}", api.delete_staff(&id).await?),
    }
    Ok(())
}

fn transition(
    status: EnquiryStatus,
    actor: String,
    note: Option<String>,
    follow_up: Option<DateTime<Utc>>,
) -> Transition {
    let mut transition = Transition::new(status, actor);
    if let Some(note) = note {
        transition = transition.note(note);
    }
    if let Some(date) = follow_up {
        transition = transition.follow_up_at(date);
    }
    transition
}

async fn find_enquiry(api: &Api, id: &str, window: ReportWindow) -> Result<Enquiry> {
    let enquiries = api.list_enquiries(window).await?;
    enquiries
        .into_iter()
        .find(|enquiry| enquiry.id.as_deref() == Some(id))
        .ok_or_else(|| EngineError::KeyNotFound(format!("enquiry {id:?}")).into())
}

fn read_password(prompt: &str) -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    eprint!("{prompt}");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn render_metrics(out: &mut impl Write, metrics: &Metrics) -> io::Result<()> {
    writeln!(
        out,
        "{} .. {} ({})",
        metrics.window.start(),
        metrics.window.end(),
        metrics.window.timezone()
    )?;
    writeln!(out, "Enquiries   {}", metrics.total_enquiries)?;
    for status in EnquiryStatus::ALL {
        writeln!(
            out,
            "{:<11} {}",
            status.as_str(),
            metrics.status_count(*status)
        )?;
    }
    writeln!(out, "Revenue     {}", metrics.total_revenue)?;

    let groups = [
        ("By source", &metrics.count_by_source),
        ("By course", &metrics.count_by_course),
        ("By attender", &metrics.count_by_attender),
    ];
    for (title, counts) in groups {
        if counts.is_empty() {
            continue;
        }
        writeln!(out, "\n{title}")?;
        for (key, count) in counts {
            writeln!(out, "  {key:<20} {count}")?;
        }
    }
    if !metrics.revenue_by_attender.is_empty() {
        writeln!(out, "\nRevenue by attender")?;
        for (attender, amount) in &metrics.revenue_by_attender {
            writeln!(out, "  {attender:<20} {amount}")?;
        }
    }
    Ok(())
}

fn render_members(out: &mut impl Write, members: &[Member]) -> io::Result<()> {
    for member in members {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            member.id, member.name, member.email, member.role
        )?;
    }
    let attenders = attender_choices(members);
    if !attenders.is_empty() {
        writeln!(out, "\nAttenders: {}", attenders.join(", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use engine::{DEFAULT_TIMEZONE, summarize};

    use super::*;

    #[test]
    fn window_defaults_to_local_today() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap();
        let args = WindowArgs {
            from: None,
            to: None,
        };
        let window = args.window(now, DEFAULT_TIMEZONE);
        let day = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        assert_eq!((window.start(), window.end()), (day, day));
    }

    #[test]
    fn metrics_list_every_status() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let metrics = summarize(
            &[Enquiry::draft()],
            ReportWindow::new(day, day, DEFAULT_TIMEZONE),
        );
        let mut out = Vec::new();
        render_metrics(&mut out, &metrics).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Pending     1"));
        assert!(text.contains("Follow up   0"));
        assert!(text.contains("Revenue     ₹0.00"));
    }

    #[test]
    fn members_list_names_the_attenders() {
        let members = [
            Member {
                id: "u1".to_string(),
                name: "Anu".to_string(),
                email: "anu@institute.in".to_string(),
                role: Role::Admin,
            },
            Member {
                id: "u2".to_string(),
                name: "Ravi".to_string(),
                email: "ravi@institute.in".to_string(),
                role: Role::User,
            },
        ];
        let mut out = Vec::new();
        render_members(&mut out, &members).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("u1\tAnu\tanu@institute.in\tadmin"));
        assert!(text.ends_with("Attenders: Ravi\n"));
    }

    #[test]
    fn parses_nested_subcommands() {
        let cli = Cli::try_parse_from([
            "leadbook",
            "enquiry",
            "pay",
            "--id",
            "abc",
            "--amount",
            "1500.50",
            "--mode",
            "upi",
            "--base-url",
            "http://127.0.0.1:1/api",
        ])
        .unwrap();
        assert_eq!(
            cli.config.base_url.as_deref(),
            Some("http://127.0.0.1:1/api")
        );
        let Command::Enquiry(EnquiryCommand::Pay { amount, mode, .. }) = cli.command else {
            panic!("expected enquiry pay");
        };
        assert_eq!(amount, Money::new(150_050));
        assert_eq!(mode, PaymentMode::Upi);
    }
}
