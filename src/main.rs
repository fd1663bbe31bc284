use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use event_ivr::config::AppConfig;
use event_ivr::domain::CatalogItem;
use event_ivr::error::AppError;
use event_ivr::flows::run_session;
use event_ivr::store::InMemoryStore;
use event_ivr::telemetry;
use event_ivr::transport::{ConsoleTransport, ScriptedTransport};
use tracing::info;

const DEMO_LINE: &str = "035550000";

#[derive(Parser, Debug)]
#[command(
    name = "event-ivr",
    about = "Answer simulated celebration-line calls against a seeded back office",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take a call interactively on stdin/stdout (default command)
    Call(CallArgs),
    /// Replay a canned call and print the transcript as JSON
    Demo,
}

#[derive(Args, Debug)]
struct CallArgs {
    /// Dialed number used to resolve the account
    #[arg(long, default_value = DEMO_LINE)]
    number: String,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let command = cli.command.unwrap_or(Command::Call(CallArgs {
        number: DEMO_LINE.to_string(),
    }));
    match command {
        Command::Call(args) => {
            let number = args.number;
            info!(%number, "answering interactive call");
            let store = seed_store()?;
            let mut transport = ConsoleTransport::new(number);
            run_session(&mut transport, &store, &config.ivr, Utc::now());
            Ok(())
        }
        Command::Demo => {
            let store = seed_store()?;
            // A caller reporting a birthday on May 14th and picking one
            // book voucher.
            let script = [
                "111222333", "1", "3", "14", "5", "1", "1", "1", "0", "1", "1",
            ];
            let mut transport = ScriptedTransport::new(DEMO_LINE, &script);
            run_session(&mut transport, &store, &config.ivr, Utc::now());

            let rendered = serde_json::to_string_pretty(transport.transcript())?;
            println!("{rendered}");
            Ok(())
        }
    }
}

fn seed_store() -> Result<InMemoryStore, AppError> {
    let store = InMemoryStore::new();
    let account = store.add_account("Hillside School", DEMO_LINE)?;
    store.add_student(account, "111222333", "Dana Levine")?;
    store.add_student(account, "444555666", "Omri Katz")?;
    store.set_event_types(
        account,
        vec![
            CatalogItem::new(1, "Bar Mitzvah"),
            CatalogItem::new(2, "Bat Mitzvah"),
            CatalogItem::new(3, "Birthday"),
        ],
    )?;
    store.set_paths(
        account,
        vec![
            CatalogItem::new(1, "Reading track"),
            CatalogItem::new(2, "Study track"),
            CatalogItem::new(3, "Volunteering track"),
        ],
    )?;
    store.set_gifts(
        account,
        vec![
            CatalogItem::new(1, "Book voucher").with_description("a voucher for the book fair"),
            CatalogItem::new(2, "Game voucher"),
            CatalogItem::new(3, "Trip voucher"),
        ],
    )?;
    Ok(store)
}
