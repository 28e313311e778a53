//! Hanamo ordering terminal
//!
//! Line-oriented front end over [`OrderSession`]. The draft is persisted after
//! every edit, so quitting and starting again picks up where the customer
//! left off.

use hanamo_core::environment::SystemClock;
use hanamo_order::{
    BaseKind, Config, MilkKind, OrderEnvironment, OrderIdGenerator, OrderSession, Receipt,
    ThreadRandom, ToppingKind,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
Commands:
  name <text>        pickup name
  phone <text>       phone number we text when it's ready
  base matcha|viet   drink base
  milk whole|oat     milk
  topping <key>      add or remove strawberry, ube, egg, salted
  show               current order
  submit             place the order
  reset              start a new order
  help               this list
  quit               leave (your draft is kept)";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    // Logs go to stderr so they don't interleave with the form
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hanamo={0},hanamo_order={0}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    tracing::info!(
        storage = ?config.storage.backend,
        draft_dir = %config.storage.dir.display(),
        draft_key = %config.storage.key,
        "Starting ordering terminal"
    );

    let env = OrderEnvironment::new(
        config.draft_store(),
        Arc::new(ThreadRandom),
        Arc::new(SystemClock),
    )
    .with_id_generator(OrderIdGenerator::new(config.orders.id_prefix.clone()));
    let mut session = OrderSession::start(env);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(stdout, "=== {} ===", config.orders.brand)?;
    writeln!(stdout, "One drink, made to order. Type `help` for commands.\n")?;
    if !session.draft().is_empty() {
        writeln!(stdout, "Welcome back, your draft was restored.")?;
        show(&mut stdout, &session)?;
    }

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let line = line.trim();
        let (command, argument) = line.split_once(' ').unwrap_or((line, ""));
        let argument = argument.trim();

        let outcome = match command {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                writeln!(stdout, "{HELP}")?;
                continue;
            },
            "show" => {
                show(&mut stdout, &session)?;
                continue;
            },
            "reset" => {
                session.reset();
                writeln!(stdout, "Starting a new order.")?;
                continue;
            },
            "submit" => match session.submit() {
                Ok(record) => {
                    writeln!(stdout, "\n{}\n", Receipt::from(record))?;
                    continue;
                },
                Err(error) => Err(error.to_string()),
            },
            "name" => session.set_name(argument).map_err(|e| e.to_string()),
            "phone" => session.set_phone(argument).map_err(|e| e.to_string()),
            "base" => argument
                .parse::<BaseKind>()
                .map_err(|e| e.to_string())
                .and_then(|base| session.set_base(base).map_err(|e| e.to_string())),
            "milk" => argument
                .parse::<MilkKind>()
                .map_err(|e| e.to_string())
                .and_then(|milk| session.set_milk(milk).map_err(|e| e.to_string())),
            "topping" => argument
                .parse::<ToppingKind>()
                .map_err(|e| e.to_string())
                .and_then(|topping| session.toggle_topping(topping).map_err(|e| e.to_string())),
            other => Err(format!("Unknown command '{other}', try `help`")),
        };

        match outcome {
            Ok(()) => show(&mut stdout, &session)?,
            Err(message) => writeln!(stdout, "! {message}")?,
        }
    }

    writeln!(stdout, "Bye!")?;
    Ok(())
}

fn show(out: &mut impl Write, session: &OrderSession) -> io::Result<()> {
    if let Some(record) = session.record() {
        return writeln!(out, "Order {} placed. Type `reset` for another.", record.order_id);
    }

    let draft = session.draft();
    let base = draft
        .base
        .map_or_else(|| "(choose one)".to_string(), |base| format!("{base} ({})", base.tagline()));

    writeln!(out, "  Name      {}", draft.name)?;
    writeln!(out, "  Phone     {}", draft.phone)?;
    writeln!(out, "  Base      {base}")?;
    writeln!(out, "  Milk      {}", draft.milk.menu_label())?;
    writeln!(
        out,
        "  Toppings  {}",
        hanamo_order::receipt::describe_toppings(&draft.toppings)
    )
}
