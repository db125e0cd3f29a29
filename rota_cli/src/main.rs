use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rota_core::*;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rota")]
#[command(about = "Sensor and pod site rotation planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for pod site selection (overrides config)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<String>,

    #[command(flatten)]
    session: SessionArgs,
}

/// Current placements the session starts from
#[derive(Args)]
struct SessionArgs {
    /// Current sensor site, e.g. "Right Stomach"
    #[arg(long, global = true, default_value = "Right Stomach")]
    sensor_site: String,

    /// Current pod site, e.g. "Right Arm"
    #[arg(long, global = true, default_value = "Right Arm")]
    pod_site: String,

    /// Date the sensor was last changed (YYYY-MM-DD)
    #[arg(long, global = true, default_value = "2025-05-28")]
    sensor_date: String,

    /// Date the pod was last changed (YYYY-MM-DD)
    #[arg(long, global = true, default_value = "2025-05-31")]
    pod_date: String,

    /// Slot in the sensor sequence (defaults to the sensor site's first slot)
    #[arg(long, global = true)]
    sensor_index: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current sensor and pod placements
    Start,

    /// Suggest the next sensor site
    Sensor,

    /// Suggest the next pod site
    Pod {
        /// Ask before accepting, allowing another compatible site instead
        #[arg(long)]
        confirm: bool,
    },

    /// Show upcoming sensor and pod changes
    Forecast {
        /// Weeks ahead to forecast (default from config, 4)
        #[arg(long, conflicts_with = "until")]
        weeks: Option<u32>,

        /// Forecast up to and including this date (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,

        /// Sort lines as plain text, matching the old schedule output
        #[arg(long)]
        legacy_order: bool,

        /// Print events as JSON
        #[arg(long)]
        json: bool,
    },

    /// Make changes one at a time from a prompt (default)
    Interactive,
}

fn main() -> Result<()> {
    // Initialize logging
    rota_core::logging::init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let today = match cli.today {
        Some(ref text) => parse_iso_date(text)?,
        None => chrono::Local::now().date_naive(),
    };

    let mut start = SessionStart::parse(
        &cli.session.sensor_site,
        &cli.session.pod_site,
        &cli.session.sensor_date,
        &cli.session.pod_date,
    )?;
    if let Some(index) = cli.session.sensor_index {
        start = start.with_sensor_index(index);
    }

    let selector = PodSelector::from_optional_seed(cli.seed.or(config.selection.seed))
        .with_recent(RecencyBuffer::new(config.selection.recency_depth));

    let mut session = Session::start(get_default_catalog(), start, selector)?
        .with_schedule(config.schedule.clone());

    match cli.command {
        Some(Commands::Start) => {
            println!("{}", session.confirmation());
            Ok(())
        }
        Some(Commands::Sensor) => cmd_sensor(&mut session, today),
        Some(Commands::Pod { confirm }) => cmd_pod(&mut session, today, confirm),
        Some(Commands::Forecast {
            weeks,
            until,
            legacy_order,
            json,
        }) => {
            let horizon = match until {
                Some(ref text) => Horizon::Until(parse_iso_date(text)?),
                None => Horizon::Weeks(weeks.unwrap_or(config.forecast.weeks)),
            };
            let order = if legacy_order {
                ForecastOrder::Legacy
            } else {
                config.forecast.order
            };
            cmd_forecast(&session, today, horizon, order, json)
        }
        Some(Commands::Interactive) | None => cmd_interactive(&mut session, today, &config),
    }
}

fn cmd_sensor(session: &mut Session<'_>, today: NaiveDate) -> Result<()> {
    let site = session.change_sensor(today)?;
    println!("Next sensor site: {}", site);
    Ok(())
}

fn cmd_pod(session: &mut Session<'_>, today: NaiveDate, confirm: bool) -> Result<()> {
    let site = if confirm {
        session.change_pod_with(today, &mut PromptDecider)?
    } else {
        session.change_pod(today)?
    };
    println!("Next pod site: {}", site);
    Ok(())
}

fn cmd_forecast(
    session: &Session<'_>,
    today: NaiveDate,
    horizon: Horizon,
    order: ForecastOrder,
    json: bool,
) -> Result<()> {
    let forecast = session.forecast(today, horizon, order)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
    } else if forecast.is_empty() {
        println!("No changes due through {}", horizon.end_date(today)?);
    } else {
        println!("{}", forecast.render());
    }
    Ok(())
}

fn cmd_interactive(session: &mut Session<'_>, today: NaiveDate, config: &Config) -> Result<()> {
    println!("{}", session.confirmation());

    loop {
        let action = match prompt_user_action()? {
            Some(action) => action,
            None => break,
        };

        match action {
            UserAction::SensorChange => {
                let site = session.change_sensor(today)?;
                println!("\nNext sensor site: {}\n", site);
            }
            UserAction::PodChange => {
                let site = session.change_pod(today)?;
                println!("\nNext pod site: {}\n", site);
            }
            UserAction::PodChangeWithOverride => {
                let site = session.change_pod_with(today, &mut PromptDecider)?;
                println!("\nNext pod site: {}\n", site);
            }
            UserAction::Forecast => {
                let forecast = session.forecast(
                    today,
                    Horizon::Weeks(config.forecast.weeks),
                    config.forecast.order,
                )?;
                println!("\n{}-Week Forecast", config.forecast.weeks);
                println!("{}\n", forecast.render());
            }
            UserAction::Quit => break,
        }
    }

    Ok(())
}

enum UserAction {
    SensorChange,
    PodChange,
    PodChangeWithOverride,
    Forecast,
    Quit,
}

/// Returns `None` once stdin is closed
fn prompt_user_action() -> Result<Option<UserAction>> {
    loop {
        println!("─────────────────────────────────────────");
        println!("  's' + Enter for a sensor change");
        println!("  'p' + Enter for a pod change");
        println!("  'o' + Enter for a pod change with a chance to pick another site");
        println!("  'f' + Enter to show upcoming changes");
        println!("  'q' + Enter to quit");
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }

        let action = match input.trim().to_lowercase().as_str() {
            "s" => UserAction::SensorChange,
            "p" => UserAction::PodChange,
            "o" => UserAction::PodChangeWithOverride,
            "f" => UserAction::Forecast,
            "q" => UserAction::Quit,
            other => {
                println!("Unknown choice '{}'", other);
                continue;
            }
        };

        return Ok(Some(action));
    }
}

/// Asks on stdin whether to take the suggested pod site or another one
struct PromptDecider;

impl PlacementDecider for PromptDecider {
    fn decide(&mut self, suggested: Site, compatible: &[Site]) -> Site {
        let options: Vec<_> = compatible.iter().map(|s| s.label()).collect();
        println!("Suggested pod site: {}", suggested);
        println!("Press Enter to accept, or type another site ({})", options.join(", "));
        print!("> ");
        if let Err(e) = io::stdout().flush() {
            tracing::warn!("Could not flush override prompt: {}", e);
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(_) if input.trim().is_empty() => suggested,
            Ok(_) => match input.parse::<Site>() {
                Ok(site) => site,
                Err(e) => {
                    eprintln!("{}. Keeping {}.", e, suggested);
                    suggested
                }
            },
            Err(e) => {
                tracing::warn!("Could not read override: {}", e);
                suggested
            }
        }
    }
}
