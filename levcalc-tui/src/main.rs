//! LevCalc TUI: compute scenarios, then browse them as an interactive chart.

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use levcalc_core::data::csv_source::DEFAULT_DATE_FORMAT;
use levcalc_runner::{load_inputs, parse_scenario_args, run_batch, InputsConfig, LoadOptions};
use levcalc_tui::{input, ui, App};

#[derive(Parser)]
#[command(
    name = "levcalc-tui",
    about = "Interactive chart of leveraged price scenarios"
)]
struct Args {
    /// Reference series CSV (borrowing rate, percent per year).
    reference: PathBuf,

    /// Drive series CSV (asset close).
    drive: PathBuf,

    /// Scenario pairs: LEVERAGE FEE [LEVERAGE FEE ...]. Fee is percent per year.
    #[arg(allow_negative_numbers = true, value_name = "LEVERAGE FEE")]
    scenarios: Vec<String>,

    /// chrono format of the date column.
    #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
    date_format: String,

    /// Generate synthetic series for missing files.
    #[arg(long, default_value_t = false)]
    synthetic: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Everything that can fail on bad input runs before the terminal is taken over.
    let keys = parse_scenario_args(&args.scenarios)?;
    let inputs = InputsConfig {
        reference: args.reference,
        drive: args.drive,
        date_format: args.date_format,
    };
    let opts = if args.synthetic {
        LoadOptions::synthetic()
    } else {
        LoadOptions::default()
    };
    let loaded = load_inputs(&inputs, &opts)?;
    let result = run_batch(&loaded, &keys)?;
    if result.all_empty() {
        bail!("no data to plot: the drive and reference series never share a date");
    }
    let mut app = App::from_result(&result);

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal even when the loop failed.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // 50ms timeout for ~20 FPS tick
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}
