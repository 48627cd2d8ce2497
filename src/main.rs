use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use kbstats::device::scan::{max_device_number, INPUT_DIR};
use kbstats::{
    capture, find_query_mode, is_root, open_device, query_state, scan_devices, select_device,
    try_grab, CancelToken, GrabMode, KbstatsError, KbstatsResult, StateResult,
};

/// The exit code of a query whose state bit is set (distinct from a failure).
const EXIT_BIT_SET: u8 = 10;

/// Print the capabilities and events of Linux input devices.
///
/// Capture mode prints every key, switch or LED event of DEVICE until interrupted. Query mode
/// exits with 0 if the queried code is clear, 10 if it is set and 1 on error.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Grab the device for exclusive access while capturing
    #[arg(long, conflicts_with = "query")]
    grab: bool,

    /// Query the state of a single code instead of capturing (check the exit code)
    #[arg(long, requires_all = ["device", "event_type", "value"])]
    query: bool,

    /// Directory scanned for event devices when no DEVICE is given
    #[arg(long, value_name = "DIR", default_value = INPUT_DIR)]
    input_dir: PathBuf,

    /// The event device, e.g. /dev/input/event3
    #[arg(env = "KBSTATS_DEVICE")]
    device: Option<PathBuf>,

    /// The event type to query: EV_KEY, EV_SW, EV_LED or EV_SND
    #[arg(value_name = "TYPE", requires = "query")]
    event_type: Option<String>,

    /// The code to query, by name (e.g. SW_DOCK) or number (e.g. 5 or 0x5)
    #[arg(requires = "query")]
    value: Option<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = if cli.query {
        run_query(&cli)
    } else {
        run_capture(&cli)
    };

    result.unwrap_or_else(|e| {
        eprintln!("kbstats: {e}");
        if let Some(hint) = e.hint() {
            eprintln!("{hint}");
        }
        ExitCode::FAILURE
    })
}

fn run_query(cli: &Cli) -> KbstatsResult<ExitCode> {
    // clap enforces these alongside --query
    let (Some(device), Some(event_type), Some(value)) = (&cli.device, &cli.event_type, &cli.value)
    else {
        return Ok(ExitCode::FAILURE);
    };

    let mode = find_query_mode(event_type)?;
    let code = mode.resolve_code(value)?;
    mode.check(code)?;
    let handle = open_device(device)?;

    let result = query_state(&handle, mode, code)?;
    if let StateResult::QueryFailed(e) = &result {
        eprintln!("kbstats: state query failed: {e}");
    }

    Ok(ExitCode::from(exit_status(&result)))
}

fn exit_status(result: &StateResult) -> u8 {
    match result {
        StateResult::BitClear => 0,
        StateResult::BitSet => EXIT_BIT_SET,
        StateResult::QueryFailed(_) => 1,
    }
}

fn run_capture(cli: &Cli) -> KbstatsResult<ExitCode> {
    let path = match &cli.device {
        Some(device) => device.clone(),
        None => prompt_for_device(&cli.input_dir)?,
    };

    let handle = open_device(&path)?;

    println!("{}", handle.info()?);
    println!("Testing ... (interrupt to exit)");

    let mode = if cli.grab {
        GrabMode::Retain
    } else {
        GrabMode::Probe
    };
    if !try_grab(&handle, mode) {
        print_grab_warning(&path);
    }

    let cancel = CancelToken::new();
    cancel.install_signal_handlers()?;

    capture(&handle, &cancel, &mut io::stdout().lock())?;

    Ok(ExitCode::SUCCESS)
}

/// List the event devices in `dir` and ask which one to open.
fn prompt_for_device(dir: &Path) -> KbstatsResult<PathBuf> {
    eprintln!(
        "No device specified, trying to scan all of {}/event*",
        dir.display()
    );
    if !is_root() {
        eprintln!("Not running as root, no devices may be available.");
    }

    let entries = scan_devices(dir)?;
    let max = max_device_number(&entries).ok_or(KbstatsError::NoDevicesFound)?;

    eprintln!("Available devices:");
    for entry in &entries {
        eprintln!("{}:\t{}", entry.path.display(), entry.name);
    }

    eprint!("Select the device event number [0-{max}]: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    Ok(select_device(&entries, parse_selection(&line)?)?.path.clone())
}

fn parse_selection(line: &str) -> KbstatsResult<i64> {
    let text = line.trim();

    text.parse().map_err(|_| KbstatsError::InvalidSelection(text.to_string()))
}

fn print_grab_warning(path: &Path) {
    println!("***********************************************");
    println!("  This device is grabbed by another process.");
    println!("  No events are available to kbstats while the");
    println!("  other grab is active.");
    println!("  In most cases, this is caused by an X driver,");
    println!("  try VT-switching and re-run kbstats again.");
    println!("  Run the following command to see processes with");
    println!("  an open fd on this device");
    println!(" \"fuser -v {}\"", path.display());
    println!("***********************************************");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn query_needs_all_arguments() {
        assert!(Cli::try_parse_from(["kbstats", "--query", "/dev/input/event0"]).is_err());

        let cli =
            Cli::try_parse_from(["kbstats", "--query", "/dev/input/event0", "EV_KEY", "KEY_A"])
                .unwrap();
        assert!(cli.query);
        assert_eq!(cli.event_type.as_deref(), Some("EV_KEY"));
        assert_eq!(cli.value.as_deref(), Some("KEY_A"));
    }

    #[test]
    fn capture_args() {
        let cli = Cli::try_parse_from(["kbstats", "--grab", "/dev/input/event3"]).unwrap();
        assert!(cli.grab);
        assert!(!cli.query);
        assert_eq!(cli.device, Some(PathBuf::from("/dev/input/event3")));
        assert_eq!(cli.input_dir, PathBuf::from(INPUT_DIR));

        assert!(Cli::try_parse_from(["kbstats", "--grab", "--query", "a", "EV_KEY", "1"]).is_err());
        assert!(Cli::try_parse_from(["kbstats", "/dev/input/event3", "EV_KEY"]).is_err());
    }

    #[test]
    fn out_of_range_query_is_rejected_before_opening() {
        let cli = Cli::try_parse_from([
            "kbstats",
            "--query",
            "/nonexistent/kbstats/event0",
            "EV_KEY",
            "9999",
        ])
        .unwrap();

        assert!(matches!(
            run_query(&cli),
            Err(KbstatsError::OutOfRange { code: 9999, .. })
        ));
    }

    #[test]
    fn in_range_query_opens_the_device() {
        let cli = Cli::try_parse_from([
            "kbstats",
            "--query",
            "/nonexistent/kbstats/event0",
            "EV_KEY",
            "KEY_A",
        ])
        .unwrap();

        assert!(matches!(run_query(&cli), Err(KbstatsError::NotFound(_))));
    }

    #[test]
    fn selection_text_is_kept_on_failure() {
        assert_eq!(parse_selection("4\n").unwrap(), 4);
        assert_eq!(parse_selection(" -1 ").unwrap(), -1);
        assert!(matches!(
            parse_selection("keyboard\n"),
            Err(KbstatsError::InvalidSelection(s)) if s == "keyboard"
        ));
        assert!(matches!(
            parse_selection(""),
            Err(KbstatsError::InvalidSelection(s)) if s.is_empty()
        ));
    }

    #[test]
    fn exit_codes_are_distinct() {
        assert_eq!(exit_status(&StateResult::BitClear), 0);
        assert_eq!(exit_status(&StateResult::BitSet), 10);
        assert_eq!(
            exit_status(&StateResult::QueryFailed(io::Error::from_raw_os_error(
                libc::ENODEV
            ))),
            1
        );
    }
}
