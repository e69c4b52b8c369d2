use std::time::Duration;
use std::{fs, io};

use clap::{Parser, ValueEnum};
use fern::FormatCallback;
use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::format_description::well_known::Iso8601;
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::MissedTickBehavior;

use pong_sim::autopilot::Autopilot;
use pong_sim::{Game, Mode, Phase, Side, SimulationConfig};

#[derive(Parser)]
#[command(about, long_about = None)]
struct Cli {
    /// Game mode to simulate. Human paddles are played by scripted players.
    #[arg(value_enum, long, short, default_value_t)]
    mode: CliMode,

    /// Points needed to win a match, instead of the default of the mode.
    #[arg(long, value_name = "POINTS")]
    score_to_win: Option<u32>,

    /// Seed of the random generators, for reproducible runs. Drawn at random if not given.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of frames per second fed to the simulation.
    #[arg(long, short, default_value = "60")]
    frame_rate: u32,

    /// Number of matches to play before exiting.
    #[arg(long, short = 'n', default_value = "1")]
    matches: u32,

    /// Run as fast as possible on a synthetic clock instead of in real time.
    #[arg(long, short)]
    unpaced: bool,

    /// Stop after this much simulated time, even if matches are still going on.
    #[arg(long, default_value = "900", value_name = "SECONDS")]
    max_seconds: u64,

    /// Set the folder path.
    ///
    /// The given path can be absolute or relative.
    /// The simulator will attempt to create all the folders nested in the path.
    #[arg(long, short, default_value = "./log/", value_name = "PATH")]
    log_folder: String,

    /// Set where the printed logging is outputted.
    #[arg(value_enum, long, short, default_value_t)]
    console_channel: ConsoleChannel,
}

#[derive(Copy, Clone, ValueEnum, Default)]
enum CliMode {
    /// One scripted player against the AI
    #[default]
    Solo,
    /// Two scripted players
    Versus,
    /// Two scripted players per side
    Team,
}

impl From<CliMode> for Mode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Solo => Mode::Solo,
            CliMode::Versus => Mode::Versus,
            CliMode::Team => Mode::Team,
        }
    }
}

#[derive(Copy, Clone, ValueEnum, Default)]
enum ConsoleChannel {
    /// Print to stdout
    #[default]
    Out,
    /// Print to stderr
    Err,
}

/// Runs matches between scripted players (and the AI in solo mode) without drawing anything. All errors are logged,
/// the [`Result`] returned is only given for command-line environments.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ()> {
    let cli = Cli::parse();
    setup_logger(cli.log_folder, cli.console_channel)
        .map_err(|e| eprintln!("Error while configuring logging : {e:?}"))?;
    if cli.frame_rate == 0 {
        log::error!("The frame rate must be at least 1.");
        return Err(());
    }

    let mode = Mode::from(cli.mode);
    let mut config = SimulationConfig::for_mode(mode);
    if let Some(points) = cli.score_to_win {
        config.score_to_win = points;
    }
    let seed = cli.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let game = Game::new(mode, config, StdRng::seed_from_u64(seed))
        .map_err(|e| log::error!("Invalid match configuration : {e}."))?;
    log::info!("Simulating {} {mode} match(es) with seed {seed}.", cli.matches);

    let autopilot = Autopilot::for_config(StdRng::seed_from_u64(seed.wrapping_add(1)), game.config());
    let mut driver = Driver {
        game,
        autopilot,
        frame_period: Duration::from_secs(1) / cli.frame_rate,
        matches: cli.matches,
        limit: Duration::from_secs(cli.max_seconds),
        next_report: Duration::ZERO,
        wins: [0, 0],
    };
    driver.game.start(Duration::ZERO);

    let res = if cli.unpaced {
        driver.run_unpaced();
        Ok(())
    } else {
        run_until_signaled(&mut driver).await
    };
    log::info!(
        "Done: the left side won {} match(es), the right side {}.",
        driver.wins[0],
        driver.wins[1]
    );
    res
}

/// Feeds frames to a [`Game`] and restarts it until enough matches were played.
struct Driver {
    game: Game<StdRng>,
    autopilot: Autopilot<StdRng>,
    frame_period: Duration,
    matches: u32,
    limit: Duration,
    next_report: Duration,
    wins: [u32; 2],
}

impl Driver {
    /// Run the frame at `now`. Returns whether more frames are wanted.
    fn frame(&mut self, now: Duration) -> bool {
        self.autopilot
            .steer(self.game.ball(), self.game.court(), self.game.config());
        let frame = self.game.frame(now, &self.autopilot);
        if now >= self.next_report {
            log::debug!("{}", frame.status_line());
            self.next_report += Duration::from_secs(1);
        }

        if frame.phase == Phase::MatchOver && frame.end_message.is_some() {
            if let Some(result) = self.game.result() {
                self.wins[result.winner.index()] += 1;
                log::info!(
                    "Match won by the {} side {} - {} in {:.1} s.",
                    result.winner,
                    result.score[Side::Left.index()],
                    result.score[Side::Right.index()],
                    result.duration.as_secs_f64()
                );
            }
            if self.wins.iter().sum::<u32>() >= self.matches {
                return false;
            }
            self.game.restart(now);
        }
        if now >= self.limit {
            log::warn!("Stopping after {} s of simulated time.", self.limit.as_secs());
            return false;
        }
        true
    }

    /// Run frames back to back on a synthetic clock.
    fn run_unpaced(&mut self) {
        let mut now = Duration::ZERO;
        while self.frame(now) {
            now += self.frame_period;
        }
    }
}

/// Set up the global logger to log to stdout/stderr and to a file named as the current timestamp.
fn setup_logger(log_folder: String, console_channel: ConsoleChannel) -> io::Result<()> {
    // Configure log output on the given console
    let console_config = fern::Dispatch::new()
        .level(log::LevelFilter::Info)
        .format(format_log);
    let console_config = match console_channel {
        ConsoleChannel::Out => console_config.chain(io::stdout()),
        ConsoleChannel::Err => console_config.chain(io::stderr()),
    };

    // Configure log output in rotating log files
    let rotator = make_rotator(log_folder)?;
    let file_config = fern::Dispatch::new()
        .level(log::LevelFilter::Debug)
        .level_for("pong_sim::game::ai", log::LevelFilter::Trace)
        .format(format_log)
        .chain(rotator as Box<(dyn io::Write + Send)>);

    fern::Dispatch::new()
        .chain(console_config)
        .chain(file_config)
        .apply()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

/// Make the rotating file middleware to give to the logger.
fn make_rotator(log_folder: String) -> io::Result<Box<FileRotate<AppendCount>>> {
    fs::create_dir_all(&log_folder)?;
    let log_file_path = log_folder + "/" + &utc_now_wrapper() + ".log";
    let rotator = Box::new(FileRotate::new(
        log_file_path,
        AppendCount::new(10),
        ContentLimit::Lines(4000),
        Compression::None,
        #[cfg(unix)]
        None,
    ));
    Ok(rotator)
}

/// The function given to the logging crate [`fern`] to format messages.
fn format_log(out: FormatCallback, message: &std::fmt::Arguments, record: &log::Record) {
    out.finish(format_args!(
        "[{} {} {}] {}",
        utc_now_wrapper(),
        record.level(),
        record.target(),
        message
    ))
}

/// Create a [`String`] of the current time in the UTC timezone, with a default in case of error.
fn utc_now_wrapper() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Iso8601::DATE_TIME)
        .unwrap_or(String::from("invalid date"))
}

/// Feed frames in real time until the matches are played or an interrupt or terminate signal is received.
async fn run_until_signaled(driver: &mut Driver) -> Result<(), ()> {
    let (mut sigint_handler, mut sigterm_handler) = match signal(SignalKind::interrupt())
        .and_then(|si| signal(SignalKind::terminate()).map(|st| (si, st)))
    {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to create the signal handlers with error : {e:?}.");
            return Err(());
        }
    };
    let mut frame_interval = tokio::time::interval(driver.frame_period);
    frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let start = tokio::time::Instant::now();
    loop {
        tokio::select! {
            biased;
            signal = sigint_handler.recv() => match signal {
                Some(()) => {
                    log::info!("Received an interrupt signal.");
                    break Ok(());
                }
                None => {
                    log::error!("The interrupt signal handler stopped working, have to stop now.");
                    break Err(());
                }
            },
            signal = sigterm_handler.recv() => match signal {
                Some(()) => {
                    log::info!("Received a terminate signal.");
                    break Ok(());
                }
                None => {
                    log::error!("The terminate signal handler stopped working, have to stop now.");
                    break Err(());
                }
            },
            instant = frame_interval.tick() => {
                if !driver.frame(instant - start) {
                    break Ok(());
                }
            },
        }
    }
}
