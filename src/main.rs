use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use flexi_logger::{Logger, LoggerHandle};
use log::*;
use std::{ops::Deref, panic, time::Duration};

use homeauto_lib::client::{AirConditioner, CurtainControl};
use homeauto_lib::protocol::board2::CurtainSetMode;
use homeauto_lib::simulator::{SimulatedBoard, SimulatedTransport};
use homeauto_lib::transport::Transport;
use homeauto_lib::Error;

fn default_device_name() -> String {
    if cfg!(target_os = "windows") {
        String::from("COM1")
    } else {
        String::from("/dev/ttyUSB0")
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum AirCommands {
    /// Show desired temperature, ambient temperature and fan speed
    Status {
        /// Print the values as JSON instead of plain text
        #[clap(long, action)]
        json: bool,
    },
    /// Set the desired temperature in degrees Celsius (10.0 - 50.0)
    SetTemp {
        /// The target temperature (e.g., 24.5)
        temp_c: f64,
    },
    /// Periodically poll the board and print its values
    Watch {
        /// Poll interval (e.g., "2s", "500ms")
        #[clap(long, short, value_parser = humantime::parse_duration, default_value = "2s")]
        interval: Duration,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum CurtainCommands {
    /// Show curtain position, outdoor temperature, pressure and light intensity
    Status {
        /// Print the values as JSON instead of plain text
        #[clap(long, action)]
        json: bool,
    },
    /// Set the curtain position (0-100 percent, or 0-63 with --raw)
    Set {
        /// The target position (e.g., 75.5)
        value: f64,
    },
    /// Periodically poll the board and print its values
    Watch {
        /// Poll interval (e.g., "2s", "500ms")
        #[clap(long, short, value_parser = humantime::parse_duration, default_value = "2s")]
        interval: Duration,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
struct CurtainArgs {
    /// Command ID for the light intensity high byte; deployed firmware
    /// revisions disagree on this value (e.g., "0x08", "10")
    #[arg(long, value_parser = clap_num::maybe_hex::<u8>, default_value = "0x08")]
    light_high_cmd: u8,

    /// Address the curtain in raw 0-63 device units instead of percent
    #[arg(long, action)]
    raw: bool,

    #[command(subcommand)]
    command: CurtainCommands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum CliCommands {
    /// Talk to Board #1, the air conditioner
    Air {
        #[command(subcommand)]
        command: AirCommands,
    },
    /// Talk to Board #2, the curtain and outdoor sensors
    Curtain(CurtainArgs),
}

const fn about_text() -> &'static str {
    "home automation boards command line tool"
}

#[derive(Parser, Debug)]
#[command(version, about=about_text(), long_about = None)]
struct CliArgs {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// Serial port device path (e.g., /dev/ttyUSB0 on Linux, COM1 on Windows)
    #[arg(short, long, default_value_t = default_device_name())]
    device: String,

    /// Use the in-memory board simulator instead of a serial device
    #[arg(long, action)]
    simulated: bool,

    #[command(subcommand)]
    command: CliCommands,

    /// Timeout for a single GET response byte (e.g., "500ms", "1s")
    #[arg(value_parser = humantime::parse_duration, long, default_value = "1s")]
    timeout: Duration,
}

fn logging_init(loglevel: LevelFilter) -> LoggerHandle {
    let log_handle = Logger::try_with_env_or_str(loglevel.as_str())
        .expect("Cannot init logging")
        .start()
        .expect("Cannot start logging");

    panic::set_hook(Box::new(|panic_info| {
        let (filename, line, column) = panic_info
            .location()
            .map(|loc| (loc.file(), loc.line(), loc.column()))
            .unwrap_or(("<unknown>", 0, 0));
        let cause = panic_info
            .payload()
            .downcast_ref::<String>()
            .map(String::deref);
        let cause = cause.unwrap_or_else(|| {
            panic_info
                .payload()
                .downcast_ref::<&str>()
                .copied()
                .unwrap_or("<cause unknown>")
        });

        error!(
            "Thread '{}' panicked at {}:{}:{}: {}",
            std::thread::current().name().unwrap_or("<unknown>"),
            filename,
            line,
            column,
            cause
        );
    }));
    log_handle
}

fn print_air<T: Transport>(air: &AirConditioner<T>, json: bool) -> Result<()> {
    if json {
        let value = serde_json::json!({
            "desired_temperature_c": air.desired_temperature(),
            "ambient_temperature_c": air.ambient_temperature(),
            "fan_speed_rps": air.fan_speed(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!(
            "Desired: {:.1} C, Ambient: {:.1} C, Fan: {} rps",
            air.desired_temperature(),
            air.ambient_temperature(),
            air.fan_speed()
        );
    }
    Ok(())
}

fn print_curtain<T: Transport>(curtain: &CurtainControl<T>, raw: bool, json: bool) -> Result<()> {
    let unit = if raw { "raw" } else { "%" };
    if json {
        let value = serde_json::json!({
            "curtain_status": curtain.curtain_status(),
            "curtain_unit": unit,
            "outdoor_temperature_c": curtain.outdoor_temperature(),
            "outdoor_pressure_hpa": curtain.outdoor_pressure(),
            "light_intensity_lux": curtain.light_intensity(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!(
            "Curtain: {:.1} {}, Outdoor: {:.1} C, Pressure: {:.1} hPa, Light: {:.1} lux",
            curtain.curtain_status(),
            unit,
            curtain.outdoor_temperature(),
            curtain.outdoor_pressure(),
            curtain.light_intensity()
        );
    }
    Ok(())
}

/// One watch iteration. A timeout is recoverable (the board may just be
/// busy), everything else ends the loop.
fn watch_tick(result: std::result::Result<(), Error>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(Error::Timeout) => {
            warn!("Board did not answer in time, keeping previous values");
            Ok(false)
        }
        Err(e) => Err(e).with_context(|| "Cannot update board values"),
    }
}

fn run_air<T: Transport>(transport: T, args: &CliArgs, command: &AirCommands) -> Result<()> {
    let mut air = AirConditioner::new(transport);
    air.set_timeout(args.timeout);
    air.open()
        .with_context(|| format!("Cannot open '{}'", args.device))?;

    match command {
        AirCommands::Status { json } => {
            air.update().with_context(|| "Cannot read board values")?;
            print_air(&air, *json)?;
        }
        AirCommands::SetTemp { temp_c } => {
            air.set_desired_temperature(*temp_c)
                .with_context(|| "Cannot set desired temperature")?;
            info!("Desired temperature set to {:.1} C", air.desired_temperature());
        }
        AirCommands::Watch { interval } => loop {
            if watch_tick(air.update())? {
                print_air(&air, false)?;
            }
            std::thread::sleep(*interval);
        },
    }

    air.close();
    Ok(())
}

fn run_curtain<T: Transport>(transport: T, args: &CliArgs, curtain_args: &CurtainArgs) -> Result<()> {
    let mut curtain = CurtainControl::new(transport);
    curtain.set_timeout(args.timeout);
    curtain.set_light_high_cmd(curtain_args.light_high_cmd);
    curtain.set_curtain_mode(if curtain_args.raw {
        CurtainSetMode::Raw
    } else {
        CurtainSetMode::Scaled
    });
    curtain
        .open()
        .with_context(|| format!("Cannot open '{}'", args.device))?;

    match &curtain_args.command {
        CurtainCommands::Status { json } => {
            curtain.update().with_context(|| "Cannot read board values")?;
            print_curtain(&curtain, curtain_args.raw, *json)?;
        }
        CurtainCommands::Set { value } => {
            curtain
                .set_curtain_status(*value)
                .with_context(|| "Cannot set curtain position")?;
            info!(
                "Curtain position set to {:.1} {}",
                curtain.curtain_status(),
                if curtain_args.raw { "raw" } else { "%" }
            );
        }
        CurtainCommands::Watch { interval } => loop {
            if watch_tick(curtain.update())? {
                print_curtain(&curtain, curtain_args.raw, false)?;
            }
            std::thread::sleep(*interval);
        },
    }

    curtain.close();
    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let _log_handle = logging_init(args.verbose.log_level_filter());

    match &args.command {
        CliCommands::Air { command } => {
            if args.simulated {
                run_air(
                    SimulatedTransport::new(SimulatedBoard::AirConditioner),
                    &args,
                    command,
                )
            } else {
                run_air(
                    homeauto_lib::serialport::SerialTransport::new(&args.device),
                    &args,
                    command,
                )
            }
        }
        CliCommands::Curtain(curtain_args) => {
            if args.simulated {
                let mut sim = SimulatedTransport::new(SimulatedBoard::Curtain);
                sim.set_light_high_cmd(curtain_args.light_high_cmd);
                run_curtain(sim, &args, curtain_args)
            } else {
                run_curtain(
                    homeauto_lib::serialport::SerialTransport::new(&args.device),
                    &args,
                    curtain_args,
                )
            }
        }
    }
}
