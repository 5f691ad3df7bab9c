mod argsets;
mod command;

use anyhow::{anyhow, Result};
use env_logger::Env;
use itertools::Itertools;
use pico_args::Arguments;

use udmi_coord::constants::{defaults, envvars};
use udmi_coord::discovery::FamilyKey;
use udmi_coord::helpers::{load_dotenv, parse_time};

const CMD_CONFIGURE: &str = "configure";
const CMD_START: &str = "start";
const CMD_TICK: &str = "tick";
const CMD_STOP: &str = "stop";
const CMD_RECORD_RESULT: &str = "record-result";
const CMD_OBSERVE: &str = "observe";
const CMD_WITHDRAW: &str = "withdraw";
const CMD_PROMOTE: &str = "promote";
const CMD_STATE: &str = "state";
const CMD_RESULTS: &str = "results";
const CMD_RESOLVE: &str = "resolve";
const CMD_EXPECT: &str = "expect";
const CMD_RECORD_SEQUENCE: &str = "record-sequence";
const CMD_RECORD_CAPABILITY: &str = "record-capability";
const CMD_RECORD_POINTSET: &str = "record-pointset";
const CMD_RECORD_BASE64: &str = "record-base64";
const CMD_SUMMARIZE: &str = "summarize";

const SUBCOMMANDS: &[&str] = &[
    CMD_CONFIGURE,
    CMD_START,
    CMD_TICK,
    CMD_STOP,
    CMD_RECORD_RESULT,
    CMD_OBSERVE,
    CMD_WITHDRAW,
    CMD_PROMOTE,
    CMD_STATE,
    CMD_RESULTS,
    CMD_RESOLVE,
    CMD_EXPECT,
    CMD_RECORD_SEQUENCE,
    CMD_RECORD_CAPABILITY,
    CMD_RECORD_POINTSET,
    CMD_RECORD_BASE64,
    CMD_SUMMARIZE,
];

fn family_key(args: &mut Arguments) -> Result<FamilyKey> {
    let device_id: String = args.free_from_str()?;
    let family: String = args.free_from_str()?;
    Ok(FamilyKey::new(device_id, family))
}

fn main() -> Result<()> {
    let loaded = load_dotenv();
    env_logger::Builder::from_env(Env::default().filter_or(envvars::LOG_LEVEL, defaults::LOG_LEVEL))
        .init();
    for path in loaded {
        log::debug!("Loaded {}", path.display());
    }

    let mut args = Arguments::from_env();
    match args.subcommand()?.as_deref() {
        Some(CMD_CONFIGURE) => command::configure(argsets::ConfigureArgs {
            schedule: args.contains("--schedule"),
            key: family_key(&mut args)?,
            config: args.free_from_str()?,
        }),
        Some(CMD_START) => command::start(family_key(&mut args)?),
        Some(CMD_TICK) => command::tick(argsets::TickArgs {
            key: family_key(&mut args)?,
            generation: args.free_from_str()?,
            elapsed_sec: args.free_from_str()?,
        }),
        Some(CMD_STOP) => command::stop(family_key(&mut args)?),
        Some(CMD_RECORD_RESULT) => command::record_result(argsets::RecordResultArgs {
            key: family_key(&mut args)?,
            generation: args.free_from_str()?,
            events: args.free_from_str()?,
        }),
        Some(CMD_OBSERVE) => command::observe(argsets::ObserveArgs {
            at: args.opt_value_from_fn("--at", parse_time)?,
            key: family_key(&mut args)?,
            events: args.free_from_str()?,
        }),
        Some(CMD_WITHDRAW) => command::withdraw(argsets::WithdrawArgs {
            key: family_key(&mut args)?,
            addr: args.free_from_str()?,
        }),
        Some(CMD_PROMOTE) => command::promote(argsets::PromoteArgs {
            now: args.opt_value_from_fn("--now", parse_time)?,
            key: family_key(&mut args)?,
        }),
        Some(CMD_STATE) => command::state(args.free_from_str()?),
        Some(CMD_RESULTS) => command::results(argsets::ResultsArgs {
            depth: args.opt_value_from_str("--depth")?,
            key: family_key(&mut args)?,
        }),
        Some(CMD_RESOLVE) => command::resolve(argsets::ResolveArgs {
            depth: args.opt_value_from_str("--depth")?,
            context: args.free_from_str()?,
            events: args.free_from_str()?,
        }),
        Some(CMD_EXPECT) => {
            let site_id: String = args.free_from_str()?;
            let devices = args
                .finish()
                .into_iter()
                .map(|device| device.to_string_lossy().into_owned())
                .collect();
            command::expect(argsets::ExpectArgs { site_id, devices })
        }
        Some(CMD_RECORD_SEQUENCE) => command::record_sequence(argsets::RecordSequenceArgs {
            message: args.opt_value_from_str("--message")?,
            site_id: args.free_from_str()?,
            device_id: args.free_from_str()?,
            sequence: args.free_from_str()?,
            stage: args.free_from_str()?,
            result: args.free_from_str()?,
        }),
        Some(CMD_RECORD_CAPABILITY) => command::record_capability(argsets::RecordCapabilityArgs {
            site_id: args.free_from_str()?,
            device_id: args.free_from_str()?,
            capability: args.free_from_str()?,
            stage: args.free_from_str()?,
            result: args.free_from_str()?,
            score: args.free_from_str()?,
            total: args.free_from_str()?,
        }),
        Some(CMD_RECORD_POINTSET) => command::record_pointset(argsets::RecordPointsetArgs {
            site_id: args.free_from_str()?,
            device_id: args.free_from_str()?,
            summary: args.free_from_str()?,
        }),
        Some(CMD_RECORD_BASE64) => command::record_base64(argsets::DeviceArgs {
            site_id: args.free_from_str()?,
            device_id: args.free_from_str()?,
        }),
        Some(CMD_SUMMARIZE) => command::summarize(argsets::SummarizeArgs {
            min_stage: args.opt_value_from_str("--min-stage")?,
            site_id: args.free_from_str()?,
        }),
        _ => Err(anyhow!(
            "Subcommand must be one of {}",
            SUBCOMMANDS.iter().map(|cmd| format!("'{cmd}'")).join(", ")
        )),
    }
}
