use anyhow::{anyhow, Result};
use chrono::Utc;

use udmi_coord::constants::categories;
use udmi_coord::helpers::read_json_arg;
use udmi_coord::schema::{levels, Entry, PointsetSummary, SequenceResult};

use super::{print_json, Session};
use crate::argsets::{
    DeviceArgs, ExpectArgs, RecordCapabilityArgs, RecordPointsetArgs, RecordSequenceArgs,
    SummarizeArgs,
};

pub fn expect(args: ExpectArgs) -> Result<()> {
    let session = Session::open()?;
    let site = session.site(&args.site_id)?;
    site.set_expected_devices(args.devices);
    session.save_site(&site)
}

pub fn record_sequence(args: RecordSequenceArgs) -> Result<()> {
    let session = Session::open()?;
    let site = session.site(&args.site_id)?;
    let level = match args.result {
        SequenceResult::Fail => levels::ERROR,
        _ => levels::NOTICE,
    };
    let status = args
        .message
        .map(|message| Entry::new(categories::SEQUENCE, message, level, Utc::now()));
    site.record_sequence_result(&args.device_id, &args.sequence, args.stage, args.result, status)?;
    session.save_site(&site)
}

pub fn record_capability(args: RecordCapabilityArgs) -> Result<()> {
    let session = Session::open()?;
    let site = session.site(&args.site_id)?;
    site.record_capability_result(
        &args.device_id,
        &args.capability,
        args.stage,
        args.result,
        args.score,
        args.total,
    )?;
    session.save_site(&site)
}

pub fn record_pointset(args: RecordPointsetArgs) -> Result<()> {
    let summary: PointsetSummary = read_json_arg(&args.summary)?;
    let session = Session::open()?;
    let site = session.site(&args.site_id)?;
    site.record_pointset(&args.device_id, summary);
    session.save_site(&site)
}

pub fn record_base64(args: DeviceArgs) -> Result<()> {
    let session = Session::open()?;
    let site = session.site(&args.site_id)?;
    site.record_base64(&args.device_id);
    session.save_site(&site)
}

pub fn summarize(args: SummarizeArgs) -> Result<()> {
    let session = Session::open()?;
    let site = session.store.load_site(&args.site_id)?;
    let no_results = || anyhow!("No validation results recorded for site '{}'", args.site_id);
    let site = site.ok_or_else(no_results)?;
    if let Some(min_stage) = args.min_stage {
        site.set_min_stage(min_stage);
    }
    session.coordinator.insert_site(site);
    let report = session.coordinator.summarize(&args.site_id).ok_or_else(no_results)?;
    print_json(&report)
}
