//! `adtstack atc` commands.

use std::io::{self, Write};
use std::process::ExitCode;

use adtstack_atc::{
    AdtObjectKind, ChecksRunner, Customizing, DEFAULT_MAX_VERDICTS, ObjectReference, ObjectSets,
    WorkList, fetch_customizing,
};
use adtstack_core::Transport;
use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand, ValueEnum};
use tracing::info;

#[derive(Subcommand, Debug)]
pub(crate) enum AtcCommand {
    /// Print the ATC customizing of the system
    Customizing,
    /// Run ATC checks for repository objects
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub(crate) struct RunArgs {
    /// Check variant; defaults to the system check variant
    #[arg(long)]
    variant: Option<String>,

    /// Upper bound of reported findings
    #[arg(long, default_value_t = DEFAULT_MAX_VERDICTS)]
    max_verdicts: u32,

    /// Fail when a finding has this priority or a more severe one
    #[arg(long, default_value_t = 2)]
    error_level: u32,

    /// Kind of the checked objects
    #[arg(value_enum)]
    kind: ObjectKind,

    /// Names of the checked objects
    #[arg(required = true)]
    names: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ObjectKind {
    Package,
    Class,
    Program,
    Interface,
}

impl From<ObjectKind> for AdtObjectKind {
    fn from(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Package => Self::Package,
            ObjectKind::Class => Self::Class,
            ObjectKind::Program => Self::Program,
            ObjectKind::Interface => Self::Interface,
        }
    }
}

pub(crate) fn run<T: Transport>(transport: &T, command: AtcCommand) -> Result<ExitCode> {
    let mut out = io::stdout().lock();
    match command {
        AtcCommand::Customizing => {
            let customizing =
                fetch_customizing(transport).context("failed to fetch ATC customizing")?;
            write_customizing(&mut out, &customizing)?;
            Ok(ExitCode::SUCCESS)
        }
        AtcCommand::Run(args) => run_checks(transport, &args, &mut out),
    }
}

fn run_checks<T: Transport>(transport: &T, args: &RunArgs, out: &mut impl Write) -> Result<ExitCode> {
    let variant = match &args.variant {
        Some(variant) => variant.clone(),
        None => {
            let customizing =
                fetch_customizing(transport).context("failed to fetch ATC customizing")?;
            match customizing.system_check_variant {
                Some(variant) => variant,
                None => bail!("the system has no check variant configured, pass --variant"),
            }
        }
    };

    let sets = object_sets(args.kind, &args.names);
    let runner = ChecksRunner::new(transport, variant.as_str());
    info!(variant = %variant, objects = args.names.len(), "running ATC checks");

    let result = runner
        .run_for(sets, args.max_verdicts)
        .with_context(|| format!("ATC run with variant {variant} failed"))?;

    for info in &result.run_response.infos {
        info!(typ = info.typ.as_deref().unwrap_or_default(), "{info}");
    }
    write_worklist(out, &result.worklist)?;

    if has_errors(&result.worklist, args.error_level) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn object_sets(kind: ObjectKind, names: &[String]) -> ObjectSets {
    let mut sets = ObjectSets::new();
    for name in names {
        sets.include_object(ObjectReference::of_kind(kind.into(), name));
    }
    sets
}

fn write_customizing(out: &mut impl Write, customizing: &Customizing) -> io::Result<()> {
    writeln!(
        out,
        "System Check Variant: {}",
        customizing.system_check_variant.as_deref().unwrap_or_default()
    )
}

fn write_worklist(out: &mut impl Write, worklist: &WorkList) -> io::Result<()> {
    for object in &worklist.objects {
        writeln!(
            out,
            "{} {}",
            object.typ.as_deref().unwrap_or_default(),
            object.name.as_deref().unwrap_or_default()
        )?;
        for finding in &object.findings {
            writeln!(
                out,
                "*  {} :: {} :: {}",
                finding.priority.as_deref().unwrap_or_default(),
                finding.check_title.as_deref().unwrap_or_default(),
                finding.message_title.as_deref().unwrap_or_default()
            )?;
        }
    }
    Ok(())
}

/// Whether any finding is at least as severe as `error_level`. Findings
/// without a numeric priority never count.
fn has_errors(worklist: &WorkList, error_level: u32) -> bool {
    worklist
        .findings()
        .filter_map(|(_, finding)| finding.priority.as_deref())
        .filter_map(|priority| priority.trim().parse::<u32>().ok())
        .any(|priority| priority <= error_level)
}
