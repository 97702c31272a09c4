#![deny(warnings)]

//! Command-line front end for the farm ledger.
//!
//! Usage: ledger [--config <file>] [--data-dir <dir>] <command> [args...]

mod config;
mod report;

use anyhow::{anyhow, bail, ensure, Context, Result};
use config::CliConfig;
use ledger_core::money::coerce_money;
use ledger_core::{
    CashflowEntryPatch, CostItemPatch, Month, NewCashflowEntry, NewCostItem, NewPlotRecord,
    PlotRecordPatch, RecordId,
};
use ledger_econ::{CostPlanInput, YieldScenario};
use ledger_runtime::{Collection, LedgerService};
use persistence::FileBackend;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: ledger [--config <file>] [--data-dir <dir>] <command>

commands:
  summary                                   (default) metrics, cashflow and insights
  add-cost <category> <amount>
  add-plot <name> <cost> <revenue>
  add-cashflow <month> <outflow> <inflow>
  update-cost <id> [category=..] [amount=..]
  update-plot <id> [name=..] [cost=..] [revenue=..]
  update-cashflow <id> [period=..] [outflow=..] [inflow=..]
  delete <cost|plot|cashflow> <id>
  reset                                     restore the sample ledger
  plan --area <units> [--target <profit>]
  simulate --yield <qty> --price <price>
  export                                    dashboard as JSON";

#[derive(Debug, PartialEq)]
enum Command {
    Summary,
    AddCost(String, String),
    AddPlot(String, String, String),
    AddCashflow(String, String, String),
    Update(Collection, RecordId, Vec<(String, String)>),
    Delete(Collection, RecordId),
    Reset,
    Plan { area: String, target: String },
    Simulate { quantity: String, price: String },
    Export,
    Help,
}

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    rest: Vec<String>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => out.config = Some(it.next().context("--config needs a path")?.into()),
            "--data-dir" => {
                out.data_dir = Some(it.next().context("--data-dir needs a path")?.into())
            }
            _ => out.rest.push(arg),
        }
    }
    Ok(out)
}

/// Value following `flag` in `args`, if any.
fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn positional<const N: usize>(args: &[String], usage: &str) -> Result<[String; N]> {
    if args.len() != N {
        bail!("usage: {usage}");
    }
    let mut out: [String; N] = std::array::from_fn(|_| String::new());
    out.clone_from_slice(args);
    Ok(out)
}

fn parse_command(rest: &[String]) -> Result<Command> {
    let Some((name, args)) = rest.split_first() else {
        return Ok(Command::Summary);
    };
    let cmd = match name.as_str() {
        "summary" => Command::Summary,
        "add-cost" => {
            let [category, amount] = positional::<2>(args, "add-cost <category> <amount>")?;
            Command::AddCost(category, amount)
        }
        "add-plot" => {
            let [name, cost, revenue] = positional::<3>(args, "add-plot <name> <cost> <revenue>")?;
            Command::AddPlot(name, cost, revenue)
        }
        "add-cashflow" => {
            let [month, outflow, inflow] =
                positional::<3>(args, "add-cashflow <month> <outflow> <inflow>")?;
            Command::AddCashflow(month, outflow, inflow)
        }
        "update-cost" | "update-plot" | "update-cashflow" => {
            let kind: Collection = name.trim_start_matches("update-").parse()?;
            let Some((id, fields)) = args.split_first() else {
                bail!("usage: {name} <id> <field>=<value>...");
            };
            let fields = fields
                .iter()
                .map(|f| {
                    f.split_once('=')
                        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                        .ok_or_else(|| anyhow!("expected <field>=<value>, got {f:?}"))
                })
                .collect::<Result<Vec<_>>>()?;
            Command::Update(kind, RecordId::from(id.as_str()), fields)
        }
        "delete" => {
            let [kind, id] = positional::<2>(args, "delete <cost|plot|cashflow> <id>")?;
            Command::Delete(kind.parse::<Collection>()?, RecordId(id))
        }
        "reset" => Command::Reset,
        "plan" => Command::Plan {
            area: flag_value(args, "--area").context("plan needs --area <units>")?,
            target: flag_value(args, "--target").unwrap_or_default(),
        },
        "simulate" => Command::Simulate {
            quantity: flag_value(args, "--yield").context("simulate needs --yield <qty>")?,
            price: flag_value(args, "--price").context("simulate needs --price <price>")?,
        },
        "export" => Command::Export,
        "help" | "-h" | "--help" => Command::Help,
        other => bail!("unknown command {other:?}\n\n{USAGE}"),
    };
    Ok(cmd)
}

fn cost_patch(fields: &[(String, String)]) -> Result<CostItemPatch> {
    let mut patch = CostItemPatch::default();
    for (k, v) in fields {
        match k.as_str() {
            "category" => patch.category = Some(v.clone()),
            "amount" => patch.amount = Some(coerce_money(v)),
            other => bail!("unknown cost item field {other:?}"),
        }
    }
    ensure!(!patch.is_empty(), "update needs at least one <field>=<value>");
    Ok(patch)
}

fn plot_patch(fields: &[(String, String)]) -> Result<PlotRecordPatch> {
    let mut patch = PlotRecordPatch::default();
    for (k, v) in fields {
        match k.as_str() {
            "name" | "plotName" => patch.plot_name = Some(v.clone()),
            "cost" => patch.cost = Some(coerce_money(v)),
            "revenue" => patch.revenue = Some(coerce_money(v)),
            other => bail!("unknown plot field {other:?}"),
        }
    }
    ensure!(!patch.is_empty(), "update needs at least one <field>=<value>");
    Ok(patch)
}

fn cashflow_patch(fields: &[(String, String)]) -> Result<CashflowEntryPatch> {
    let mut patch = CashflowEntryPatch::default();
    for (k, v) in fields {
        match k.as_str() {
            "period" | "month" => patch.period = Some(v.parse::<Month>()?),
            "outflow" => patch.outflow = Some(coerce_money(v)),
            "inflow" => patch.inflow = Some(coerce_money(v)),
            other => bail!("unknown cashflow field {other:?}"),
        }
    }
    ensure!(!patch.is_empty(), "update needs at least one <field>=<value>");
    Ok(patch)
}

fn run(cmd: Command, svc: &mut LedgerService<FileBackend>, cfg: &CliConfig) -> Result<()> {
    let money = &cfg.currency;
    match cmd {
        Command::Summary => print!("{}", report::summary(&svc.dashboard(), money)?),
        Command::AddCost(category, amount) => {
            let item = svc.create_cost_item(NewCostItem {
                category,
                amount: coerce_money(&amount),
            })?;
            println!("added cost item {} ({})", item.id, money.currency(item.amount));
        }
        Command::AddPlot(plot_name, cost, revenue) => {
            let plot = svc.create_plot_record(NewPlotRecord {
                plot_name,
                cost: coerce_money(&cost),
                revenue: coerce_money(&revenue),
            })?;
            println!(
                "added plot {} {} (ROI {})",
                plot.id,
                plot.plot_name,
                money.percent(plot.roi())
            );
        }
        Command::AddCashflow(month, outflow, inflow) => {
            let entry = svc.create_cashflow_entry(NewCashflowEntry {
                period: month.parse::<Month>()?,
                outflow: coerce_money(&outflow),
                inflow: coerce_money(&inflow),
            })?;
            println!("added cashflow entry {} for {}", entry.id, entry.period);
        }
        Command::Update(kind, id, fields) => {
            let found = match kind {
                Collection::CostItems => svc.update_cost_item(&id, &cost_patch(&fields)?)?.is_some(),
                Collection::PlotRecords => {
                    svc.update_plot_record(&id, &plot_patch(&fields)?)?.is_some()
                }
                Collection::CashflowEntries => svc
                    .update_cashflow_entry(&id, &cashflow_patch(&fields)?)?
                    .is_some(),
            };
            if found {
                println!("updated {kind} {id}");
            } else {
                println!("no {kind} with id {id}; nothing changed");
            }
        }
        Command::Delete(kind, id) => {
            if svc.delete(kind, &id)? {
                println!("deleted {kind} {id}");
            } else {
                println!("no {kind} with id {id}; nothing changed");
            }
        }
        Command::Reset => {
            let ledger = svc.reset()?;
            println!(
                "ledger reset | cost items: {} | plots: {} | cashflow: {}",
                ledger.cost_items.len(),
                ledger.plot_records.len(),
                ledger.cashflow_entries.len()
            );
        }
        Command::Plan { area, target } => {
            let plan = svc.plan_cost(&CostPlanInput::from_text(&area, &target));
            print!("{}", report::plan(&plan, money)?);
        }
        Command::Simulate { quantity, price } => {
            let outcome = svc.simulate_yield(&YieldScenario::from_text(&quantity, &price));
            print!("{}", report::simulation(&outcome, money)?);
        }
        Command::Export => println!("{}", svc.dashboard().to_json()?),
        Command::Help => println!("{USAGE}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logging goes to stderr so `export` output stays machine-readable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let cfg = match &args.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let cmd = parse_command(&args.rest)?;
    if cmd == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let data_dir = cfg.resolve_data_dir(args.data_dir.as_deref());
    info!(data_dir = %data_dir.display(), slot = %cfg.engine.slot, "opening ledger");
    let mut svc = LedgerService::open(FileBackend::new(&data_dir), &cfg.engine);
    run(cmd, &mut svc, &cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn options_are_pulled_out_anywhere() {
        let args = parse_args(words("summary --data-dir /tmp/x --config c.yaml")).unwrap();
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(args.config, Some(PathBuf::from("c.yaml")));
        assert_eq!(args.rest, words("summary"));
        assert!(parse_args(words("--config")).is_err());
    }

    #[test]
    fn commands_parse() {
        assert_eq!(parse_command(&[]).unwrap(), Command::Summary);
        assert_eq!(
            parse_command(&words("add-cost Irrigation 1000000")).unwrap(),
            Command::AddCost("Irrigation".into(), "1000000".into())
        );
        assert_eq!(
            parse_command(&words("delete plot seed-plot-2")).unwrap(),
            Command::Delete(Collection::PlotRecords, "seed-plot-2".into())
        );
        assert_eq!(
            parse_command(&words("update-cashflow seed-flow-1 period=Feb inflow=10")).unwrap(),
            Command::Update(
                Collection::CashflowEntries,
                "seed-flow-1".into(),
                vec![("period".into(), "Feb".into()), ("inflow".into(), "10".into())]
            )
        );
        assert_eq!(
            parse_command(&words("plan --area 4")).unwrap(),
            Command::Plan {
                area: "4".into(),
                target: String::new()
            }
        );
        assert!(parse_command(&words("add-cost OnlyCategory")).is_err());
        assert!(parse_command(&words("delete harvest x")).is_err());
        assert!(parse_command(&words("simulate --yield 5")).is_err());
        assert!(parse_command(&words("frobnicate")).is_err());
    }

    #[test]
    fn patches_reject_unknown_fields() {
        let patch = plot_patch(&[("name".into(), "North".into()), ("cost".into(), "12".into())])
            .unwrap();
        assert_eq!(patch.plot_name.as_deref(), Some("North"));
        assert!(patch.revenue.is_none());
        assert!(cost_patch(&[("colour".into(), "red".into())]).is_err());
        assert!(cashflow_patch(&[("period".into(), "Smarch".into())]).is_err());
    }

    #[test]
    fn empty_update_is_refused() {
        assert!(cost_patch(&[]).is_err());
        assert!(plot_patch(&[]).is_err());
        assert!(cashflow_patch(&[]).is_err());
        assert!(cashflow_patch(&[("month".into(), "march".into())]).is_ok());
    }
}
