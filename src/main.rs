// ==========================================
// 可可贸易测算台 - 命令行入口
// ==========================================
// 职责: 展示层,每个子命令对应一个看板分区
// 输出: 默认文本；--json 输出分区 DTO
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use cocoa_trading_desk::api::view::{
    format_amount, format_date, format_rate, render_column_info, render_normalized_preview,
};
use cocoa_trading_desk::api::{ConversionView, DashboardApi, FxSource};
use cocoa_trading_desk::config::DeskConfig;
use cocoa_trading_desk::domain::{SheetKind, StatusMessage};
use cocoa_trading_desk::engine::ProductCostingParams;
use cocoa_trading_desk::{logging, DeskSession, APP_NAME, VERSION};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Cocoa trading desk: workbook previews, FX conversion, freight and valuation")]
struct Cli {
    /// Config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Workbook path (overrides config file and environment)
    #[arg(short, long, global = true)]
    workbook: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Log at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sheet load statuses and normalization diagnostics
    Status,
    /// First rows of a normalized sheet
    Preview {
        /// beans | products | freight | valuation | fx-fix | fx-live
        sheet: SheetKind,
    },
    /// List FX pairs
    FxPairs(SourceArg),
    /// Historical rates for one FX pair
    FxHistory {
        #[command(flatten)]
        source: SourceArg,
        #[arg(long)]
        pair: String,
    },
    /// Convert an amount at the latest rate
    Convert {
        #[command(flatten)]
        source: SourceArg,
        #[arg(long)]
        pair: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
    },
    /// Filter Costing Beans by pair and date range, optionally converting
    Beans {
        #[arg(long)]
        pair: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
    },
    /// Freight quote (lists origins and destinations when none given)
    Freight {
        #[arg(long)]
        origin: Option<String>,
        #[arg(long)]
        destination: Option<String>,
        #[arg(long, default_value_t = 100.0)]
        quantity: f64,
    },
    /// Break even and margin
    Valuation {
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        buying_diff: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        costing: f64,
    },
    /// Costing Products (placeholder)
    Products {
        /// key=value, repeatable
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Raw preview and column summary of the other sheets
    Info,
    /// Export a normalized sheet as CSV
    Export {
        sheet: SheetKind,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SourceArg {
    /// fix | live | beans
    #[arg(long, default_value = "fix")]
    source: FxSource,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else if cli.verbose {
        logging::init();
    } else {
        logging::init_with_default("warn");
    }

    info!("{} v{}", APP_NAME, VERSION);

    let mut config = DeskConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = &cli.workbook {
        config.workbook_path = path.clone();
    }
    info!(workbook = %config.workbook_path.display(), "使用工作簿");

    let mut api = DashboardApi::new(DeskSession::new(config));
    let json = cli.json;

    // 文件缺失为唯一致命错误
    let statuses = api.load_statuses();
    if api.session_mut().load_report().file_missing() {
        print_statuses(&statuses);
        bail!(
            "Workbook not found: {}",
            api.session().config().workbook_path.display()
        );
    }

    match cli.command {
        Command::Status => {
            let diagnostics = api.normalization_diagnostics();
            if json {
                #[derive(Serialize)]
                struct StatusView {
                    loads: Vec<StatusMessage>,
                    diagnostics: Vec<(SheetKind, StatusMessage)>,
                }
                emit_json(&StatusView { loads: statuses, diagnostics })?;
            } else {
                print_statuses(&statuses);
                for (kind, diagnostic) in diagnostics {
                    println!("{}: {}", kind, diagnostic);
                }
            }
        }

        Command::Preview { sheet } => {
            let preview = api.preview(sheet);
            if json {
                emit_json(&preview)?;
            } else {
                println!("Data from '{}' sheet (Head):", preview.sheet);
                if let Some(diagnostic) = &preview.diagnostic {
                    println!("{}", diagnostic);
                }
                if !preview.table.is_unavailable() {
                    println!("{}", render_normalized_preview(&preview.table, usize::MAX));
                }
            }
        }

        Command::FxPairs(SourceArg { source }) => {
            let pairs = api.fx_pairs(source);
            if json {
                emit_json(&pairs)?;
            } else if pairs.is_empty() {
                println!("{}", StatusMessage::warning("No FX pairs available."));
            } else {
                for pair in pairs {
                    println!("{}", pair);
                }
            }
        }

        Command::FxHistory { source: SourceArg { source }, pair } => {
            let history = api.fx_history(source, &pair);
            if json {
                emit_json(&history)?;
            } else {
                println!("Historical {} FX Rates", history.pair);
                if let Some(diagnostic) = &history.diagnostic {
                    println!("{}", diagnostic);
                }
                for point in &history.points {
                    println!("{}  {}", format_date(point.date), format_rate(point.rate));
                }
            }
        }

        Command::Convert { source: SourceArg { source }, pair, amount } => {
            let view = api.convert(source, &pair, amount.as_str());
            if json {
                emit_json(&view)?;
            } else {
                print_conversion(&view);
            }
        }

        Command::Beans { pair, start, end, amount } => {
            let view = api
                .beans(&pair, start, end, amount.as_deref())
                .context("Costing Beans filter failed")?;
            if json {
                emit_json(&view)?;
            } else {
                let range = match (view.start, view.end) {
                    (Some(s), Some(e)) => format!(" from {} to {}", format_date(s), format_date(e)),
                    _ => String::new(),
                };
                println!("Showing data for: {}{}", view.pair, range);
                println!("{}", render_normalized_preview(&view.rows, api.session().config().preview_rows));
                if let Some(conversion) = &view.conversion {
                    print_conversion(conversion);
                }
            }
        }

        Command::Freight { origin, destination, quantity } => match (origin, destination) {
            (Some(origin), Some(destination)) => {
                let view = api.freight_quote(&origin, &destination, quantity);
                if json {
                    emit_json(&view)?;
                } else {
                    match view.total_cost {
                        Some(total) => {
                            println!("{}", StatusMessage::success(format!("Total Freight Cost: {}", format_amount(total))));
                            println!("{}", view.status);
                        }
                        None => println!("{}", view.status),
                    }
                }
            }
            _ => {
                let options = api.freight_options();
                if json {
                    emit_json(&options)?;
                } else {
                    println!("Origins: {}", options.origins.join(", "));
                    println!("Destinations: {}", options.destinations.join(", "));
                }
            }
        },

        Command::Valuation { buying_diff, costing } => {
            let view = api.valuation(buying_diff, costing);
            if json {
                emit_json(&view)?;
            } else {
                if let (Some(break_even), Some(margin)) = (view.break_even, view.margin) {
                    println!("Calculated Break Even: {}", format_amount(break_even));
                    println!("Calculated Margin: {}", format_amount(margin));
                }
                println!("{}", view.status);
            }
        }

        Command::Products { params } => {
            let params: ProductCostingParams = params.into_iter().collect();
            let report = api.products(&params);
            if json {
                emit_json(&report)?;
            } else {
                println!("Processed Costing Products Data Preview (Head)");
                println!("{}", render_normalized_preview(&report.preview, usize::MAX));
                match report.cost {
                    Some(cost) => println!("Calculated Product Cost: {}", format_amount(cost)),
                    None => println!("{}", StatusMessage::info(report.message.clone())),
                }
            }
        }

        Command::Info => {
            let infos = api.other_sheets_info();
            if json {
                emit_json(&infos)?;
            } else {
                for sheet in &infos {
                    match &sheet.warning {
                        Some(warning) => println!("{}", warning),
                        None => {
                            println!("'{}' Sheet Info (Head)", sheet.sheet);
                            println!("{}", sheet.preview);
                            println!("{}", render_column_info(sheet.rows, &sheet.columns));
                        }
                    }
                    println!();
                }
            }
        }

        Command::Export { sheet, output } => {
            let rows = match &output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    api.export_csv(sheet, BufWriter::new(file))?
                }
                None => api.export_csv(sheet, io::stdout().lock())?,
            };
            info!(sheet = %sheet, rows, "导出完成");
            if let Some(path) = output {
                eprintln!("Exported {} rows to {}", rows, path.display());
            }
        }
    }

    Ok(())
}

fn print_statuses(statuses: &[StatusMessage]) {
    for status in statuses {
        println!("{}", status);
    }
}

fn print_conversion(view: &ConversionView) {
    match (view.converted, view.rate, view.value_date) {
        (Some(converted), Some(rate), Some(date)) => {
            println!("Using FX Rate {} from {}", format_rate(rate), format_date(date));
            println!(
                "{}",
                StatusMessage::success(format!(
                    "Converted value in the quote currency: {}",
                    format_amount(converted)
                ))
            );
        }
        _ => println!("{}", view.status),
    }
}

fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value).context("Failed to write JSON output")?;
    writeln!(handle)?;
    Ok(())
}
