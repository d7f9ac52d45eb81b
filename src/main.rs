use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::{info, warn};
use prettytable::{Cell, Row, Table};
use serde::Serialize;
use sr_backtest::prelude::*;
use sr_backtest::strategy::support_resistance::{BUY_LEVEL, LABEL, SELL_LEVEL};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sr-backtest")]
#[command(about = "Backtest rule-based trading strategies on historical prices", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a backtest
    Run {
        //path to csv data file (overrides the config file)
        #[arg(long)]
        data: Option<PathBuf>,

        //json run configuration; the flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        //ticker to select from a multi-symbol csv
        #[arg(long)]
        symbol: Option<String>,

        //strategy id that --buy, --sell and --label apply to
        #[arg(long, default_value = "support_resistance")]
        strategy: String,

        //buy level (support & resistance)
        #[arg(long)]
        buy: Option<f64>,

        //sell level (support & resistance)
        #[arg(long)]
        sell: Option<f64>,

        //label for this parameter set
        #[arg(long)]
        label: Option<String>,

        //fee per trade in percent, eg 0.05
        #[arg(long)]
        fee_pct: Option<f64>,

        //first date to include (yyyy-mm-dd)
        #[arg(long)]
        start: Option<NaiveDate>,

        //end date, exclusive (yyyy-mm-dd)
        #[arg(long)]
        end: Option<NaiveDate>,

        //print the buy & hold benchmark next to the strategies
        #[arg(long)]
        benchmark: bool,

        //print monthly returns per strategy
        #[arg(long)]
        monthly: bool,

        //print every closed trade
        #[arg(long)]
        show_trades: bool,

        //output path for equity curve csv
        #[arg(long)]
        output_equity_csv: Option<PathBuf>,

        //output path for trades csv
        #[arg(long)]
        output_trades_csv: Option<PathBuf>,
    },

    //list registered strategies and their parameters
    List,

    //write a default json run configuration
    InitConfig {
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let registry = StrategyRegistry::with_builtin();

    match cli.command {
        Commands::Run {
            data,
            config,
            symbol,
            strategy,
            buy,
            sell,
            label,
            fee_pct,
            start,
            end,
            benchmark,
            monthly,
            show_trades,
            output_equity_csv,
            output_trades_csv,
        } => {
            let loaded = match config {
                Some(path) => RunConfiguration::from_json_file(&path)
                    .context(format!("Failed to load configuration from {:?}", path))?,
                None => RunConfiguration {
                    strategies: Vec::new(),
                    ..RunConfiguration::default()
                },
            };

            let overrides = parameter_overrides(buy, sell, label);
            let mut run_config = if loaded.strategies.is_empty() || !overrides.is_empty() {
                loaded.with_overrides(&registry, &strategy, &overrides)?
            } else {
                loaded
            };

            if let Some(data) = data {
                run_config.data_path = data;
            }
            if symbol.is_some() {
                run_config.symbol = symbol;
            }
            if start.is_some() {
                run_config.start = start;
            }
            if end.is_some() {
                run_config.end = end;
            }
            if let Some(fee_pct) = fee_pct {
                run_config.fee = fee_pct / 100.0;
            }
            if output_equity_csv.is_some() {
                run_config.output_equity_csv = output_equity_csv;
            }
            if output_trades_csv.is_some() {
                run_config.output_trades_csv = output_trades_csv;
            }

            let options = ReportOptions {
                benchmark,
                monthly,
                show_trades,
            };
            run_backtests(&registry, &run_config, &options)?;
        }
        Commands::List => list_strategies(&registry),
        Commands::InitConfig { path } => {
            RunConfiguration::default().to_json_file(&path)?;
            println!("Default configuration written to {:?}", path);
        }
    }

    Ok(())
}

struct ReportOptions {
    benchmark: bool,
    monthly: bool,
    show_trades: bool,
}

//parameter values given on the command line
fn parameter_overrides(
    buy: Option<f64>,
    sell: Option<f64>,
    label: Option<String>,
) -> StrategyParameters {
    let mut params = StrategyParameters::new();
    if let Some(buy) = buy {
        params.insert(BUY_LEVEL, ParamValue::Number(buy));
    }
    if let Some(sell) = sell {
        params.insert(SELL_LEVEL, ParamValue::Number(sell));
    }
    if let Some(label) = label {
        params.insert(LABEL, ParamValue::Text(label));
    }
    params
}

fn run_backtests(
    registry: &StrategyRegistry,
    config: &RunConfiguration,
    options: &ReportOptions,
) -> Result<()> {
    println!("Strategy Backtesting Engine");
    println!("===========================\n");

    if let (Some(start), Some(end)) = (config.start, config.end) {
        validate_date_range(start, end, Utc::now().date_naive())?;
    }

    //load data
    let bars = load_csv(&config.data_path, config.symbol.as_deref())
        .context(format!("Failed to load data from {:?}", config.data_path))?;
    let series = PriceSeries::new(bars)?.between(config.start, config.end)?;

    let ticker = config.symbol.clone().unwrap_or_else(|| {
        config
            .data_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_uppercase())
            .unwrap_or_default()
    });

    println!("Loaded {} bars for {}", series.len(), ticker);
    println!(
        "Date range: {} to {}",
        series.first().timestamp.date_naive(),
        series.last().timestamp.date_naive()
    );
    println!("Fee: {:.3}% per trade\n", config.fee * 100.0);

    let jobs = config.jobs(registry)?;
    info!("Running {} backtest(s)", jobs.len());

    let cache = ResultCache::new();
    let outcomes = cache.run_batch(&ticker, config.start, config.end, &series, &jobs, config.fee);

    let mut completed = Vec::new();
    for (job, outcome) in jobs.iter().zip(outcomes) {
        match outcome {
            Ok(result) => completed.push((job.display_name(), result)),
            Err(e) => {
                warn!("Skipping {}: {}", job.display_name(), e);
                println!("{}: FAILED ({})\n", job.display_name(), e);
            }
        }
    }

    if completed.is_empty() {
        anyhow::bail!("Every backtest failed");
    }

    for (name, result) in &completed {
        println!("{}", name);
        println!("{}", "-".repeat(name.len()));
        result.metrics.pretty_print_table();

        let distribution = TradeDistribution::from_trades(&result.trades);
        if distribution.count > 0 {
            println!(
                "Trades: {} (mean {:.2}%, median {:.2}%, best {:.2}%, worst {:.2}%)",
                distribution.count,
                distribution.mean_pct,
                distribution.median_pct,
                distribution.best_pct,
                distribution.worst_pct
            );
        } else {
            println!("No trades to display for this strategy");
        }

        if options.show_trades {
            print_trades(&result.trades);
        }
        if options.monthly {
            print_monthly(&result.equity_curve);
        }
        println!();
    }

    print_comparison(&completed, options.benchmark.then(|| benchmark_row(&series)));

    if let Some(path) = &config.output_equity_csv {
        save_equity_csv(&completed, path)?;
        println!("\nEquity curve saved to {:?}", path);
    }

    if let Some(path) = &config.output_trades_csv {
        save_trades_csv(&completed, path)?;
        println!("Trades saved to {:?}", path);
    }

    Ok(())
}

fn list_strategies(registry: &StrategyRegistry) {
    for strategy in registry.iter() {
        println!("{} ({})", strategy.name(), strategy.id());
        println!("{}\n", strategy.description());

        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("Parameter"),
            Cell::new("Label"),
            Cell::new("Type"),
            Cell::new("Default"),
            Cell::new("Help"),
        ]));

        let defaults = strategy.default_params();
        for spec in strategy.param_schema() {
            let kind = match spec.kind {
                ParamKind::Number { min, max, step } => {
                    format!("number [{}, {}] step {}", min, max, step)
                }
                ParamKind::Text => "text".to_string(),
            };
            let default = match defaults.get(&spec.key) {
                Some(ParamValue::Number(v)) => format!("{}", v),
                Some(ParamValue::Text(s)) => s.clone(),
                None => String::new(),
            };
            table.add_row(Row::new(vec![
                Cell::new(&spec.key),
                Cell::new(&spec.label),
                Cell::new(&kind),
                Cell::new(&default),
                Cell::new(&spec.help),
            ]));
        }
        table.printstd();
        println!();
    }
}

fn benchmark_row(series: &PriceSeries) -> (String, f64, f64) {
    let curve = buy_and_hold_curve(&series.closes());
    let total = (curve.last().copied().unwrap_or(1.0) - 1.0) * 100.0;
    let mdd = sr_backtest::metrics::timeseries::max_drawdown_pct(&curve);
    ("Buy & Hold".to_string(), total, mdd)
}

fn print_comparison(results: &[(String, BacktestResult)], benchmark: Option<(String, f64, f64)>) {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Strategy"),
        Cell::new("Total Return"),
        Cell::new("Annual Return"),
        Cell::new("Sharpe"),
        Cell::new("Max Drawdown"),
        Cell::new("Trades"),
        Cell::new("Win Rate"),
    ]));

    for (name, result) in results {
        let m = &result.metrics;
        table.add_row(Row::new(vec![
            Cell::new(name),
            Cell::new(&format!("{:.2}%", m.total_return_pct)),
            Cell::new(&format!("{:.2}%", m.annual_return_pct)),
            Cell::new(&format!("{:.3}", m.sharpe_ratio)),
            Cell::new(&format!("{:.2}%", m.max_drawdown_pct)),
            Cell::new(&format!("{}", m.total_trades)),
            Cell::new(&format!("{:.2}%", m.win_rate_pct)),
        ]));
    }

    if let Some((name, total, mdd)) = benchmark {
        table.add_row(Row::new(vec![
            Cell::new(&name),
            Cell::new(&format!("{:.2}%", total)),
            Cell::new("-"),
            Cell::new("-"),
            Cell::new(&format!("{:.2}%", mdd)),
            Cell::new("-"),
            Cell::new("-"),
        ]));
    }

    println!("Comparison");
    println!("==========");
    table.printstd();
}

fn print_trades(trades: &[Trade]) {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Entry"),
        Cell::new("Exit"),
        Cell::new("Entry Price"),
        Cell::new("Exit Price"),
        Cell::new("P&L"),
    ]));
    for trade in trades {
        table.add_row(Row::new(vec![
            Cell::new(&trade.entry_date.date_naive().to_string()),
            Cell::new(&trade.exit_date.date_naive().to_string()),
            Cell::new(&format!("{:.2}", trade.entry_price)),
            Cell::new(&format!("{:.2}", trade.exit_price)),
            Cell::new(&format!("{:.2}%", trade.pnl_pct)),
        ]));
    }
    table.printstd();
}

fn print_monthly(curve: &[EquityPoint]) {
    let months = monthly_returns(curve);
    if months.is_empty() {
        println!("Insufficient data for monthly returns");
        return;
    }

    let mut header = vec![Cell::new("Year")];
    header.extend(
        sr_backtest::metrics::monthly::MONTH_LABELS
            .iter()
            .map(|m| Cell::new(m)),
    );

    let mut table = Table::new();
    table.add_row(Row::new(header));
    for (year, row) in pivot_by_year(&months) {
        let mut cells = vec![Cell::new(&year.to_string())];
        cells.extend(row.iter().map(|value| match value {
            Some(v) => Cell::new(&format!("{:.1}%", v)),
            None => Cell::new(""),
        }));
        table.add_row(Row::new(cells));
    }
    table.printstd();
}

#[derive(Serialize)]
struct EquityRow<'a> {
    strategy: &'a str,
    timestamp: String,
    equity: f64,
    drawdown: f64,
    returns: f64,
}

fn save_equity_csv(results: &[(String, BacktestResult)], path: &PathBuf) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    for (name, result) in results {
        for point in &result.equity_curve {
            writer.serialize(EquityRow {
                strategy: name,
                timestamp: point.timestamp.to_rfc3339(),
                equity: point.equity,
                drawdown: point.drawdown,
                returns: point.returns,
            })?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct TradeRow<'a> {
    strategy: &'a str,
    entry_date: String,
    exit_date: String,
    entry_price: f64,
    exit_price: f64,
    pnl_pct: f64,
}

fn save_trades_csv(results: &[(String, BacktestResult)], path: &PathBuf) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    for (name, result) in results {
        for trade in &result.trades {
            writer.serialize(TradeRow {
                strategy: name,
                entry_date: trade.entry_date.to_rfc3339(),
                exit_date: trade.exit_date.to_rfc3339(),
                entry_price: trade.entry_price,
                exit_price: trade.exit_price,
                pnl_pct: trade.pnl_pct,
            })?;
        }
    }

    writer.flush()?;
    Ok(())
}
