use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use wsfmt_core::{
    CancellationToken, CommandContext, CommandGroup, CommandInfo, ConfigsRequest,
    ExecutionOutcome, FormatRequest, GlobalOptions,
};

mod cli;
mod output;
mod style;

use cli::{CommandGroupCli, WsfmtCli};
use output::{emit_output, OutputOptions};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = WsfmtCli::parse();
    init_tracing(&cli);

    let global = GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
        json: cli.json,
    };

    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone());

    let ctx = CommandContext::new(&global, cancel).map_err(|err| eyre!("{err:#}"))?;
    let (info, outcome) = dispatch(&ctx, &cli.command).map_err(|err| eyre!("{err:#}"))?;
    let opts = OutputOptions {
        quiet: cli.quiet,
        json: cli.json,
        no_color: cli.no_color,
    };
    let code = emit_output(&opts, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn dispatch(
    ctx: &CommandContext,
    command: &CommandGroupCli,
) -> anyhow::Result<(CommandInfo, ExecutionOutcome)> {
    match command {
        CommandGroupCli::Format(args) => {
            let request = FormatRequest {
                workspace: args.workspace.clone(),
                folder: args.folder,
                check: args.check,
                dry_run: args.dry_run,
                include: args.include.clone(),
                exclude: args.exclude.clone(),
                report: args.report.clone(),
                include_generated: args.include_generated,
            };
            let info = CommandInfo::new(CommandGroup::Format, "format");
            Ok((info, wsfmt_core::run_format(ctx, &request)?))
        }
        CommandGroupCli::Configs(args) => {
            let request = ConfigsRequest {
                path: args.path.clone(),
            };
            let info = CommandInfo::new(CommandGroup::Configs, "configs");
            Ok((info, wsfmt_core::list_configs(ctx, &request)?))
        }
    }
}

fn init_tracing(cli: &WsfmtCli) {
    let level = if cli.trace {
        "trace"
    } else if let Some(verbosity) = cli.verbosity {
        verbosity.level()
    } else if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("wsfmt_cli={level},wsfmt_core={level},wsfmt_domain={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Cancels `token` on Ctrl-C; the formatter checks it between phases.
fn spawn_interrupt_listener(token: CancellationToken) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::debug!(error = %err, "interrupt listener unavailable");
                return;
            }
        };
        runtime.block_on(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling");
                token.cancel();
            }
        });
    });
}
