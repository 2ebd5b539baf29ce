use clap::Parser;
use invoice_reconciler::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Create async runtime and run the main command logic
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(commands::run(args));

    match result {
        Ok(code) => {
            process::exit(code);
        }
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Invoice Reconciler - EV-Charging Invoice Combiner");
    println!("=================================================");
    println!();
    println!("Reconcile tabular invoice exports (CSV, XLSX, XLS) from different");
    println!("billing systems into one canonical session table.");
    println!();
    println!("USAGE:");
    println!("    invoice-reconciler <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    merge       Merge invoice exports into one canonical table (main command)");
    println!("    inspect     Show the detected schema of a single file");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Merge every invoice export in a directory:");
    println!("    invoice-reconciler merge ./invoices --output combined_invoices.csv");
    println!();
    println!("    # Merge explicit files with a failure report:");
    println!("    invoice-reconciler merge march_a.csv march_b.xlsx --report failures.json");
    println!();
    println!("    # Preview how one file would be classified:");
    println!("    invoice-reconciler inspect vendor_march.xlsx");
    println!();
    println!("For detailed help on any command, use:");
    println!("    invoice-reconciler <COMMAND> --help");
}
