use actionroute::cli::run_cli;

fn main() {
    if let Err(e) = run_cli() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
