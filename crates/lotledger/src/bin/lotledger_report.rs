//! lotledger-report - Tax-lot reports from a portfolio file.

fn main() -> std::process::ExitCode {
    lotledger::cmd::report_cmd::main()
}
