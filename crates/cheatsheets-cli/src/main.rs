fn main() -> std::process::ExitCode {
    cheatsheets_cli::run()
}
