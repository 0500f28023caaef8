fn main() {
    if let Err(e) = jarsmith_cli::run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
