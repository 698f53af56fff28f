fn main() {
    if let Err(err) = paper_figures::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
