use std::process;
use skipgram_trainer::Run;

fn main() {
    if let Err(e) = Run::run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}
