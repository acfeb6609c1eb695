use std::process;

fn main() {
    if let Err(e) = taskjson::cli::run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
