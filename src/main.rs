use consistent_hash::{log, HashRing};
use std::process::ExitCode;

const OWNERS: [&str; 3] = ["server1", "server2", "server3"];

fn main() -> ExitCode {
    log::init_logger();
    let keys: Vec<String> = std::env::args().skip(1).collect();
    if keys.is_empty() {
        eprintln!("usage: consistent_hash <key>...");
        return ExitCode::FAILURE;
    }

    let mut ring = HashRing::new();
    for owner in OWNERS {
        ring.add(owner);
    }
    for key in &keys {
        match ring.get2(key) {
            Ok((primary, backup)) => println!("key={} server={} backup={}", key, primary, backup),
            Err(e) => {
                eprintln!("key={} error: {}", key, e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
