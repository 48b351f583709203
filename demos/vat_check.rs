//! Validate VAT numbers given on the command line.
//!
//! ```sh
//! VATCHECK_UK_CLIENT_ID=... VATCHECK_UK_CLIENT_SECRET=... \
//!     cargo run --example vat_check -- NL123456789B01 GB123456789
//! ```

use tracing_subscriber::EnvFilter;
use vatcheck::*;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let numbers: Vec<String> = std::env::args().skip(1).collect();
    if numbers.is_empty() {
        eprintln!("usage: vat_check <VAT number>...");
        std::process::exit(2);
    }

    println!("=== Format Validation ===\n");
    for n in &numbers {
        match sanitize(n) {
            Ok(clean) => println!("  {n} => valid format ({clean})"),
            Err(e) => println!("  {n} => INVALID: {e}"),
        }
    }

    println!("\n=== Existence Check ===\n");
    let mut opts = ValidatorOptions::from_env();
    for n in &numbers {
        let Ok(clean) = sanitize(n) else { continue };
        let check = validate(&clean, &opts);
        if let Some(token) = check.refreshed_token {
            opts.uk_access_token = Some(token);
        }
        match check.outcome {
            Ok(Some(r)) => println!(
                "  {clean} => registered: {} / {}",
                r.name.as_deref().unwrap_or("—"),
                r.address.as_deref().unwrap_or("—").replace('\n', ", ")
            ),
            Ok(None) => println!("  {clean} => registered"),
            Err(e) if e.is_retryable() => println!("  {clean} => try again later: {e}"),
            Err(e) => println!("  {clean} => {e}"),
        }
    }
}
