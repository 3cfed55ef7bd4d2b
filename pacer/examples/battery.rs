//! Example: run scenarios of the battery by name
//!
//! ```text
//! cargo run --example battery -- bulk-join-non-blocking bulk-join-first-failure
//! ```
//!
//! Without arguments, lists the available scenarios.

use pacer::{Error, Orchestrator, scenario};
use tracing_subscriber::EnvFilter;

fn main() -> pacer::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let names: Vec<String> = std::env::args().skip(1).collect();

    if names.is_empty() {
        for scenario in scenario::battery() {
            println!("{:<28} {}", scenario.name, scenario.description);
        }
        return Ok(());
    }

    let mut orchestrator = Orchestrator::new()?;

    for name in &names {
        let Some(scenario) = scenario::find(name) else {
            eprintln!("unknown scenario `{name}`");
            continue;
        };

        println!("== {} ({})", scenario.name, scenario.description);

        match orchestrator.run_batch(&scenario.spec) {
            Ok(report) => println!("{report}"),
            // A sequential failure is an expected outcome of the experiment.
            Err(Error::Halted(halted)) => println!("{halted}"),
            Err(err) => return Err(err),
        }
    }

    Ok(())
}
