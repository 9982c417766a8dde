use tilepack::Config;

use crate::cli::args::ListsArgs;
use crate::cli::config::registry;

pub fn handle(args: ListsArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let registry = registry(config)?;

    if args.defines {
        print!("{}", registry.defines());
        return Ok(());
    }

    println!("Configured lists:\n");
    for entry in registry.to_aggregate_list()?.entries() {
        let count = registry.list(entry.name()).map_or(0, |l| l.count());
        println!("  {:<6} {:<20} {:>3} entries", entry.name(), entry.desc(), count);
    }
    Ok(())
}
