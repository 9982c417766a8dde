use tilepack::{Config, EntryView, ListCodec, ListKind, ListRegistry};

use crate::cli::args::ListCommand;
use crate::cli::config::registry;

pub fn handle(command: ListCommand, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let registry = registry(config)?;
    match command {
        ListCommand::Show { definition } => {
            let list = resolve(&definition, &registry)?;
            show(&list);
            Ok(())
        }
        ListCommand::Get { definition, name } => {
            let list = resolve(&definition, &registry)?;
            let entry = list
                .entry(&name)
                .ok_or_else(|| format!("List '{}' has no entry '{}'", list.name(), name))?;
            show_entry(&entry, &registry);
            Ok(())
        }
    }
}

/// A configured list by name, otherwise the argument parsed as a definition.
fn resolve(definition: &str, registry: &ListRegistry) -> Result<ListCodec, Box<dyn std::error::Error>> {
    if let Some(list) = registry.list(definition) {
        return Ok(list.clone());
    }
    Ok(ListCodec::parse(definition)?)
}

fn show(list: &ListCodec) {
    println!("name:      {}", list.name());
    println!("desc:      {}", list.desc());
    println!("delimiter: {:?}", list.delimiter());
    println!("kind:      {:?}", list.kind());
    if list.indent() > 0 {
        println!("indent:    {}", list.indent());
    }

    match list.kind() {
        ListKind::Nested => print!("{}", list.dump()),
        ListKind::IdRef => {
            let ids: Vec<String> = list.ref_ids().iter().map(usize::to_string).collect();
            println!("refs:      {}", ids.join(","));
        }
        ListKind::Plain | ListKind::NameOnly => {
            println!("entries:   {}\n", list.count());
            for entry in list.entries() {
                let format = entry.format().map(ToString::to_string).unwrap_or_default();
                println!("  {:>3}  {:<12} {}{}", entry.id(), entry.name(), format, entry.desc());
            }
        }
    }
}

fn show_entry(entry: &EntryView, registry: &ListRegistry) {
    println!("id:     {}", entry.id());
    println!("name:   {}", entry.name());
    println!("desc:   {}", entry.desc());
    if let Some(format) = entry.format() {
        println!("format: {} {:?}", format, format.kind());
        if let Some(error) = format.error() {
            println!("error:  {}", error);
        }
        if let Some(members) = registry.member_list(format) {
            println!("member: {} ({} entries)", members.name(), members.count());
        }
    }
    if !entry.values().is_empty() {
        let values: Vec<String> = entry.values().iter().map(f64::to_string).collect();
        println!("value:  {}", values.join(","));
    }
}
