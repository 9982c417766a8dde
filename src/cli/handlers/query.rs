use tilepack::{Channel, Config, HttpTransport};

use crate::cli::args::QueryArgs;

pub fn handle(args: QueryArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = config.transport.clone();
    if let Some(endpoint) = args.endpoint {
        settings.endpoint = Some(endpoint);
    }

    let channel = Channel::with_transport(HttpTransport::from_settings(&settings)?);
    let mut reply = channel.send_query(&args.text)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reply.to_json())?);
        return Ok(());
    }

    let rows = reply.unpack();
    if rows.is_empty() {
        print!("{}", reply.describe());
    } else {
        println!("{} rows", rows.len());
        for (i, row) in rows.iter().enumerate() {
            println!("[{}]", i);
            print!("{}", row.describe());
        }
    }
    Ok(())
}
