mod error;
mod log;
mod model;
mod pa;

use std::env;
use std::process::exit;

use serde::Serialize;
use tracing::debug;

use crate::error::QueryError;
use crate::pa::{Cards, Filter, QueryOutput, Records, Session, Sinks, INVALID_ID};

fn print_usage() -> ! {
    eprintln!("usage: paquery [cards|sinks] [index or name, omit for all records]");
    exit(1);
}

fn main() {
    log::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("need a record kind to query");
        print_usage();
    }

    let filter = Filter::parse(args.get(2).map(String::as_str));

    let result = match args[1].as_str() {
        "cards" => run::<Cards>(&filter),
        "sinks" => run::<Sinks>(&filter),
        kind => {
            eprintln!("invalid kind {} requested", kind);
            print_usage();
        }
    };

    match result {
        Ok(body) => println!("{}", body),
        Err(e) => log::oops(format!("{}", e), 1),
    }
}

/// Run one query, unless the filter is the reserved invalid index, in
/// which case the result is empty without ever contacting the server.
fn run<K: Records>(filter: &Filter) -> Result<String, QueryError> {
    if matches!(filter, Filter::Index(INVALID_ID)) {
        debug!("reserved invalid index requested, skipping the query");
        return render(&QueryOutput::<K::Record>::empty());
    }

    let session = Session::connect()?;
    render(&session.query::<K>(filter))
}

/// Debug runs get indented output; the value itself never changes.
fn render<R: Serialize>(output: &QueryOutput<R>) -> Result<String, QueryError> {
    let body = if *log::DEBUG {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };
    Ok(body)
}
