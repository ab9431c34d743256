use clap::{
    crate_description, crate_name, crate_version, App, AppSettings, Arg, ArgMatches, SubCommand,
};
use sgmatch::{
    candidates::CandidateSet,
    dag::Dag,
    executor::enumerate,
    graph::{Graph, GraphInfo},
    parser::{read_candidates, read_data_graph, read_query_graph},
};
use std::error::Error;
use std::io::{BufWriter, Write};
use std::time::Instant;

fn load_inputs(matches: &ArgMatches) -> Result<(Graph, Graph, CandidateSet), Box<dyn Error>> {
    let (data, label_map) = read_data_graph(matches.value_of("DATA").unwrap())?;
    let query = read_query_graph(matches.value_of("QUERY").unwrap(), &label_map)?;
    let cs = match matches.value_of("candidates") {
        Some(path) => read_candidates(path, &query)?,
        None => CandidateSet::from_filter(&data, &query),
    };
    Ok((data, query, cs))
}

fn handle_match(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let start_time = Instant::now();
    let (data, query, cs) = load_inputs(matches)?;
    let mut out = BufWriter::new(std::io::stdout());
    let time_now = Instant::now();
    let num_rows = enumerate(&mut out, &data, &query, &cs)?;
    out.flush()?;
    eprintln!(
        "enumerate_time: {}",
        (Instant::now() - time_now).as_millis()
    );
    eprintln!("num_rows: {}", num_rows);
    eprintln!(
        "total_time: {}",
        (Instant::now() - start_time).as_millis()
    );
    Ok(())
}

fn handle_plan(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let (_, query, cs) = load_inputs(matches)?;
    print!("{}", Dag::build(&query, &cs));
    Ok(())
}

fn handle_info(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let (graph, _) = read_data_graph(matches.value_of("GRAPH").unwrap())?;
    println!("{}", GraphInfo::new(&graph));
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let matches = App::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("match")
                .about("Enumerates the embeddings of the query in the data graph")
                .arg(Arg::with_name("DATA").required(true))
                .arg(Arg::with_name("QUERY").required(true))
                .arg(
                    Arg::with_name("candidates")
                        .help("Reads candidate sets from a file instead of filtering by label and degree")
                        .long("candidates")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("plan")
                .about("Displays the matching order DAG without enumerating")
                .arg(Arg::with_name("DATA").required(true))
                .arg(Arg::with_name("QUERY").required(true))
                .arg(
                    Arg::with_name("candidates")
                        .long("candidates")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("info")
                .about("Displays information about a graph file")
                .arg(Arg::with_name("GRAPH").required(true)),
        )
        .get_matches();
    if let Some(matches) = matches.subcommand_matches("match") {
        handle_match(matches)?;
    } else if let Some(matches) = matches.subcommand_matches("plan") {
        handle_plan(matches)?;
    } else if let Some(matches) = matches.subcommand_matches("info") {
        handle_info(matches)?;
    }
    Ok(())
}
