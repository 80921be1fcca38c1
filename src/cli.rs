// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, arg, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(arg!(--json "Print as pretty JSON"))
        .arg(arg!(--jsonl "Print as JSON lines"))
}

fn range_args(cmd: Command) -> Command {
    cmd.arg(arg!(--from <DATE> "Range start (YYYY-MM-DD); defaults to this month"))
        .arg(arg!(--to <DATE> "Range end (YYYY-MM-DD)"))
}

fn report_cmd(name: &'static str, about: &'static str) -> Command {
    json_flags(range_args(Command::new(name).about(about)))
}

pub fn build_cli() -> Command {
    Command::new("tillbook")
        .about("Daily shift income, expenses and period reports for a small shop")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Create the database if missing"))
        .subcommand(
            Command::new("day")
                .about("Daily records and shifts")
                .subcommand(
                    Command::new("set")
                        .about("Record income for one shift")
                        .arg(arg!(--date <DATE> "Day (YYYY-MM-DD)").required(true))
                        .arg(arg!(--shift <SHIFT> "morning|afternoon").required(true))
                        .arg(
                            Arg::new("income")
                                .long("income")
                                .value_name("AMOUNT")
                                .help("Income, e.g. 221.223,50 or 221,223.50")
                                .required(true)
                                .allow_hyphen_values(true),
                        )
                        .arg(arg!(--note <NOTE> "Shift note"))
                        .arg(
                            Arg::new("closed")
                                .long("closed")
                                .action(ArgAction::SetTrue)
                                .help("Mark the shift as closed"),
                        ),
                )
                .subcommand(
                    Command::new("note")
                        .about("Set the free-text note of a day")
                        .arg(arg!(--date <DATE>).required(true))
                        .arg(arg!(--text <TEXT>).required(true)),
                )
                .subcommand(json_flags(
                    Command::new("show")
                        .about("Show shifts, expenses and totals of a day")
                        .arg(arg!(--date <DATE>).required(true)),
                ))
                .subcommand(json_flags(
                    Command::new("list").about("Most recent days").arg(
                        arg!(--limit <N> "How many days")
                            .value_parser(value_parser!(usize))
                            .default_value("180"),
                    ),
                )),
        )
        .subcommand(
            Command::new("expense")
                .about("Categorized expense entries")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--date <DATE>).required(true))
                        .arg(arg!(--kind <KIND> "fixed|variable").required(true))
                        .arg(arg!(--category <NAME>).required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true))
                        .arg(arg!(--note <NOTE>)),
                )
                .subcommand(Command::new("rm").arg(arg!(--id <ID>).required(true))),
        )
        .subcommand(
            Command::new("category")
                .about("Expense categories")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--kind <KIND> "fixed|variable").required(true))
                        .arg(arg!(--name <NAME>).required(true)),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(arg!(--kind <KIND> "fixed|variable")),
                ))
                .subcommand(
                    Command::new("rename")
                        .arg(arg!(--id <ID>).required(true))
                        .arg(arg!(--name <NAME>).required(true)),
                )
                .subcommand(Command::new("rm").arg(arg!(--id <ID>).required(true))),
        )
        .subcommand(
            Command::new("report")
                .about("Period reports")
                .subcommand(
                    report_cmd("summary", "KPIs, best/worst days, alerts, missing days").arg(
                        arg!(--top <N> "Best/worst days to show")
                            .value_parser(value_parser!(usize))
                            .default_value("3"),
                    ),
                )
                .subcommand(report_cmd("series", "Per-day totals"))
                .subcommand(report_cmd("periods", "Weekly and monthly rollups"))
                .subcommand(
                    report_cmd("compare", "Compare against the previous or a custom period")
                        .arg(arg!(--cfrom <DATE> "Comparison start"))
                        .arg(arg!(--cto <DATE> "Comparison end")),
                )
                .subcommand(
                    report_cmd("categories", "Spend by expense category")
                        .arg(arg!(--trend "Monthly spend of the six largest categories")),
                ),
        )
        .subcommand(
            Command::new("export").about("Backups").subcommand(
                range_args(Command::new("backup"))
                    .arg(arg!(--format <FMT> "json|csv").required(true))
                    .arg(arg!(--out <PATH> "File (json) or directory (csv)").required(true)),
            ),
        )
        .subcommand(
            Command::new("import").about("Bulk import").subcommand(
                Command::new("shifts")
                    .about("Legacy shift totals: date,shift,income,variable,fixed")
                    .arg(arg!(--path <PATH>).required(true))
                    .arg(arg!(--mode <MODE> "skip|replace").default_value("skip")),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(arg!(--key <KEY>).required(true))
                        .arg(arg!(--value <VALUE>).required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for inconsistencies"))
}
