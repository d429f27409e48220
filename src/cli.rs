// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn ident(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).required(true).help(help)
}

fn entry_type() -> Arg {
    Arg::new("type")
        .long("type")
        .value_parser(["income", "expense"])
        .help("income | expense")
}

fn yes_flag() -> Arg {
    Arg::new("yes")
        .long("yes")
        .action(ArgAction::SetTrue)
        .help("Confirm a destructive bulk operation")
}

fn transaction_args(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("date").long("date").required(required).help("YYYY-MM-DD"))
        .arg(Arg::new("amount").long("amount").required(required).help("Positive amount"))
        .arg(entry_type().required(required))
        .arg(
            Arg::new("category")
                .long("category")
                .required(required)
                .help("Category id or name"),
        )
        .arg(
            Arg::new("wallet")
                .long("wallet")
                .help("Wallet id or name (defaults to the default wallet, then Main Wallet)"),
        )
        .arg(Arg::new("description").long("desc").help("Free-text description"))
        .arg(
            Arg::new("currency")
                .long("currency")
                .help("Currency the amount was entered in; converted to the default currency"),
        )
        .arg(Arg::new("event").long("event").help("Event id or name"))
        .arg(
            Arg::new("exclude")
                .long("exclude-from-report")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("attach")
                .long("attach")
                .action(ArgAction::Append)
                .help("File to attach (repeatable)"),
        )
}

pub fn build_cli() -> Command {
    Command::new("expensewise")
        .about("Personal finance ledger: wallets, category trees, debts and events")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .help("User scope to operate on (default: dev-user)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Path to a TOML config file"),
        )
        .subcommand(Command::new("init").about("Create the database and provision the user"))
        .subcommand(
            Command::new("profile")
                .about("Show or edit the user profile")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("email").long("email")),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage the category tree (at most three levels)")
                .subcommand(
                    Command::new("add")
                        .arg(ident("name", "Category name"))
                        .arg(entry_type().required(true))
                        .arg(Arg::new("parent").long("parent").help("Parent id or name"))
                        .arg(Arg::new("icon").long("icon")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("tree")
                            .long("tree")
                            .action(ArgAction::SetTrue)
                            .help("Show as an indented tree"),
                    ),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(ident("category", "Category id or name"))
                        .arg(Arg::new("name").long("name"))
                        .arg(entry_type())
                        .arg(Arg::new("icon").long("icon")),
                )
                .subcommand(
                    Command::new("move")
                        .arg(ident("category", "Category id or name"))
                        .arg(Arg::new("parent").long("parent").help("New parent id or name"))
                        .arg(
                            Arg::new("root")
                                .long("root")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("parent")
                                .help("Make it a top-level category"),
                        ),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a category and everything below it")
                        .arg(ident("category", "Category id or name")),
                )
                .subcommand(Command::new("rm-all").arg(yes_flag())),
        )
        .subcommand(
            Command::new("wallet")
                .about("Manage wallets")
                .subcommand(
                    Command::new("add")
                        .arg(ident("name", "Wallet name"))
                        .arg(Arg::new("currency").long("currency").help("Defaults to the default currency"))
                        .arg(Arg::new("balance").long("balance").default_value("0"))
                        .arg(Arg::new("icon").long("icon")),
                )
                .subcommand(json_flags(Command::new("list").about("Wallets with balances")))
                .subcommand(
                    Command::new("edit")
                        .arg(ident("wallet", "Wallet id or name"))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("icon").long("icon"))
                        .arg(Arg::new("balance").long("balance").help("New initial balance"))
                        .arg(
                            Arg::new("link")
                                .long("link")
                                .action(ArgAction::Append)
                                .help("Linked category id or name (repeatable; replaces the list)"),
                        ),
                )
                .subcommand(Command::new("rm").arg(ident("wallet", "Wallet id or name")))
                .subcommand(
                    Command::new("default")
                        .about("Show or set the default wallet")
                        .arg(Arg::new("wallet").help("Wallet id or name"))
                        .arg(
                            Arg::new("clear")
                                .long("clear")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("wallet"),
                        ),
                )
                .subcommand(Command::new("balance").arg(ident("wallet", "Wallet id or name"))),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(transaction_args(Command::new("add"), true))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("wallet").long("wallet"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("event").long("event"))
                        .arg(
                            Arg::new("reportable")
                                .long("reportable")
                                .action(ArgAction::SetTrue)
                                .help("Hide transactions excluded from reports"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    transaction_args(Command::new("edit").arg(ident("id", "Transaction id")), false)
                        .arg(
                            Arg::new("include")
                                .long("include-in-report")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("exclude"),
                        ),
                )
                .subcommand(Command::new("rm").arg(ident("id", "Transaction id")))
                .subcommand(Command::new("rm-all").arg(yes_flag())),
        )
        .subcommand(
            Command::new("debt")
                .about("Track money owed and lent")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(["payable", "receivable"]),
                        )
                        .arg(Arg::new("person").long("person").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("currency").long("currency"))
                        .arg(Arg::new("due").long("due").required(true).help("YYYY-MM-DD"))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("pay")
                        .arg(ident("id", "Debt id"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("date").long("date").help("Defaults to today")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(ident("id", "Debt id"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["payable", "receivable"]),
                        )
                        .arg(Arg::new("person").long("person"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("due").long("due"))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(Command::new("rm").arg(ident("id", "Debt id"))),
        )
        .subcommand(
            Command::new("event")
                .about("Labels that transactions can be tagged with")
                .subcommand(
                    Command::new("add")
                        .arg(ident("name", "Event name"))
                        .arg(Arg::new("icon").long("icon").default_value("📅")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("edit")
                        .arg(ident("event", "Event id or name"))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("icon").long("icon")),
                )
                .subcommand(
                    Command::new("status")
                        .arg(ident("event", "Event id or name"))
                        .arg(
                            Arg::new("status")
                                .required(true)
                                .value_parser(["active", "inactive"]),
                        ),
                )
                .subcommand(Command::new("rm").arg(ident("event", "Event id or name"))),
        )
        .subcommand(
            Command::new("settings")
                .about("Per-user settings")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("currency")
                        .about("Change the default currency")
                        .arg(ident("currency", "ISO currency code"))
                        .arg(
                            Arg::new("convert")
                                .long("convert")
                                .action(ArgAction::SetTrue)
                                .help("Re-denominate wallets, debts and transactions as well"),
                        ),
                )
                .subcommand(
                    Command::new("api-key")
                        .about("Set or clear the exchange-rate API key")
                        .arg(Arg::new("key"))
                        .arg(
                            Arg::new("clear")
                                .long("clear")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("key"),
                        ),
                )
                .subcommand(Command::new("theme").arg(ident("theme", "Theme name"))),
        )
        .subcommand(
            Command::new("fx")
                .about("Currency conversion")
                .subcommand(
                    Command::new("convert")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true)),
                )
                .subcommand(
                    Command::new("rebalance")
                        .about("Re-denominate every record held in one currency")
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true))
                        .arg(
                            Arg::new("only")
                                .long("only")
                                .value_parser(["wallets", "debts", "transactions"]),
                        ),
                )
                .subcommand(
                    Command::new("verify-key")
                        .arg(Arg::new("key").help("Defaults to the stored key")),
                ),
        )
        .subcommand(
            Command::new("import").subcommand(
                Command::new("transactions")
                    .arg(Arg::new("path").long("path").required(true))
                    .about("CSV columns: date,type,amount,category,wallet,description,currency"),
            ),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .value_parser(["csv", "json"])
                            .default_value("csv"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(json_flags(
            Command::new("doctor").about("Check the ledger for inconsistent data"),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn user_flag_is_global() {
        let m = build_cli().get_matches_from(["expensewise", "wallet", "list", "--user", "ann"]);
        assert_eq!(m.get_one::<String>("user").map(String::as_str), Some("ann"));
    }
}
