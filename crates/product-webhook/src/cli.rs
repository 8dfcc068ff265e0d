use clap::builder::PossibleValue;
use clap::{crate_authors, crate_description, crate_name, crate_version, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    let mut args = vec![
        Arg::new("log-level")
            .long("log-level")
            .value_name("LOG_LEVEL")
            .env("PRODUCT_WEBHOOK_LOG_LEVEL")
            .default_value("info")
            .value_parser([
                PossibleValue::new("trace"),
                PossibleValue::new("debug"),
                PossibleValue::new("info"),
                PossibleValue::new("warn"),
                PossibleValue::new("error"),
            ])
            .help("Log level"),
        Arg::new("log-fmt")
            .long("log-fmt")
            .value_name("LOG_FMT")
            .env("PRODUCT_WEBHOOK_LOG_FMT")
            .default_value("text")
            .value_parser([PossibleValue::new("text"), PossibleValue::new("json")])
            .help("Log output format"),
        Arg::new("log-no-color")
            .long("log-no-color")
            .env("NO_COLOR")
            .action(ArgAction::SetTrue)
            .help("Disable colored output for logs"),
        Arg::new("address")
            .long("addr")
            .value_name("BIND_ADDRESS")
            .default_value("0.0.0.0")
            .env("PRODUCT_WEBHOOK_BIND_ADDRESS")
            .help("Bind against ADDRESS"),
        Arg::new("port")
            .long("port")
            .value_name("PORT")
            .default_value("8000")
            .env("PRODUCT_WEBHOOK_PORT")
            .help("Listen on PORT"),
        Arg::new("cert-file")
            .long("cert-file")
            .value_name("CERT_FILE")
            .default_value("")
            .env("PRODUCT_WEBHOOK_CERT_FILE")
            .help("Path to an X.509 certificate file for HTTPS"),
        Arg::new("key-file")
            .long("key-file")
            .value_name("KEY_FILE")
            .default_value("")
            .env("PRODUCT_WEBHOOK_KEY_FILE")
            .help("Path to an X.509 private key file for HTTPS"),
        Arg::new("blacklist-users")
            .long("blacklist-users")
            .value_name("USERS")
            .value_delimiter(',')
            .env("PRODUCT_WEBHOOK_BLACKLIST_USERS")
            .help("Comma separated list of users whose requests are always denied"),
        Arg::new("blacklist-namespaces")
            .long("blacklist-namespaces")
            .value_name("NAMESPACES")
            .value_delimiter(',')
            .env("PRODUCT_WEBHOOK_BLACKLIST_NAMESPACES")
            .help("Comma separated list of namespaces where requests are always denied"),
        Arg::new("system-users")
            .long("system-users")
            .value_name("USERS")
            .value_delimiter(',')
            .env("PRODUCT_WEBHOOK_SYSTEM_USERS")
            .help("Comma separated list of trusted users whose requests are always accepted"),
        Arg::new("system-namespaces")
            .long("system-namespaces")
            .value_name("NAMESPACES")
            .value_delimiter(',')
            .env("PRODUCT_WEBHOOK_SYSTEM_NAMESPACES")
            .help("Comma separated list of trusted namespaces where requests are always accepted"),
        Arg::new("allowlist-namespaces")
            .long("allowlist-namespaces")
            .value_name("NAMESPACES")
            .value_delimiter(',')
            .default_values(["kube-system", "kube-public"])
            .env("PRODUCT_WEBHOOK_ALLOWLIST_NAMESPACES")
            .help("Comma separated list of namespaces whose products are neither mutated nor validated"),
    ];
    args.sort_by(|a, b| a.get_id().cmp(b.get_id()));

    Command::new(crate_name!())
        .author(crate_authors!())
        .version(crate_version!())
        .about(crate_description!())
        .args(args)
}
