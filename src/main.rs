fn main() {
    if handle_cli_flags() {
        return;
    }

    feed_actions::logging::init();

    let invocation = match feed_actions::app::parse_args(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(err) => {
            eprintln!("error: {err:#}\n\n{}", feed_actions::app::USAGE);
            std::process::exit(2);
        }
    };

    match feed_actions::run(invocation) {
        Ok(report) => {
            print!("{report}");
            if report.failed {
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("error: {err:?}");
            std::process::exit(1);
        }
    }
}

fn handle_cli_flags() -> bool {
    // Stops at the command word; anything after it belongs to the command.
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("feed-actions {}", feed_actions::VERSION);
                return true;
            }
            "--help" | "-h" => {
                println!("{}", feed_actions::app::USAGE);
                return true;
            }
            "--config" => {
                args.next();
            }
            _ => return false,
        }
    }
    false
}
