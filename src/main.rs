use clap::Parser;
use log::{debug, info};
use nu_ansi_term::{Color, Style};
use regenv::{
    app::{greeter_only, shout, wire, Greeting, Settings},
    cli::{Args, Commands},
    error::Result,
};

fn run_greet(settings: Settings, loud: bool, user: &str) -> Result<()> {
    let env = wire(settings)?;
    let env = if loud { shout(&env) } else { env };

    // The greeting side of the app only ever sees the greeter.
    let greeter = greeter_only(&env);
    println!("{}", greeter.get(Greeting).greet(user)?);

    Ok(())
}

fn run_keys(settings: Settings) -> Result<()> {
    let env = wire(settings)?;

    for (i, key) in env.keys().into_iter().enumerate() {
        println!(
            "{} {}",
            Style::new().dimmed().paint(format!("{:>2}", i)),
            Color::Green.bold().paint(key)
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let settings = args.settings();
    debug!("settings: {:?}", settings);

    match args.command {
        Commands::Greet { user } => {
            info!("GREET MODE");
            debug!("user: {:?}", user);

            run_greet(settings, args.loud, &user)
                .inspect_err(|err| {
                    eprintln!("{}", Color::Red.paint(err.to_string()));
                })
                .ok();
        }
        Commands::Keys => {
            info!("KEYS MODE");

            run_keys(settings)
                .inspect_err(|err| {
                    eprintln!("{}", Color::Red.paint(err.to_string()));
                })
                .ok();
        }
    }
    Ok(())
}
