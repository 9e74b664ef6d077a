//! Control channel CLI
//!
//! Sends one command to a running gateway and prints the response:
//!
//! ```text
//! prahari-ctl GET HEALTH
//! prahari-ctl SET LOG_LEVEL=DEBUG
//! prahari-ctl --host 10.0.0.5 --port 5100 GET STATS
//! ```

use prahari_gw::control::ControlClient;
use prahari_gw::error::{Error, Result};

fn print_usage() {
    eprintln!(
        "Usage: prahari-ctl [--host <ip>] [--port <port>] <command...>\n\
         Commands are sent verbatim, e.g.:\n\
         \x20 prahari-ctl GET HEALTH\n\
         \x20 prahari-ctl GET STATS\n\
         \x20 prahari-ctl SET LOG_LEVEL=DEBUG\n\
         \x20 prahari-ctl SET CRC=OFF"
    );
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut host = "127.0.0.1".to_string();
    let mut port = 5100u16;
    let mut command_words: Vec<String> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--host" => {
                host = args
                    .next()
                    .ok_or_else(|| Error::Config("--host requires a value".to_string()))?;
            }
            "--port" => {
                let raw = args
                    .next()
                    .ok_or_else(|| Error::Config("--port requires a value".to_string()))?;
                port = raw
                    .parse()
                    .map_err(|_| Error::Config(format!("invalid port '{}'", raw)))?;
            }
            "--help" => {
                print_usage();
                return Ok(());
            }
            word => command_words.push(word.to_string()),
        }
    }

    if command_words.is_empty() {
        print_usage();
        return Err(Error::Config("no command given".to_string()));
    }
    let command = command_words.join(" ");

    let mut client = ControlClient::connect(&host, port)?;
    let response = client.send_command(&command)?;
    println!("{}", response);

    Ok(())
}
