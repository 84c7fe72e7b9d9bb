mod console;

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use shoresquad_core::{AppError, Config};
use shoresquad_weather::{ControllerOptions, ForecastController, HttpForecastProvider, ViewAction};

use crate::console::ConsoleView;

const HELP: &str = "Commands: [r]efresh, retry, [t]oggle auto-refresh, [h]elp, [q]uit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Action(ViewAction),
    Help,
    Quit,
}

fn parse_command(input: &str) -> Option<Command> {
    match input.trim().to_lowercase().as_str() {
        "r" | "refresh" => Some(Command::Action(ViewAction::ManualRefresh)),
        "retry" => Some(Command::Action(ViewAction::Retry)),
        "t" | "toggle" => Some(Command::Action(ViewAction::ToggleAutoRefresh)),
        "h" | "help" | "?" => Some(Command::Help),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Run `action` unless `shutdown` completes first. Returns false when interrupted.
async fn dispatch<F>(controller: &ForecastController, action: ViewAction, shutdown: F) -> bool
where
    F: Future<Output = ()>,
{
    tokio::select! {
        _ = controller.handle_action(action) => true,
        _ = shutdown => false,
    }
}

fn report(err: impl Into<AppError>) -> AppError {
    let err = err.into();
    eprintln!("{}", err.user_message());
    err
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    shoresquad_core::init()?;

    let (config, _) = Config::load_validated().map_err(report)?;
    let weather = &config.weather;

    let provider = HttpForecastProvider::new(weather.endpoint.clone(), weather.request_timeout())
        .map_err(|e| report(anyhow::Error::from(e)))?;
    tracing::info!(
        endpoint = provider.endpoint(),
        timeout_secs = provider.timeout().as_secs(),
        "ShoreSquad forecast started"
    );

    let mut options = ControllerOptions::default();
    if let Some(interval) = weather.refresh_interval() {
        options.refresh_interval = interval;
    }
    let controller =
        ForecastController::new(Arc::new(provider), Arc::new(ConsoleView), options.clone());

    controller.manual_refresh().await;
    if weather.auto_refresh && weather.refresh_interval().is_some() {
        controller.start_auto_refresh(options.refresh_interval);
    }
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Some(Command::Action(action)) => {
                        let ctrl_c = async {
                            let _ = tokio::signal::ctrl_c().await;
                        };
                        if !dispatch(&controller, action, ctrl_c).await {
                            break;
                        }
                    }
                    Some(Command::Help) => println!("{}", HELP),
                    Some(Command::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => println!("Unknown command '{}'. {}", line.trim(), HELP),
                }
            }
        }
    }

    controller.stop_auto_refresh();
    tracing::info!("ShoreSquad forecast stopped");
    Ok(())
}
