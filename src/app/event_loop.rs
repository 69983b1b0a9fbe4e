use anyhow::Result;
use log::{info, warn};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use super::{
    commands::Command,
    controller::{AppController, Flow},
};

const COMMAND_QUEUE_DEPTH: usize = 64;

/// Consumes commands one at a time and interleaves autosave ticks on the same
/// task, so a save never observes a half-applied command. Saves once more on
/// the way out when there are unsaved changes.
pub async fn annotation_loop(
    mut controller: AppController,
    mut commands: mpsc::Receiver<String>,
    cancel_token: CancellationToken,
) -> Result<AppController> {
    let period = controller.settings().autosave_interval();
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    controller.publish();

    loop {
        tokio::select! {
            line = commands.recv() => {
                let Some(line) = line else {
                    info!("command stream closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let outcome = match line.parse::<Command>() {
                    Ok(command) => controller.dispatch(command).await,
                    Err(err) => Err(err),
                };
                match outcome {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(err) => controller.report_error(&err),
                }
            }
            _ = ticker.tick() => {
                controller.autosave().await;
            }
            _ = cancel_token.cancelled() => {
                info!("annotation loop shutting down");
                break;
            }
        }
    }

    if controller.is_dirty() {
        if let Err(err) = controller.save().await {
            warn!("Final save failed: {err:?}");
        }
    }

    Ok(controller)
}

/// Forwards stdin lines into a command queue until EOF or cancellation.
pub fn spawn_stdin_reader(cancel_token: CancellationToken) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if tx.send(line).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!("failed to read command: {err}");
                        break;
                    }
                },
                _ = cancel_token.cancelled() => break,
            }
        }
    });

    rx
}
