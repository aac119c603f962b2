use std::{env, io};

use log::{info, warn};
use planner::{Planner, StaticKnowledge};
use protocol::{Limits, Status};

const DEFAULT_ADDR: &str = "127.0.0.1:7878";

fn demo_knowledge() -> StaticKnowledge {
    let mut kb = StaticKnowledge::new();
    kb.relate("digit_recognition", "neural_model", "16x4");
    kb.relate("digit_recognition", "accelerator_check", "");
    kb.relate("entangled_link", "quantum_circuit", "2");
    kb
}

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let addr = env::var("NODE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let limits = Limits::default();

    let planner = Planner::new(demo_knowledge());
    let tasks = planner.decompose_all(&["digit_recognition", "entangled_link"]);
    info!("decomposed into {} sub-task(s)", tasks.len());

    let outcomes = planner::submit_all(&addr, tasks, &limits).await;

    for outcome in outcomes {
        match outcome {
            Ok(outcome) => match outcome.envelope.status {
                Status::Success => {
                    println!(
                        "task {}: ok {}",
                        outcome.id,
                        outcome.envelope.data.unwrap_or_default()
                    );
                }
                Status::Error => {
                    println!(
                        "task {}: error: {}",
                        outcome.id,
                        outcome.envelope.message.unwrap_or_default()
                    );
                }
            },
            Err(e) => warn!("sub-task failed: {e}"),
        }
    }

    Ok(())
}
