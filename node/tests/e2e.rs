use std::io;
use std::sync::Arc;

use accel::{Accelerator, StaticRuntime};
use node::{ConnectionContext, Dispatcher, NodeConfig};
use planner::{Session, plan};
use protocol::Status;
use tokio::net::TcpListener;

async fn start_node(config: NodeConfig) -> io::Result<String> {
    let runtime = Arc::new(StaticRuntime::new(config.limits.min_memory_available * 16));
    let accelerator = Arc::new(Accelerator::new(runtime, config.limits));
    let dispatcher = Dispatcher::new(&config, accelerator);
    let ctx = Arc::new(ConnectionContext::new(&config, dispatcher));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    tokio::spawn(node::serve(listener, ctx));

    Ok(addr)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn a_plan_runs_end_to_end_over_tcp() -> io::Result<()> {
    let config = NodeConfig::default();
    let max_frame = config.limits.max_payload_size;
    let addr = start_node(config).await?;

    let mut session = Session::connect(&addr, max_frame)
        .await
        .map_err(io::Error::other)?;

    let tasks = [
        plan::model_task(0, 16, 4),
        plan::circuit_task(1, 2, 100),
        plan::probe_task(2),
    ];
    let outcomes = session
        .run_plan(&tasks)
        .await
        .map_err(io::Error::other)?;

    assert_eq!(outcomes.len(), 3);

    let network = outcomes[0].envelope.data.as_ref().unwrap();
    assert_eq!(outcomes[0].envelope.status, Status::Success);
    assert_eq!(network["network"]["layers"].as_array().unwrap().len(), 2);

    let execution = outcomes[1].envelope.data.as_ref().unwrap();
    assert_eq!(outcomes[1].envelope.status, Status::Success);
    let total: u64 = execution["results"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(total, 100);

    assert_eq!(outcomes[2].envelope.status, Status::Success);
    assert_eq!(outcomes[2].envelope.data.as_ref().unwrap()["available"], true);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_connections_are_served_independently() -> io::Result<()> {
    let config = NodeConfig::default();
    let limits = config.limits;
    let addr = start_node(config).await?;

    let tasks = vec![
        plan::circuit_task(0, 1, 10),
        plan::circuit_task(1, 2, 20),
        plan::circuit_task(2, 3, 30),
    ];

    let outcomes = planner::submit_all(&addr, tasks, &limits).await;

    for (i, outcome) in outcomes.into_iter().enumerate() {
        let outcome = outcome.map_err(io::Error::other)?;
        assert_eq!(outcome.id, i);
        assert_eq!(outcome.envelope.status, Status::Success);
        let data = outcome.envelope.data.unwrap();
        assert_eq!(data["shots"], 10 * (i as u64 + 1));
    }

    Ok(())
}
