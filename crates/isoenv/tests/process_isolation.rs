//! End-to-end tests over a real worker process with piped stdio.

use serde_json::json;

use isoenv::{
    CallArgs, CommandSpawner, EnvProxy, EnvSpec, ProxyError, RemoteError, Space,
};

fn spawner() -> CommandSpawner {
    CommandSpawner::new(env!("CARGO_BIN_EXE_isoenv-worker"))
}

#[tokio::test]
async fn episode_over_a_real_worker_process() {
    let spec = EnvSpec::new("GridWorld-v0").with_kwarg("size", json!(4));
    let mut proxy = EnvProxy::make(&spawner(), spec).await.unwrap();

    assert_eq!(*proxy.observation_space(), Space::boxed(0.0, 1.0, [4, 4]));
    assert_eq!(*proxy.action_space(), Space::discrete(4));

    let obs = proxy.reset().await.unwrap();
    assert_eq!(obs[0][0], json!(1.0));

    let outcome = proxy.step(json!(1)).await.unwrap();
    assert_eq!(outcome.observation[0][1], json!(1.0));
    assert!(!outcome.done);

    let size = proxy.attribute("size").await.unwrap().into_value().unwrap();
    assert_eq!(size, json!(4));

    let distance = proxy
        .call_method("distance_to_goal", CallArgs::new())
        .await
        .unwrap();
    assert_eq!(distance, json!(5));

    // close() joins the worker process; a second close is a no-op.
    proxy.close().await.unwrap();
    proxy.close().await.unwrap();
}

#[tokio::test]
async fn worker_errors_cross_the_process_boundary() {
    let spec = EnvSpec::new("GridWorld-v0");
    let mut proxy = EnvProxy::make(&spawner(), spec).await.unwrap();

    let err = proxy.attribute("seed").await.unwrap_err();
    assert!(matches!(
        err,
        ProxyError::Remote(RemoteError::AttributeNotFound { ref name }) if name == "seed"
    ));

    // The worker process survives the error.
    assert!(proxy.reset().await.is_ok());

    proxy.close().await.unwrap();
}

#[tokio::test]
async fn unknown_environment_fails_make() {
    let err = EnvProxy::make(&spawner(), EnvSpec::new("Atlantis-v0"))
        .await
        .err()
        .unwrap();
    assert!(matches!(
        err,
        ProxyError::Remote(RemoteError::Construction { .. })
    ));
}
