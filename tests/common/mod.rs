// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use discovery::crd::{DuckType, DuckTypeSpec, DuckTypeStatus};
use k8s_openapi::api::core::v1::{Namespace, Service};
use kube::{
    api::{Api, DeleteParams, PostParams},
    client::Client,
};
use serde_json::json;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {}", e);
            None
        }
    }
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let ns = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "labels": {
                "test": "integration",
                "managed-by": "ducktype-discovery-test"
            }
        }
    }))?;

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            println!("Created test namespace: {}", name);
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test namespace already exists: {}", name);
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(client: &Client, name: &str) {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => println!("Deleted test namespace: {}", name),
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("Test namespace already deleted: {}", name);
        }
        Err(e) => eprintln!("Failed to delete test namespace {}: {}", name, e),
    }
}

/// Create a `DuckType` pointing at `service_name`
pub async fn create_ducktype(
    client: &Client,
    namespace: &str,
    name: &str,
    service_name: &str,
) -> Result<DuckType, Box<dyn std::error::Error>> {
    let api: Api<DuckType> = Api::namespaced(client.clone(), namespace);
    let ducktype = DuckType::new(
        name,
        DuckTypeSpec {
            service_name: service_name.to_string(),
        },
    );

    let created = api.create(&PostParams::default(), &ducktype).await?;
    println!("Created DuckType: {}/{} -> {}", namespace, name, service_name);
    Ok(created)
}

/// Create a minimal ClusterIP Service
pub async fn create_service(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);

    let svc = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": { "name": name, "namespace": namespace },
        "spec": {
            "selector": { "app": name },
            "ports": [{ "port": 80, "targetPort": 8080 }]
        }
    }))?;

    services.create(&PostParams::default(), &svc).await?;
    println!("Created Service: {}/{}", namespace, name);
    Ok(())
}

/// Delete a Service
pub async fn delete_service(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    services.delete(name, &DeleteParams::default()).await?;
    println!("Deleted Service: {}/{}", namespace, name);
    Ok(())
}

/// Poll a `DuckType` until its status satisfies `predicate` or `timeout` elapses
pub async fn wait_for_status<F>(
    client: &Client,
    namespace: &str,
    name: &str,
    timeout: Duration,
    predicate: F,
) -> Option<DuckTypeStatus>
where
    F: Fn(&DuckTypeStatus) -> bool,
{
    let api: Api<DuckType> = Api::namespaced(client.clone(), namespace);
    let deadline = Instant::now() + timeout;

    while Instant::now() < deadline {
        if let Ok(ducktype) = api.get(name).await {
            if let Some(status) = ducktype.status {
                if predicate(&status) {
                    return Some(status);
                }
            }
        }
        sleep(Duration::from_secs(1)).await;
    }

    None
}
